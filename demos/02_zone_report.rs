/// zone report - collection rollups, month comparison and risk flags
use collection_ledger_rs::{
    Aggregator, Customer, CustomerId, LedgerEngine, Money, MonthKey, MonthlyPayment, SummaryView,
};
use std::collections::HashMap;

fn customer(id: &str, zone: &str, village: &str, fee: i64, paid: &[(&str, i64)]) -> Result<Customer, Box<dyn std::error::Error>> {
    let mut customer = Customer::new(CustomerId::new(id), Money::from_major(fee))
        .in_zone(zone)
        .in_village(village);
    for (month, amount) in paid {
        let mut record = MonthlyPayment::new(MonthKey::parse(month)?);
        record.paid = Money::from_major(*amount);
        customer.upsert_payment(record);
    }
    Ok(customer)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== zone report ===\n");

    let customers = vec![
        customer("c1", "north", "riverside", 50, &[("2025-02", 50), ("2025-03", 50)])?,
        customer("c2", "north", "riverside", 50, &[("2025-02", 20), ("2025-03", 0)])?,
        customer("c3", "north", "hilltop", 40, &[("2025-02", 40), ("2025-03", 40)])?,
        customer("c4", "south", "lakeside", 60, &[("2025-02", 60), ("2025-03", 10)])?,
    ];
    let assignments: HashMap<String, String> = [
        ("riverside".to_string(), "worker-ali".to_string()),
        ("hilltop".to_string(), "worker-ali".to_string()),
        ("lakeside".to_string(), "worker-sara".to_string()),
    ]
    .into_iter()
    .collect();

    let engine = LedgerEngine::standard();
    let aggregator = Aggregator::new(&engine);
    let march = MonthKey::parse("2025-03")?;

    let zones = aggregator.by_zone(&customers, march);
    let report = SummaryView::from_summary(march, &aggregator.aggregate(&customers, march)).with_groups(&zones);
    println!("{}\n", report.to_json_pretty()?);

    let comparison = aggregator.compare_with_previous(&customers, march);
    println!(
        "collection rate change vs {}: {} points",
        march.previous().map(|m| m.label()).unwrap_or_default(),
        comparison.collection_rate_change.round_dp(1)
    );
    match comparison.collected_change {
        Some(change) => println!("collected change: {}", change),
        None => println!("nothing collected the month before"),
    }

    let villages = aggregator.by_village(&customers, march);
    for village in aggregator.low_collection_groups(&villages) {
        println!("low collection village: {} ({})", village.key, village.summary.collection_rate);
    }
    let workers = aggregator.by_worker(&customers, march, &assignments);
    for worker in aggregator.low_collection_workers(&workers) {
        println!("low collection worker: {} ({})", worker.key, worker.summary.collection_rate);
    }

    Ok(())
}
