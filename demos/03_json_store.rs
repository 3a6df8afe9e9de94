/// json store - load stored customers, settle a month, export the records
use collection_ledger_rs::{
    CollectionDesk, CustomerFilter, CustomerId, InMemoryCustomerStore, LedgerConfig, Money, MonthKey,
    RecordLayout, SafeTimeProvider, TimeSource,
};
use chrono::{NaiveDate, TimeZone, Utc};

const STORED: &str = r#"[
    { "_id": "c1", "fullName": "Amina Yusuf", "monthlyFee": 50, "zoneId": { "_id": "north" },
      "monthlyPayments": [ { "month": "2025-01", "paid": 30, "fullyPaid": false } ] },
    { "_id": "c2", "fullName": "Bilal Haddad", "monthlyFee": 40, "zoneId": "north",
      "payments": { "2025-01": { "paid": 40, "fullyPaid": true } } },
    { "_id": "c3", "fullName": "Chidi Okafor", "monthlyFee": 40, "zoneId": "south" }
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json store ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 2, 12, 8, 30, 0).unwrap()
    ));
    let store = InMemoryCustomerStore::from_json(STORED)?;
    let mut desk = CollectionDesk::new(store, LedgerConfig::standard());
    let feb = MonthKey::parse("2025-02")?;

    // open february for everyone on the 10th
    let date = NaiveDate::from_ymd_opt(2025, 2, 10).ok_or("invalid date")?;
    desk.set_monthly_date(&CustomerFilter::all(), feb, date)?;

    // a partial payment, then settle the north zone
    desk.record_payment(&CustomerId::new("c3"), feb, Money::from_major(15), &time)?;
    let outcome = desk.mark_all_paid(&CustomerFilter::zone("north"), feb, &time)?;
    println!("settled {} customers for {} ({} collected)", outcome.customers_updated, feb.label(), outcome.total_settled);

    let summary = desk.summary(&CustomerFilter::all(), feb);
    println!("collection rate: {}", summary.collection_rate);
    println!("events: {}\n", desk.take_events().len());

    // write back in the legacy layout
    println!("{}", desk.store().to_json(RecordLayout::LegacyMap)?);

    Ok(())
}
