/// quick start - record a payment and read the month back
use collection_ledger_rs::{
    Customer, CustomerId, EventStore, LedgerEngine, Money, MonthKey, SnapshotView,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = LedgerEngine::standard();
    let mut events = EventStore::new();

    // a customer paying 50 a month
    let mut customer = Customer::new(CustomerId::new("CUST-001"), Money::from_major(50))
        .with_name("Amina Yusuf");

    // pay part of march
    let march = MonthKey::parse("2025-03")?;
    engine.apply_payment_now(&mut customer, march, Money::from_major(20), &mut events)?;

    // print the month as a screen would show it
    let snapshot = engine.snapshot(&customer, march);
    println!("{}", SnapshotView::from_snapshot(&customer, march, &snapshot).to_json_pretty()?);

    Ok(())
}
