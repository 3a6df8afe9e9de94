/// carry-over - unpaid balances roll into the following months
use collection_ledger_rs::{
    Customer, CustomerId, EventStore, LedgerEngine, Money, MonthKey, SafeTimeProvider, TimeSource,
};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== carry-over example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let engine = LedgerEngine::standard();
    let mut events = EventStore::new();
    let mut customer = Customer::new(CustomerId::new("CUST-002"), Money::from_major(50));

    let jan = MonthKey::parse("2025-01")?;
    let feb = jan.next().ok_or("no month after january")?;
    let mar = feb.next().ok_or("no month after february")?;

    // january: only 30 of 50 paid
    engine.apply_payment(&mut customer, jan, Money::from_major(30), &time, &mut events)?;
    println!("{}: paid 30", jan.label());

    // february: nothing paid, but the month is opened
    controller.advance(Duration::days(31));
    engine.initialize_month(&mut customer, feb, time.now().date_naive(), &mut events);
    println!("{}: opened, nothing paid", feb.label());

    // march: the whole chain of unpaid balances is owed
    for (month, snapshot) in engine.history(&customer, jan, mar) {
        println!(
            "{}: carried {}, fee {}, due {}, paid {}, remaining {} ({})",
            month.label(),
            snapshot.previous_balance,
            snapshot.monthly_fee,
            snapshot.total_due,
            snapshot.paid,
            snapshot.remaining,
            snapshot.status().label(),
        );
    }

    // settling february stops the carry into march
    controller.advance(Duration::days(30));
    engine.set_fully_paid(&mut customer, feb, true, &time, &mut events);
    let march = engine.snapshot(&customer, mar);
    println!("\nafter settling {}: {} carried into {}", feb.label(), march.previous_balance, mar.label());

    println!("\n{} events recorded", events.len());
    Ok(())
}
