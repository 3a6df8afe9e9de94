use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::customer::Customer;
use crate::decimal::Money;
use crate::events::{EventStore, LedgerEvent};
use crate::ledger::LedgerEngine;
use crate::month::MonthKey;

/// result of a bulk operation over many customers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub month: MonthKey,
    pub customers_updated: usize,
    /// customers left alone because the month was already settled
    #[serde(default)]
    pub already_settled: usize,
    /// amount recorded as paid by the operation, zero for date assignment
    pub total_settled: Money,
}

/// settle `month` for every customer; earlier months are left untouched.
/// customers whose month is already settled with paid covering the total keep
/// their record, paid date included
pub fn mark_all_paid<'c, I>(
    engine: &LedgerEngine,
    customers: I,
    month: MonthKey,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> BulkOutcome
where
    I: IntoIterator<Item = &'c mut Customer>,
{
    let mut customers_updated = 0;
    let mut already_settled = 0;
    let mut total_settled = Money::ZERO;

    for customer in customers {
        let before = engine.snapshot(customer, month);
        if before.fully_paid && before.flag_shortfall().is_zero() {
            already_settled += 1;
            continue;
        }
        engine.set_fully_paid(customer, month, true, time_provider, events);
        total_settled += before.total_due.saturating_sub(before.paid);
        customers_updated += 1;
    }

    info!(%month, customers = customers_updated, already_settled, %total_settled, "month settled for all customers");

    events.emit(LedgerEvent::BulkSettled {
        month,
        customers: customers_updated,
        total_settled,
        timestamp: time_provider.now(),
    });

    BulkOutcome {
        month,
        customers_updated,
        already_settled,
        total_settled,
    }
}

/// settle `month` for every customer at the system time
pub fn mark_all_paid_now<'c, I>(
    engine: &LedgerEngine,
    customers: I,
    month: MonthKey,
    events: &mut EventStore,
) -> BulkOutcome
where
    I: IntoIterator<Item = &'c mut Customer>,
{
    let time_provider = SafeTimeProvider::new(TimeSource::System);
    mark_all_paid(engine, customers, month, &time_provider, events)
}

/// initialize `month` with `date` for every customer
pub fn set_date_for_all<'c, I>(
    engine: &LedgerEngine,
    customers: I,
    month: MonthKey,
    date: NaiveDate,
    events: &mut EventStore,
) -> BulkOutcome
where
    I: IntoIterator<Item = &'c mut Customer>,
{
    let mut customers_updated = 0;
    for customer in customers {
        engine.initialize_month(customer, month, date, events);
        customers_updated += 1;
    }

    info!(%month, %date, customers = customers_updated, "month date assigned to all customers");

    BulkOutcome {
        month,
        customers_updated,
        already_settled: 0,
        total_settled: Money::ZERO,
    }
}

/// most frequent record date for `month`; ties go to the date seen first
pub fn common_month_date<'c, I>(customers: I, month: MonthKey) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'c Customer>,
{
    let mut counts: Vec<(NaiveDate, usize)> = Vec::new();
    for date in customers
        .into_iter()
        .filter_map(|c| c.payment(month).and_then(|record| record.date))
    {
        match counts.iter_mut().find(|(seen, _)| *seen == date) {
            Some((_, count)) => *count += 1,
            None => counts.push((date, 1)),
        }
    }

    let mut best: Option<(NaiveDate, usize)> = None;
    for (date, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((date, count));
        }
    }
    best.map(|(date, _)| date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::MonthlyPayment;
    use crate::types::CustomerId;
    use chrono::{TimeZone, Utc};

    fn month(raw: &str) -> MonthKey {
        MonthKey::parse(raw).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap()))
    }

    fn dated(id: &str, raw: &str, d: NaiveDate) -> Customer {
        Customer::new(CustomerId::new(id), Money::from_major(50))
            .with_payment(MonthlyPayment::with_date(month(raw), d))
    }

    #[test]
    fn test_mark_all_paid_settles_target_month_only() {
        let engine = LedgerEngine::standard();
        let time = test_time();
        let mut events = EventStore::new();

        let mut jan = MonthlyPayment::new(month("2025-01"));
        jan.paid = Money::from_major(20);
        let mut customers = vec![
            Customer::new(CustomerId::new("a"), Money::from_major(50)).with_payment(jan),
            Customer::new(CustomerId::new("b"), Money::from_major(40)),
        ];

        let outcome = mark_all_paid(&engine, customers.iter_mut(), month("2025-02"), &time, &mut events);

        assert_eq!(outcome.customers_updated, 2);
        // a owes 30 carried plus 50, b owes 40
        assert_eq!(outcome.total_settled, Money::from_major(120));

        let a = &customers[0];
        assert!(engine.snapshot(a, month("2025-02")).fully_paid);
        assert_eq!(engine.snapshot(a, month("2025-02")).paid, Money::from_major(80));
        assert!(!engine.snapshot(a, month("2025-01")).fully_paid);

        assert!(matches!(
            events.events().last(),
            Some(LedgerEvent::BulkSettled { customers: 2, .. })
        ));
    }

    #[test]
    fn test_mark_all_paid_counts_only_outstanding() {
        let engine = LedgerEngine::standard();
        let time = test_time();
        let mut events = EventStore::new();

        let mut feb = MonthlyPayment::new(month("2025-02"));
        feb.paid = Money::from_major(30);
        let mut customers = vec![Customer::new(CustomerId::new("a"), Money::from_major(50)).with_payment(feb)];

        let outcome = mark_all_paid(&engine, customers.iter_mut(), month("2025-02"), &time, &mut events);
        assert_eq!(outcome.total_settled, Money::from_major(20));
    }

    #[test]
    fn test_mark_all_paid_skips_settled_months() {
        let engine = LedgerEngine::standard();
        let first = test_time();
        let mut events = EventStore::new();
        let feb = month("2025-02");

        let mut customers = vec![
            Customer::new(CustomerId::new("a"), Money::from_major(50)),
            Customer::new(CustomerId::new("b"), Money::from_major(40)),
        ];
        engine.set_fully_paid(&mut customers[0], feb, true, &first, &mut events);
        let settled_at = customers[0].payment(feb).unwrap().paid_date;
        events.take_events();

        let later = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 3, 28, 9, 0, 0).unwrap()));
        let outcome = mark_all_paid(&engine, customers.iter_mut(), feb, &later, &mut events);

        assert_eq!(outcome.customers_updated, 1);
        assert_eq!(outcome.already_settled, 1);
        assert_eq!(outcome.total_settled, Money::from_major(40));
        assert_eq!(customers[0].payment(feb).unwrap().paid_date, settled_at);

        let settled_events = events
            .events()
            .iter()
            .filter(|e| matches!(e, LedgerEvent::MonthSettled { .. }))
            .count();
        assert_eq!(settled_events, 1);
    }

    #[test]
    fn test_mark_all_paid_repairs_flag_conflict() {
        let engine = LedgerEngine::standard();
        let mut events = EventStore::new();
        let feb = month("2025-02");

        let mut flagged = MonthlyPayment::new(feb);
        flagged.paid = Money::from_major(10);
        flagged.fully_paid = true;
        let mut customers = vec![Customer::new(CustomerId::new("a"), Money::from_major(50)).with_payment(flagged)];

        let outcome = mark_all_paid(&engine, customers.iter_mut(), feb, &test_time(), &mut events);
        assert_eq!(outcome.customers_updated, 1);
        assert_eq!(outcome.already_settled, 0);
        assert_eq!(customers[0].payment(feb).unwrap().paid, Money::from_major(50));
    }

    #[test]
    fn test_set_date_for_all() {
        let engine = LedgerEngine::standard();
        let mut events = EventStore::new();
        let mut customers = vec![
            dated("a", "2025-03", date(2025, 3, 1)),
            Customer::new(CustomerId::new("b"), Money::from_major(50)),
        ];

        let outcome = set_date_for_all(&engine, customers.iter_mut(), month("2025-03"), date(2025, 3, 5), &mut events);

        assert_eq!(outcome.customers_updated, 2);
        for customer in &customers {
            assert_eq!(customer.payment(month("2025-03")).unwrap().date, Some(date(2025, 3, 5)));
        }
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_common_month_date() {
        let customers = vec![
            dated("a", "2025-03", date(2025, 3, 1)),
            dated("b", "2025-03", date(2025, 3, 5)),
            dated("c", "2025-03", date(2025, 3, 5)),
            dated("d", "2025-02", date(2025, 2, 1)),
        ];
        assert_eq!(common_month_date(&customers, month("2025-03")), Some(date(2025, 3, 5)));
        assert_eq!(common_month_date(&customers, month("2025-04")), None);
    }

    #[test]
    fn test_common_month_date_tie_goes_to_first_seen() {
        let customers = vec![
            dated("a", "2025-03", date(2025, 3, 9)),
            dated("b", "2025-03", date(2025, 3, 1)),
        ];
        assert_eq!(common_month_date(&customers, month("2025-03")), Some(date(2025, 3, 9)));
    }
}
