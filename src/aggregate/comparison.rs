use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::decimal::Rate;
use crate::month::MonthKey;

use super::{Aggregator, CollectionSummary};

/// one month against the month before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthComparison {
    pub month: MonthKey,
    pub current: CollectionSummary,
    pub previous: CollectionSummary,
    /// change in collected amount relative to the previous month, none when nothing was collected then
    pub collected_change: Option<Rate>,
    /// difference of the two collection rates in percentage points
    pub collection_rate_change: Decimal,
    pub customer_count_change: i64,
}

impl MonthComparison {
    pub fn new(month: MonthKey, current: CollectionSummary, previous: CollectionSummary) -> Self {
        let collected_change = if previous.total_paid.is_positive() {
            let delta = current.total_paid.as_decimal() - previous.total_paid.as_decimal();
            Some(Rate::from_ratio(delta, previous.total_paid.as_decimal()))
        } else {
            None
        };
        let collection_rate_change =
            current.collection_rate.as_percentage() - previous.collection_rate.as_percentage();
        let customer_count_change = current.customer_count as i64 - previous.customer_count as i64;

        Self {
            month,
            current,
            previous,
            collected_change,
            collection_rate_change,
            customer_count_change,
        }
    }

    pub fn improved(&self) -> bool {
        self.collection_rate_change > Decimal::ZERO
    }
}

impl<'e> Aggregator<'e> {
    /// compare `month` with the month before it over the same customers;
    /// the first representable month compares against empty totals
    pub fn compare_with_previous(&self, customers: &[Customer], month: MonthKey) -> MonthComparison {
        let current = self.aggregate(customers, month);
        let previous = month
            .previous()
            .map(|prev| self.aggregate(customers, prev))
            .unwrap_or_default();
        MonthComparison::new(month, current, previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::MonthlyPayment;
    use crate::decimal::Money;
    use crate::ledger::LedgerEngine;
    use crate::types::CustomerId;
    use rust_decimal_macros::dec;

    fn month(raw: &str) -> MonthKey {
        MonthKey::parse(raw).unwrap()
    }

    fn settled(raw: &str, paid: i64) -> MonthlyPayment {
        let mut record = MonthlyPayment::new(month(raw));
        record.paid = Money::from_major(paid);
        record
    }

    #[test]
    fn test_compare_with_previous() {
        let engine = LedgerEngine::standard();
        let customers = vec![
            Customer::new(CustomerId::new("a"), Money::from_major(50))
                .with_payment(settled("2025-01", 25))
                .with_payment(settled("2025-02", 75)),
            Customer::new(CustomerId::new("b"), Money::from_major(50))
                .with_payment(settled("2025-01", 25))
                .with_payment(settled("2025-02", 75)),
        ];

        let cmp = Aggregator::new(&engine).compare_with_previous(&customers, month("2025-02"));

        // jan: 50 of 100 collected; feb: 150 of 150
        assert_eq!(cmp.previous.total_paid, Money::from_major(50));
        assert_eq!(cmp.current.total_paid, Money::from_major(150));
        assert_eq!(cmp.collected_change.unwrap().as_percentage(), dec!(200));
        assert_eq!(cmp.collection_rate_change, dec!(50));
        assert_eq!(cmp.customer_count_change, 0);
        assert!(cmp.improved());
    }

    #[test]
    fn test_no_previous_collection() {
        let engine = LedgerEngine::standard();
        let customers = vec![Customer::new(CustomerId::new("a"), Money::from_major(50))
            .with_payment(settled("2025-02", 10))];

        let cmp = Aggregator::new(&engine).compare_with_previous(&customers, month("2025-02"));
        assert_eq!(cmp.collected_change, None);
    }

    #[test]
    fn test_decline_is_negative() {
        let current = CollectionSummary {
            customer_count: 3,
            total_paid: Money::from_major(30),
            ..CollectionSummary::default()
        };
        let previous = CollectionSummary {
            customer_count: 4,
            total_paid: Money::from_major(60),
            ..CollectionSummary::default()
        };

        let cmp = MonthComparison::new(month("2025-05"), current, previous);
        assert_eq!(cmp.collected_change.unwrap().as_percentage(), dec!(-50));
        assert_eq!(cmp.customer_count_change, -1);
        assert!(!cmp.improved());
    }

    #[test]
    fn test_first_month_compares_against_empty_totals() {
        let engine = LedgerEngine::standard();
        let customers = vec![Customer::new(CustomerId::new("a"), Money::from_major(50))];
        let first = month("0001-01");

        let cmp = Aggregator::new(&engine).compare_with_previous(&customers, first);
        assert_eq!(cmp.previous, CollectionSummary::default());
        assert_eq!(cmp.customer_count_change, 1);
    }
}
