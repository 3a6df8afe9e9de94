/// serializable views for screens and exports
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{CollectionSummary, GroupBreakdown};
use crate::customer::Customer;
use crate::decimal::Money;
use crate::ledger::MonthSnapshot;
use crate::month::MonthKey;
use crate::types::{CustomerId, PaymentStatus};

/// one customer's month as a screen row shows it
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotView {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub month: MonthKey,
    pub month_label: String,
    pub status: PaymentStatus,
    pub balance: BalanceView,
    pub paid_date: Option<DateTime<Utc>>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceView {
    pub monthly_fee: Money,
    pub previous_balance: Money,
    pub total_due: Money,
    pub paid: Money,
    pub remaining: Money,
    pub fully_paid: bool,
}

impl SnapshotView {
    pub fn from_snapshot(customer: &Customer, month: MonthKey, snapshot: &MonthSnapshot) -> Self {
        SnapshotView {
            customer_id: customer.id.clone(),
            full_name: customer.full_name.clone(),
            month,
            month_label: month.label(),
            status: snapshot.status(),
            balance: BalanceView {
                monthly_fee: snapshot.monthly_fee,
                previous_balance: snapshot.previous_balance,
                total_due: snapshot.total_due,
                paid: snapshot.paid,
                remaining: snapshot.remaining,
                fully_paid: snapshot.fully_paid,
            },
            paid_date: snapshot.paid_date,
            date: snapshot.date,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// collection totals for a month, optionally broken down by group
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryView {
    pub month: MonthKey,
    pub month_label: String,
    pub totals: CollectionSummary,
    /// collection rate as a percentage with one decimal
    pub collection_rate_pct: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupView {
    pub key: String,
    pub customer_count: usize,
    pub customer_share_pct: Decimal,
    pub total_due: Money,
    pub total_paid: Money,
    pub collection_rate_pct: Decimal,
}

impl SummaryView {
    pub fn from_summary(month: MonthKey, summary: &CollectionSummary) -> Self {
        SummaryView {
            month,
            month_label: month.label(),
            totals: summary.clone(),
            collection_rate_pct: summary.collection_rate.as_percentage_dp(1),
            groups: Vec::new(),
        }
    }

    pub fn with_groups<K: ToString>(mut self, groups: &[GroupBreakdown<K>]) -> Self {
        self.groups = groups
            .iter()
            .map(|g| GroupView {
                key: g.key.to_string(),
                customer_count: g.summary.customer_count,
                customer_share_pct: g.customer_share.as_percentage_dp(1),
                total_due: g.summary.total_due,
                total_paid: g.summary.total_paid,
                collection_rate_pct: g.summary.collection_rate.as_percentage_dp(1),
            })
            .collect();
        self
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::customer::MonthlyPayment;
    use crate::ledger::LedgerEngine;
    use rust_decimal_macros::dec;

    fn month(raw: &str) -> MonthKey {
        MonthKey::parse(raw).unwrap()
    }

    #[test]
    fn test_snapshot_view_json() {
        let engine = LedgerEngine::standard();
        let mut jan = MonthlyPayment::new(month("2025-01"));
        jan.paid = Money::from_major(20);
        let customer = Customer::new(CustomerId::new("c1"), Money::from_major(50))
            .with_name("Amina")
            .with_payment(jan);

        let feb = month("2025-02");
        let view = SnapshotView::from_snapshot(&customer, feb, &engine.snapshot(&customer, feb));
        assert_eq!(view.status, PaymentStatus::Unpaid);
        assert_eq!(view.month_label, "February 2025");

        let json = view.to_json_pretty().unwrap();
        assert!(json.contains("\"previous_balance\": \"30"));
        assert!(json.contains("\"status\": \"unpaid\""));
        assert!(json.contains("\"month\": \"2025-02\""));
    }

    #[test]
    fn test_summary_view_with_groups() {
        let engine = LedgerEngine::standard();
        let mut paid = MonthlyPayment::new(month("2025-02"));
        paid.paid = Money::from_major(50);
        let customers = vec![
            Customer::new(CustomerId::new("a"), Money::from_major(50)).in_zone("z1").with_payment(paid),
            Customer::new(CustomerId::new("b"), Money::from_major(50)).in_zone("z2"),
        ];
        let aggregator = Aggregator::new(&engine);
        let feb = month("2025-02");

        let view = SummaryView::from_summary(feb, &aggregator.aggregate(&customers, feb))
            .with_groups(&aggregator.by_zone(&customers, feb));

        assert_eq!(view.collection_rate_pct, dec!(50));
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.groups[0].collection_rate_pct, dec!(100));
        assert_eq!(view.groups[1].customer_share_pct, dec!(50));
        assert!(view.to_json_pretty().unwrap().contains("\"key\": \"z2\""));
    }
}
