//! Collection-level rollups over ledger snapshots.

pub mod bulk;
pub mod comparison;
pub mod diagnostics;
pub mod grouping;

use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::decimal::{Money, Rate};
use crate::ledger::{LedgerEngine, MonthSnapshot};
use crate::month::MonthKey;
use crate::types::PaymentStatus;

pub use bulk::{common_month_date, BulkOutcome};
pub use comparison::MonthComparison;
pub use diagnostics::{FlagConflict, StaleField, StaleRecord};
pub use grouping::GroupBreakdown;

/// totals for a set of customers in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CollectionSummary {
    pub customer_count: usize,
    /// sum of total due, carried-over balances included
    pub total_due: Money,
    pub total_paid: Money,
    pub total_remaining: Money,
    /// sum of the effective monthly fee, without carry-over
    pub nominal_fees: Money,
    pub paid_count: usize,
    pub unpaid_count: usize,
    pub partial_count: usize,
    pub collection_rate: Rate,
}

impl CollectionSummary {
    /// fold one snapshot into the totals
    pub fn add(&mut self, snapshot: &MonthSnapshot) {
        self.customer_count += 1;
        self.total_due += snapshot.total_due;
        self.total_paid += snapshot.paid;
        self.total_remaining += snapshot.remaining;
        self.nominal_fees += snapshot.monthly_fee;
        match snapshot.status() {
            PaymentStatus::Paid => self.paid_count += 1,
            PaymentStatus::Partial => self.partial_count += 1,
            PaymentStatus::Unpaid => self.unpaid_count += 1,
        }
        self.collection_rate = Rate::of_money(self.total_paid, self.total_due);
    }

    /// combine two disjoint summaries
    pub fn merge(&mut self, other: &CollectionSummary) {
        self.customer_count += other.customer_count;
        self.total_due += other.total_due;
        self.total_paid += other.total_paid;
        self.total_remaining += other.total_remaining;
        self.nominal_fees += other.nominal_fees;
        self.paid_count += other.paid_count;
        self.unpaid_count += other.unpaid_count;
        self.partial_count += other.partial_count;
        self.collection_rate = Rate::of_money(self.total_paid, self.total_due);
    }

    /// share of customers that are settled
    pub fn settled_share(&self) -> Rate {
        Rate::of_counts(self.paid_count, self.customer_count)
    }
}

/// part / whole as a percentage-capable rate, zero for an empty whole
pub fn share_of_total(part: usize, whole: usize) -> Rate {
    Rate::of_counts(part, whole)
}

/// folds engine snapshots across collections of customers
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'e> {
    engine: &'e LedgerEngine,
}

impl<'e> Aggregator<'e> {
    pub fn new(engine: &'e LedgerEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &'e LedgerEngine {
        self.engine
    }

    /// summary of `customers` for `month`
    pub fn aggregate<'c, I>(&self, customers: I, month: MonthKey) -> CollectionSummary
    where
        I: IntoIterator<Item = &'c Customer>,
    {
        let mut summary = CollectionSummary::default();
        for customer in customers {
            summary.add(&self.engine.snapshot(customer, month));
        }
        summary
    }

    /// render-path variant; an unparseable key yields an empty summary
    pub fn aggregate_str<'c, I>(&self, customers: I, month: &str) -> CollectionSummary
    where
        I: IntoIterator<Item = &'c Customer>,
    {
        match MonthKey::parse(month) {
            Ok(key) => self.aggregate(customers, key),
            Err(_) => CollectionSummary::default(),
        }
    }
}
