//! Monthly ledger engine.
//!
//! The engine is the single authority on what a customer owes for a month
//! and whether it has been paid. Every figure is derived from the stored
//! ledger on each call; nothing is cached between calls.

pub mod carry_over;
pub mod mutation;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LedgerConfig;
use crate::customer::Customer;
use crate::decimal::Money;
use crate::month::MonthKey;
use crate::types::PaymentStatus;

pub use carry_over::CarryOverChain;

/// derived view of one customer for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MonthSnapshot {
    pub paid: Money,
    pub remaining: Money,
    pub fully_paid: bool,
    pub paid_date: Option<DateTime<Utc>>,
    pub previous_balance: Money,
    pub total_due: Money,
    pub monthly_fee: Money,
    pub date: Option<NaiveDate>,
}

impl MonthSnapshot {
    pub fn status(&self) -> PaymentStatus {
        if self.fully_paid {
            PaymentStatus::Paid
        } else if self.paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }

    pub fn is_partial(&self) -> bool {
        self.status() == PaymentStatus::Partial
    }

    pub fn is_unpaid(&self) -> bool {
        self.status() == PaymentStatus::Unpaid
    }

    /// amount the settled flag papers over, zero when stored figures agree
    pub fn flag_shortfall(&self) -> Money {
        if self.fully_paid {
            self.total_due.saturating_sub(self.paid)
        } else {
            Money::ZERO
        }
    }
}

/// ledger engine
#[derive(Debug, Clone, Default)]
pub struct LedgerEngine {
    config: LedgerConfig,
}

impl LedgerEngine {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn standard() -> Self {
        Self::new(LedgerConfig::standard())
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// carry-over into `month` from the month before it
    pub fn previous_balance(&self, customer: &Customer, month: MonthKey) -> Money {
        self.chain(customer, month).carry_into_target()
    }

    /// render-path variant; an unparseable key carries nothing
    pub fn previous_balance_str(&self, customer: &Customer, month: &str) -> Money {
        match MonthKey::parse(month) {
            Ok(key) => self.previous_balance(customer, key),
            Err(_) => {
                debug!(customer = %customer.id, month, "previous balance requested for invalid month key");
                Money::ZERO
            }
        }
    }

    /// complete payment snapshot for `month`
    pub fn snapshot(&self, customer: &Customer, month: MonthKey) -> MonthSnapshot {
        let snapshot = self.chain(customer, month).resolve();
        debug!(
            customer = %customer.id,
            %month,
            previous_balance = %snapshot.previous_balance,
            total_due = %snapshot.total_due,
            paid = %snapshot.paid,
            fully_paid = snapshot.fully_paid,
            "month snapshot resolved"
        );
        snapshot
    }

    /// render-path variant; an unparseable key yields an all-zero snapshot
    pub fn snapshot_str(&self, customer: &Customer, month: &str) -> MonthSnapshot {
        match MonthKey::parse(month) {
            Ok(key) => self.snapshot(customer, key),
            Err(_) => {
                debug!(customer = %customer.id, month, "snapshot requested for invalid month key");
                MonthSnapshot::default()
            }
        }
    }

    /// snapshots for a run of months, in order
    pub fn history(&self, customer: &Customer, from: MonthKey, to: MonthKey) -> Vec<(MonthKey, MonthSnapshot)> {
        from.through(to)
            .into_iter()
            .map(|month| (month, self.snapshot(customer, month)))
            .collect()
    }

    fn chain<'c>(&self, customer: &'c Customer, month: MonthKey) -> CarryOverChain<'c> {
        CarryOverChain::new(customer, month, self.config.carry_over)
    }
}

/// snapshot arithmetic for a single month once its carry-over is known
pub(crate) fn snapshot_with_carry(customer: &Customer, month: MonthKey, previous_balance: Money) -> MonthSnapshot {
    let record = customer.payment(month);

    let monthly_fee = record
        .and_then(|r| r.fee_override())
        .unwrap_or(customer.monthly_fee);
    let total_due = previous_balance + monthly_fee;

    match record {
        None => MonthSnapshot {
            paid: Money::ZERO,
            remaining: total_due,
            fully_paid: false,
            paid_date: None,
            previous_balance,
            total_due,
            monthly_fee,
            date: None,
        },
        Some(record) => {
            let paid = record.paid.max(Money::ZERO);
            let raw_remaining = total_due.saturating_sub(paid);
            let fully_paid = raw_remaining.is_zero() || record.fully_paid;

            MonthSnapshot {
                paid,
                remaining: if fully_paid { Money::ZERO } else { raw_remaining },
                fully_paid,
                paid_date: record.paid_date,
                previous_balance,
                total_due,
                monthly_fee,
                date: record.date,
            }
        }
    }
}
