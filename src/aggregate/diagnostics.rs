use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::customer::Customer;
use crate::decimal::Money;
use crate::ledger::LedgerEngine;
use crate::month::MonthKey;
use crate::types::CustomerId;

/// a month flagged settled although its payments fall short of the amount due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagConflict {
    pub customer_id: CustomerId,
    pub month: MonthKey,
    pub stored_paid: Money,
    pub computed_total_due: Money,
    pub shortfall: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleField {
    Remaining,
    TotalDue,
}

/// a stored copy that disagrees with the recomputed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleRecord {
    pub customer_id: CustomerId,
    pub month: MonthKey,
    pub field: StaleField,
    pub stored: Money,
    pub computed: Money,
}

/// customers whose settled flag hides a shortfall in `month`
pub fn flag_conflicts<'c, I>(engine: &LedgerEngine, customers: I, month: MonthKey) -> Vec<FlagConflict>
where
    I: IntoIterator<Item = &'c Customer>,
{
    let mut conflicts = Vec::new();
    for customer in customers {
        let Some(record) = customer.payment(month) else {
            continue;
        };
        if !record.fully_paid {
            continue;
        }

        let snapshot = engine.snapshot(customer, month);
        let shortfall = snapshot.flag_shortfall();
        if shortfall.is_positive() {
            warn!(
                customer = %customer.id,
                %month,
                paid = %snapshot.paid,
                total_due = %snapshot.total_due,
                %shortfall,
                "settled flag set with payments short of total due"
            );
            conflicts.push(FlagConflict {
                customer_id: customer.id.clone(),
                month,
                stored_paid: snapshot.paid,
                computed_total_due: snapshot.total_due,
                shortfall,
            });
        }
    }
    conflicts
}

/// stored remaining and total due copies across a customer's ledger that no longer match
pub fn stale_fields(engine: &LedgerEngine, customer: &Customer) -> Vec<StaleRecord> {
    let mut stale = Vec::new();
    for record in customer.payments() {
        let snapshot = engine.snapshot(customer, record.month);
        let checks = [
            (StaleField::Remaining, record.remaining, snapshot.remaining),
            (StaleField::TotalDue, record.total_due, snapshot.total_due),
        ];
        for (field, stored, computed) in checks {
            if let Some(stored) = stored {
                if stored != computed {
                    stale.push(StaleRecord {
                        customer_id: customer.id.clone(),
                        month: record.month,
                        field,
                        stored,
                        computed,
                    });
                }
            }
        }
    }
    stale
}
