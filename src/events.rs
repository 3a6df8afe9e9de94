use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::month::MonthKey;
use crate::types::CustomerId;

/// all events that can be emitted by ledger mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // month lifecycle
    MonthInitialized {
        customer_id: CustomerId,
        month: MonthKey,
        date: NaiveDate,
    },
    MonthDateAssigned {
        customer_id: CustomerId,
        month: MonthKey,
        old_date: Option<NaiveDate>,
        new_date: NaiveDate,
    },

    // payment events
    PaymentApplied {
        customer_id: CustomerId,
        month: MonthKey,
        reference: Uuid,
        amount: Money,
        new_paid: Money,
        remaining: Money,
        timestamp: DateTime<Utc>,
    },
    MonthSettled {
        customer_id: CustomerId,
        month: MonthKey,
        total_due: Money,
        timestamp: DateTime<Utc>,
    },
    MonthReopened {
        customer_id: CustomerId,
        month: MonthKey,
        reversed_paid: Money,
        timestamp: DateTime<Utc>,
    },

    // bulk events
    BulkSettled {
        month: MonthKey,
        customers: usize,
        total_settled: Money,
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// customer the event concerns, none for bulk events
    pub fn customer_id(&self) -> Option<&CustomerId> {
        match self {
            LedgerEvent::MonthInitialized { customer_id, .. }
            | LedgerEvent::MonthDateAssigned { customer_id, .. }
            | LedgerEvent::PaymentApplied { customer_id, .. }
            | LedgerEvent::MonthSettled { customer_id, .. }
            | LedgerEvent::MonthReopened { customer_id, .. } => Some(customer_id),
            LedgerEvent::BulkSettled { .. } => None,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<LedgerEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
