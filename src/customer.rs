use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decimal::Money;
use crate::month::MonthKey;
use crate::types::{CustomerId, VillageId, ZoneId};

/// one customer's record for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPayment {
    pub month: MonthKey,
    /// per-month override of the customer's nominal fee
    pub monthly_fee: Option<Money>,
    /// cumulative amount paid toward this month
    pub paid: Money,
    /// explicit settled flag
    pub fully_paid: bool,
    /// last time a payment was applied
    pub paid_date: Option<DateTime<Utc>>,
    /// official date assigned to the month
    pub date: Option<NaiveDate>,
    /// stored copy of the remaining balance; never authoritative for this month
    pub remaining: Option<Money>,
    /// stored copy of the total due; never authoritative
    pub total_due: Option<Money>,
}

impl MonthlyPayment {
    /// blank record, nothing paid
    pub fn new(month: MonthKey) -> Self {
        Self {
            month,
            monthly_fee: None,
            paid: Money::ZERO,
            fully_paid: false,
            paid_date: None,
            date: None,
            remaining: None,
            total_due: None,
        }
    }

    pub fn with_date(month: MonthKey, date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::new(month)
        }
    }

    /// override fee if it is usable, zero and negative overrides fall back to the nominal fee
    pub fn fee_override(&self) -> Option<Money> {
        self.monthly_fee.filter(|fee| fee.is_positive())
    }

    /// stored remaining if it is a positive amount
    pub fn stored_remaining(&self) -> Option<Money> {
        self.remaining.filter(|r| r.is_positive())
    }
}

/// customer with a normalized, one-record-per-month ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub full_name: String,
    pub monthly_fee: Money,
    pub zone_id: Option<ZoneId>,
    pub village_id: Option<VillageId>,
    ledger: BTreeMap<MonthKey, MonthlyPayment>,
}

impl Customer {
    pub fn new(id: CustomerId, monthly_fee: Money) -> Self {
        Self {
            id,
            full_name: String::new(),
            monthly_fee: monthly_fee.max(Money::ZERO),
            zone_id: None,
            village_id: None,
            ledger: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }

    pub fn in_zone(mut self, zone_id: impl Into<ZoneId>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    pub fn in_village(mut self, village_id: impl Into<VillageId>) -> Self {
        self.village_id = Some(village_id.into());
        self
    }

    /// add or replace a month record
    pub fn with_payment(mut self, payment: MonthlyPayment) -> Self {
        self.upsert_payment(payment);
        self
    }

    pub fn payment(&self, month: MonthKey) -> Option<&MonthlyPayment> {
        self.ledger.get(&month)
    }

    pub fn payment_mut(&mut self, month: MonthKey) -> Option<&mut MonthlyPayment> {
        self.ledger.get_mut(&month)
    }

    /// existing record for the month, created blank if absent
    pub fn payment_entry(&mut self, month: MonthKey) -> &mut MonthlyPayment {
        self.ledger
            .entry(month)
            .or_insert_with(|| MonthlyPayment::new(month))
    }

    pub fn has_payment(&self, month: MonthKey) -> bool {
        self.ledger.contains_key(&month)
    }

    pub fn upsert_payment(&mut self, payment: MonthlyPayment) {
        self.ledger.insert(payment.month, payment);
    }

    /// records in chronological order
    pub fn payments(&self) -> impl Iterator<Item = &MonthlyPayment> {
        self.ledger.values()
    }

    pub fn first_month(&self) -> Option<MonthKey> {
        self.ledger.keys().next().copied()
    }

    pub fn last_month(&self) -> Option<MonthKey> {
        self.ledger.keys().next_back().copied()
    }
}
