use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::customer::{Customer, MonthlyPayment};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{EventStore, LedgerEvent};
use crate::month::MonthKey;

use super::LedgerEngine;

impl LedgerEngine {
    /// reject amounts that are not positive or exceed the month's remaining balance
    pub fn validate_payment(&self, customer: &Customer, month: MonthKey, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidPaymentAmount { amount });
        }

        let remaining = self.snapshot(customer, month).remaining;
        if amount > remaining {
            return Err(LedgerError::PaymentExceedsRemaining {
                remaining,
                requested: amount,
            });
        }

        Ok(())
    }

    /// apply a partial or final payment toward `month`
    pub fn apply_payment(
        &self,
        customer: &mut Customer,
        month: MonthKey,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<MonthlyPayment> {
        if let Err(err) = self.validate_payment(customer, month, amount) {
            warn!(customer = %customer.id, %month, %amount, error = %err, "payment rejected");
            return Err(err);
        }

        let before = self.snapshot(customer, month);
        let now = time_provider.now();
        let total_due = before.total_due;

        let record = customer.payment_entry(month);
        if record.date.is_none() {
            record.date = Some(now.date_naive());
        }
        record.paid = before.paid + amount;
        record.paid_date = Some(now);

        let remaining = total_due.saturating_sub(record.paid);
        if remaining.is_zero() {
            record.fully_paid = true;
        }
        record.remaining = Some(if record.fully_paid { Money::ZERO } else { remaining });
        record.total_due = Some(total_due);

        let updated = record.clone();

        debug!(
            customer = %customer.id,
            %month,
            %amount,
            paid = %updated.paid,
            %remaining,
            "payment applied"
        );

        events.emit(LedgerEvent::PaymentApplied {
            customer_id: customer.id.clone(),
            month,
            reference: Uuid::new_v4(),
            amount,
            new_paid: updated.paid,
            remaining,
            timestamp: now,
        });

        if updated.fully_paid && !before.fully_paid {
            events.emit(LedgerEvent::MonthSettled {
                customer_id: customer.id.clone(),
                month,
                total_due,
                timestamp: now,
            });
        }

        Ok(updated)
    }

    /// apply a payment at the system time
    pub fn apply_payment_now(
        &self,
        customer: &mut Customer,
        month: MonthKey,
        amount: Money,
        events: &mut EventStore,
    ) -> Result<MonthlyPayment> {
        let time_provider = SafeTimeProvider::new(TimeSource::System);
        self.apply_payment(customer, month, amount, &time_provider, events)
    }

    /// all-or-nothing toggle: settle the whole amount due, or reset to nothing paid
    pub fn set_fully_paid(
        &self,
        customer: &mut Customer,
        month: MonthKey,
        to_paid: bool,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> MonthlyPayment {
        let before = self.snapshot(customer, month);
        let now = time_provider.now();

        let record = customer.payment_entry(month);
        if record.date.is_none() {
            record.date = Some(now.date_naive());
        }

        if to_paid {
            record.paid = before.total_due;
            record.fully_paid = true;
            record.paid_date = Some(now);
            record.remaining = Some(Money::ZERO);
        } else {
            record.paid = Money::ZERO;
            record.fully_paid = false;
            record.paid_date = None;
            record.remaining = Some(before.total_due);
        }
        record.total_due = Some(before.total_due);

        let updated = record.clone();

        debug!(customer = %customer.id, %month, to_paid, total_due = %before.total_due, "settled flag set");

        if to_paid {
            events.emit(LedgerEvent::MonthSettled {
                customer_id: customer.id.clone(),
                month,
                total_due: before.total_due,
                timestamp: now,
            });
        } else {
            events.emit(LedgerEvent::MonthReopened {
                customer_id: customer.id.clone(),
                month,
                reversed_paid: before.paid,
                timestamp: now,
            });
        }

        updated
    }

    /// set the settled flag at the system time
    pub fn set_fully_paid_now(
        &self,
        customer: &mut Customer,
        month: MonthKey,
        to_paid: bool,
        events: &mut EventStore,
    ) -> MonthlyPayment {
        let time_provider = SafeTimeProvider::new(TimeSource::System);
        self.set_fully_paid(customer, month, to_paid, &time_provider, events)
    }

    /// flip the settled state of `month`
    pub fn toggle_fully_paid(
        &self,
        customer: &mut Customer,
        month: MonthKey,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> MonthlyPayment {
        let to_paid = !self.snapshot(customer, month).fully_paid;
        self.set_fully_paid(customer, month, to_paid, time_provider, events)
    }

    /// create the month's record with `date`, or only move the date of an existing one
    pub fn initialize_month(
        &self,
        customer: &mut Customer,
        month: MonthKey,
        date: NaiveDate,
        events: &mut EventStore,
    ) -> MonthlyPayment {
        let customer_id = customer.id.clone();

        match customer.payment_mut(month) {
            Some(record) => {
                let old_date = record.date;
                if old_date != Some(date) {
                    record.date = Some(date);
                    events.emit(LedgerEvent::MonthDateAssigned {
                        customer_id,
                        month,
                        old_date,
                        new_date: date,
                    });
                }
                record.clone()
            }
            None => {
                let record = MonthlyPayment::with_date(month, date);
                customer.upsert_payment(record.clone());
                events.emit(LedgerEvent::MonthInitialized {
                    customer_id,
                    month,
                    date,
                });
                record
            }
        }
    }
}
