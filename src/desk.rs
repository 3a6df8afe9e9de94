//! Collection desk: the entry point a consuming screen calls.
//!
//! Reads customers from a store, runs them through the ledger engine and
//! writes each amended month record back. All figures shown to a user come
//! from the engine; the desk never computes balances itself.

use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::debug;

use crate::aggregate::{bulk, Aggregator, BulkOutcome, CollectionSummary};
use crate::config::LedgerConfig;
use crate::customer::{Customer, MonthlyPayment};
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{EventStore, LedgerEvent};
use crate::ledger::{LedgerEngine, MonthSnapshot};
use crate::month::MonthKey;
use crate::store::{CustomerFilter, CustomerStore};
use crate::types::CustomerId;

/// ledger engine bound to a customer store
#[derive(Debug)]
pub struct CollectionDesk<S: CustomerStore> {
    engine: LedgerEngine,
    store: S,
    events: EventStore,
}

impl<S: CustomerStore> CollectionDesk<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self {
            engine: LedgerEngine::new(config),
            store,
            events: EventStore::new(),
        }
    }

    pub fn engine(&self) -> &LedgerEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    /// events recorded against one customer, in order
    pub fn events_for(&self, id: &CustomerId) -> Vec<&LedgerEvent> {
        self.events
            .events()
            .iter()
            .filter(|event| event.customer_id() == Some(id))
            .collect()
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        self.events.take_events()
    }

    pub fn snapshot(&self, id: &CustomerId, month: MonthKey) -> Result<MonthSnapshot> {
        let customer = self.store.get_customer(id)?;
        Ok(self.engine.snapshot(&customer, month))
    }

    pub fn record_payment(
        &mut self,
        id: &CustomerId,
        month: MonthKey,
        amount: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<MonthSnapshot> {
        let mut customer = self.store.get_customer(id)?;
        let record = self
            .engine
            .apply_payment(&mut customer, month, amount, time_provider, &mut self.events)?;
        self.store.set_monthly_payment(id, record)?;
        Ok(self.engine.snapshot(&customer, month))
    }

    pub fn record_payment_now(&mut self, id: &CustomerId, month: MonthKey, amount: Money) -> Result<MonthSnapshot> {
        let time_provider = SafeTimeProvider::new(TimeSource::System);
        self.record_payment(id, month, amount, &time_provider)
    }

    pub fn set_fully_paid(
        &mut self,
        id: &CustomerId,
        month: MonthKey,
        to_paid: bool,
        time_provider: &SafeTimeProvider,
    ) -> Result<MonthSnapshot> {
        let mut customer = self.store.get_customer(id)?;
        let record = self
            .engine
            .set_fully_paid(&mut customer, month, to_paid, time_provider, &mut self.events);
        self.store.set_monthly_payment(id, record)?;
        Ok(self.engine.snapshot(&customer, month))
    }

    pub fn toggle_fully_paid(
        &mut self,
        id: &CustomerId,
        month: MonthKey,
        time_provider: &SafeTimeProvider,
    ) -> Result<MonthSnapshot> {
        let mut customer = self.store.get_customer(id)?;
        let record = self
            .engine
            .toggle_fully_paid(&mut customer, month, time_provider, &mut self.events);
        self.store.set_monthly_payment(id, record)?;
        Ok(self.engine.snapshot(&customer, month))
    }

    pub fn initialize_month(&mut self, id: &CustomerId, month: MonthKey, date: NaiveDate) -> Result<MonthlyPayment> {
        let mut customer = self.store.get_customer(id)?;
        let record = self.engine.initialize_month(&mut customer, month, date, &mut self.events);
        self.store.set_monthly_payment(id, record.clone())?;
        Ok(record)
    }

    /// settle `month` for every customer the filter selects
    pub fn mark_all_paid(
        &mut self,
        filter: &CustomerFilter,
        month: MonthKey,
        time_provider: &SafeTimeProvider,
    ) -> Result<BulkOutcome> {
        let mut customers = self.store.list_customers(filter);
        let outcome = bulk::mark_all_paid(&self.engine, customers.iter_mut(), month, time_provider, &mut self.events);
        self.write_back(&customers, month)?;
        Ok(outcome)
    }

    /// assign `date` to `month` for every customer the filter selects
    pub fn set_monthly_date(&mut self, filter: &CustomerFilter, month: MonthKey, date: NaiveDate) -> Result<BulkOutcome> {
        let mut customers = self.store.list_customers(filter);
        let outcome = bulk::set_date_for_all(&self.engine, customers.iter_mut(), month, date, &mut self.events);
        self.write_back(&customers, month)?;
        Ok(outcome)
    }

    pub fn summary(&self, filter: &CustomerFilter, month: MonthKey) -> CollectionSummary {
        let customers = self.store.list_customers(filter);
        Aggregator::new(&self.engine).aggregate(&customers, month)
    }

    /// date most customers carry for `month`, used to prefill the date picker
    pub fn common_date(&self, filter: &CustomerFilter, month: MonthKey) -> Option<NaiveDate> {
        bulk::common_month_date(&self.store.list_customers(filter), month)
    }

    fn write_back(&mut self, customers: &[Customer], month: MonthKey) -> Result<()> {
        for customer in customers {
            if let Some(record) = customer.payment(month) {
                self.store.set_monthly_payment(&customer.id, record.clone())?;
            }
        }
        debug!(%month, customers = customers.len(), "month records written back");
        Ok(())
    }
}
