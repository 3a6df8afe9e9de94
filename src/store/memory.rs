use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::customer::{Customer, MonthlyPayment};
use crate::errors::{LedgerError, Result};
use crate::types::{CustomerId, RecordLayout};

use super::record::{customer_to_value, customers_from_json};
use super::{CustomerFilter, CustomerStore};

/// customer store held in memory, keeping load order
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerStore {
    customers: Vec<Customer>,
    index: HashMap<CustomerId, usize>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// load from a stored json array of customer documents
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut store = Self::new();
        for customer in customers_from_json(raw)? {
            store.insert(customer);
        }
        debug!(customers = store.len(), "customer store loaded");
        Ok(store)
    }

    /// add a customer, replacing any with the same id in place
    pub fn insert(&mut self, customer: Customer) {
        match self.index.get(&customer.id) {
            Some(&slot) => self.customers[slot] = customer,
            None => {
                self.index.insert(customer.id.clone(), self.customers.len());
                self.customers.push(customer);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// export every customer in the chosen layout
    pub fn to_json(&self, layout: RecordLayout) -> std::result::Result<String, serde_json::Error> {
        let docs: Vec<Value> = self
            .customers
            .iter()
            .map(|c| customer_to_value(c, layout))
            .collect();
        serde_json::to_string_pretty(&docs)
    }

    fn slot(&self, id: &CustomerId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| LedgerError::CustomerNotFound { id: id.clone() })
    }
}

impl CustomerStore for InMemoryCustomerStore {
    fn get_customer(&self, id: &CustomerId) -> Result<Customer> {
        let slot = self.slot(id)?;
        Ok(self.customers[slot].clone())
    }

    fn set_monthly_payment(&mut self, id: &CustomerId, payment: MonthlyPayment) -> Result<()> {
        let slot = self.slot(id)?;
        self.customers[slot].upsert_payment(payment);
        Ok(())
    }

    fn list_customers(&self, filter: &CustomerFilter) -> Vec<Customer> {
        self.customers
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect()
    }
}
