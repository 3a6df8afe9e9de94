//! Customer record store boundary.
//!
//! Stored customers may carry a month collection, a legacy month map, or
//! both. Everything crossing this boundary is already normalized to one
//! record per month; the engine never sees the raw shapes.

pub mod memory;
pub mod record;

use serde::{Deserialize, Serialize};

use crate::customer::{Customer, MonthlyPayment};
use crate::errors::Result;
use crate::types::{CustomerId, VillageId, ZoneId};

pub use memory::InMemoryCustomerStore;

/// source of customers and sink for amended month records
pub trait CustomerStore {
    /// load one customer with its normalized ledger
    fn get_customer(&self, id: &CustomerId) -> Result<Customer>;

    /// insert or replace the customer's record for `payment.month`
    fn set_monthly_payment(&mut self, id: &CustomerId, payment: MonthlyPayment) -> Result<()>;

    /// customers matching `filter`, in store order
    fn list_customers(&self, filter: &CustomerFilter) -> Vec<Customer>;
}

/// selection of customers; empty criteria match everyone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerFilter {
    pub zone_id: Option<ZoneId>,
    pub village_id: Option<VillageId>,
    pub ids: Option<Vec<CustomerId>>,
}

impl CustomerFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn zone(zone_id: impl Into<ZoneId>) -> Self {
        Self {
            zone_id: Some(zone_id.into()),
            ..Self::default()
        }
    }

    pub fn village(village_id: impl Into<VillageId>) -> Self {
        Self {
            village_id: Some(village_id.into()),
            ..Self::default()
        }
    }

    pub fn ids(ids: impl IntoIterator<Item = CustomerId>) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(zone) = &self.zone_id {
            if customer.zone_id.as_ref() != Some(zone) {
                return false;
            }
        }
        if let Some(village) = &self.village_id {
            if customer.village_id.as_ref() != Some(village) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&customer.id) {
                return false;
            }
        }
        true
    }
}
