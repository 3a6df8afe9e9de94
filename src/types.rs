use serde::{Deserialize, Serialize};
use std::fmt;

/// opaque customer identifier as issued by the record store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        CustomerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(s: &str) -> Self {
        CustomerId::new(s)
    }
}

impl From<String> for CustomerId {
    fn from(s: String) -> Self {
        CustomerId(s)
    }
}

pub type ZoneId = String;
pub type VillageId = String;
pub type WorkerId = String;

/// payment classification of one customer for one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// settled, either computed or explicitly flagged
    Paid,
    /// something paid but not settled
    Partial,
    /// nothing paid and not settled
    Unpaid,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Fully Paid",
            PaymentStatus::Partial => "Partial Payment",
            PaymentStatus::Unpaid => "Not Paid",
        }
    }
}

/// how the carry-over from the preceding month is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverPolicy {
    /// resolve the preceding month's snapshot from the stored ledger
    #[default]
    Recompute,
    /// trust the `remaining` copy stored on the preceding month's record,
    /// except when that month is settled by its own paid amount
    StoredRemaining,
}

/// stored shape used when writing customers back out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordLayout {
    /// `monthlyPayments` array
    #[default]
    Collection,
    /// legacy `payments` map keyed by month
    LegacyMap,
}
