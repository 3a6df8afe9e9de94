use thiserror::Error;

use crate::decimal::Money;
use crate::types::CustomerId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("amount cannot exceed remaining balance: remaining {remaining}, requested {requested}")]
    PaymentExceedsRemaining {
        remaining: Money,
        requested: Money,
    },

    #[error("invalid month key: {value:?} (expected YYYY-MM)")]
    InvalidMonthKey {
        value: String,
    },

    #[error("customer not found: {id}")]
    CustomerNotFound {
        id: CustomerId,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("malformed customer records: {message}")]
    MalformedRecords {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
