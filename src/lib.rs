pub mod aggregate;
pub mod config;
pub mod customer;
pub mod decimal;
pub mod desk;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod month;
pub mod store;
pub mod types;
pub mod views;

// re-export key types
pub use aggregate::{
    common_month_date, share_of_total, Aggregator, BulkOutcome, CollectionSummary, FlagConflict,
    GroupBreakdown, MonthComparison, StaleField, StaleRecord,
};
pub use config::{LedgerConfig, RiskThresholds};
pub use customer::{Customer, MonthlyPayment};
pub use decimal::{Money, Rate};
pub use desk::CollectionDesk;
pub use errors::{LedgerError, Result};
pub use events::{EventStore, LedgerEvent};
pub use ledger::{CarryOverChain, LedgerEngine, MonthSnapshot};
pub use month::MonthKey;
pub use store::{CustomerFilter, CustomerStore, InMemoryCustomerStore};
pub use types::{
    CarryOverPolicy, CustomerId, PaymentStatus, RecordLayout, VillageId, WorkerId, ZoneId,
};
pub use views::{SnapshotView, SummaryView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
