//! Record table: types, ingestion and standardization.

pub mod loader;
pub mod preprocessing;
pub mod record;

pub use loader::{load_records, synthetic_records};
pub use preprocessing::normalize_records;
pub use record::{
    FieldDescriptor, FinancialRecord, ACCOUNTING_FEATURES, MACRO_FEATURES, MARKET_FEATURES,
    NUMERIC_FIELDS,
};
