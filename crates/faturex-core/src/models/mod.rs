//! Data models: invoice records and pipeline configuration.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, FaturexConfig, PathsConfig};
pub use record::{FieldKey, InvoiceRecord, RawRecord};
