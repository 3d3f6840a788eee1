//! Core library for Brazilian utility invoice intake.
//!
//! This crate provides:
//! - Field extraction from text-bearing PDF bills and NFe or generic XML invoices
//! - Mandatory-field validation and pt-BR numeric normalization
//! - A CSV ledger with natural-key duplicate detection
//! - A batch pipeline that commits records and archives their source files

pub mod error;
pub mod models;
pub mod numeric;
pub mod xml;
pub mod pdf;
pub mod extract;
pub mod ledger;
pub mod pipeline;

pub use error::{AcquireError, ExtractError, FaturexError, LedgerError, Result};
pub use models::config::FaturexConfig;
pub use models::record::{FieldKey, InvoiceRecord, RawRecord};
pub use extract::{ExtractionStrategy, SourceDocument, strategy_for};
pub use ledger::{Ledger, LedgerStore, NaturalKey};
pub use pipeline::{BatchReport, FileOutcome, FileReport, Pipeline, SkipReason};
pub use xml::XmlDocument;
