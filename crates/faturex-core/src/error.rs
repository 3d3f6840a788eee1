//! Error types for the faturex-core library.

use thiserror::Error;

use crate::models::record::FieldKey;

/// Main error type for the faturex library.
#[derive(Error, Debug)]
pub enum FaturexError {
    /// Source document acquisition error.
    #[error("acquisition error: {0}")]
    Acquire(#[from] AcquireError),

    /// Invoice field extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Ledger persistence error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a source file into extractable content.
///
/// These are per-file failures: a batch logs them and moves on to the
/// next file.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// Failed to read the source file from disk.
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// Failed to open/parse the PDF document.
    #[error("failed to parse PDF: {0}")]
    PdfParse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The XML document is not well formed.
    #[error("malformed XML: {0}")]
    XmlParse(String),
}

/// Errors raised while extracting and normalizing invoice fields.
///
/// Like [`AcquireError`], these reject a single file without touching
/// the rest of the batch.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The strategy found no fields at all in the document.
    #[error("no invoice data found")]
    NoData,

    /// One or more mandatory fields are absent or empty.
    #[error("missing mandatory fields: {}", join_fields(.0))]
    MissingFields(Vec<FieldKey>),

    /// A numeric field does not follow the pt-BR convention.
    #[error("malformed number in {field}: {value:?}")]
    MalformedNumber { field: FieldKey, value: String },
}

/// Errors raised by the ledger store.
///
/// The ledger is the system of record, so any of these aborts the
/// whole batch instead of skipping a file.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to open or read the ledger file.
    #[error("failed to read ledger {path}: {reason}")]
    Read { path: String, reason: String },

    /// The ledger contents could not be parsed as CSV rows.
    #[error("failed to parse ledger {path}: {reason}")]
    Parse { path: String, reason: String },

    /// Failed to write the ledger file back to disk.
    #[error("failed to write ledger {path}: {reason}")]
    Write { path: String, reason: String },
}

fn join_fields(fields: &[FieldKey]) -> String {
    fields
        .iter()
        .map(FieldKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for the faturex library.
pub type Result<T> = std::result::Result<T, FaturexError>;
