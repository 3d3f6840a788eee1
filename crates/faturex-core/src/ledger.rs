//! CSV ledger store and duplicate detection.

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::LedgerError;
use crate::models::record::InvoiceRecord;

/// Ledger column headers, in writing order.
pub const LEDGER_COLUMNS: [&str; 11] = [
    "CNPJ",
    "VALOR TOTAL",
    "VOLUME TOTAL",
    "DATA EMISSAO",
    "DATA INICIO",
    "DATA FIM",
    "NUMERO FATURA",
    "VALOR ICMS",
    "CORRECAO PCS",
    "DISTRIBUIDORA",
    "NOME DO ARQUIVO",
];

/// The fields that identify one billing event.
///
/// Two records with the same key describe the same invoice, whatever
/// their file names or issue dates say. Amounts compare numerically, so
/// a scale difference (`1500.00` vs `1500.000`) still matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    pub tax_id: String,
    pub period_start: String,
    pub period_end: String,
    pub total_amount: Decimal,
}

impl NaturalKey {
    /// Key of an invoice record.
    pub fn of(record: &InvoiceRecord) -> Self {
        Self {
            tax_id: record.tax_id.clone(),
            period_start: record.period_start.clone(),
            period_end: record.period_end.clone(),
            total_amount: record.total_amount,
        }
    }

    fn matches(&self, row: &InvoiceRecord) -> bool {
        row.tax_id == self.tax_id
            && row.period_start == self.period_start
            && row.period_end == self.period_end
            && row.total_amount == self.total_amount
    }
}

/// In-memory view of the ledger rows.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    rows: Vec<InvoiceRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows in file order.
    pub fn rows(&self) -> &[InvoiceRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when a row with this natural key is already present.
    pub fn contains(&self, key: &NaturalKey) -> bool {
        self.rows.iter().any(|row| key.matches(row))
    }

    /// Add a row. Duplicate checking is the caller's job.
    pub fn append(&mut self, record: InvoiceRecord) {
        self.rows.push(record);
    }
}

/// The ledger file on disk.
///
/// Reads and writes whole files: callers reload before checking for
/// duplicates and rewrite after appending, so concurrent external edits
/// between a batch's files are picked up.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger from disk.
    ///
    /// An absent file is an empty ledger. Anything else that goes wrong
    /// is fatal: an unreadable or unparsable ledger must stop the batch
    /// before duplicates slip in.
    pub fn load(&self) -> Result<Ledger, LedgerError> {
        if !self.path.exists() {
            debug!("Ledger {} not found, starting empty", self.path.display());
            return Ok(Ledger::new());
        }

        let mut reader =
            csv::ReaderBuilder::new()
                .from_path(&self.path)
                .map_err(|e| LedgerError::Read {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                })?;

        let mut ledger = Ledger::new();
        for result in reader.deserialize::<InvoiceRecord>() {
            let record = result.map_err(|e| LedgerError::Parse {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
            ledger.append(record);
        }

        debug!(
            "Loaded ledger {} with {} rows",
            self.path.display(),
            ledger.len()
        );
        Ok(ledger)
    }

    /// Write the ledger back to disk, header row included.
    pub fn persist(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        let write_err = |e: String| LedgerError::Write {
            path: self.path.display().to_string(),
            reason: e,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
            }
        }

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(|e| write_err(e.to_string()))?;

        wtr.write_record(LEDGER_COLUMNS)
            .map_err(|e| write_err(e.to_string()))?;
        for row in ledger.rows() {
            wtr.serialize(row).map_err(|e| write_err(e.to_string()))?;
        }
        wtr.flush().map_err(|e| write_err(e.to_string()))?;

        debug!(
            "Persisted ledger {} with {} rows",
            self.path.display(),
            ledger.len()
        );
        Ok(())
    }
}
