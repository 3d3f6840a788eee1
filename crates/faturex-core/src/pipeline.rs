//! Batch orchestration: inbox scan, per-file pipeline, ledger commit, archive.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{AcquireError, ExtractError, LedgerError, Result};
use crate::extract::{SourceDocument, strategy_for};
use crate::ledger::{LedgerStore, NaturalKey};
use crate::models::config::FaturexConfig;
use crate::models::record::InvoiceRecord;
use crate::pdf;
use crate::xml::XmlDocument;

/// Sequential invoice intake over one inbox directory.
///
/// Each file is carried through extraction, validation, normalization,
/// duplicate check, ledger append, and archival before the next file
/// starts. The ledger is reloaded before every duplicate check and
/// rewritten after every append, so a batch of N commits costs N full
/// rewrites. Batches are tens of files; simplicity wins here.
pub struct Pipeline {
    inbox_dir: PathBuf,
    archive_dir: PathBuf,
    store: LedgerStore,
    pdf_distributor: String,
    xml_distributor: String,
}

impl Pipeline {
    pub fn new(config: &FaturexConfig) -> Self {
        Self {
            inbox_dir: config.paths.inbox_dir.clone(),
            archive_dir: config.paths.archive_dir.clone(),
            store: LedgerStore::new(config.paths.ledger_file.clone()),
            pdf_distributor: config.extraction.pdf_distributor.clone(),
            xml_distributor: config.extraction.xml_distributor.clone(),
        }
    }

    /// Files sitting in the inbox, non-recursive, in name order.
    pub fn inbox_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.inbox_dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Process every file in the inbox.
    ///
    /// Per-file failures are recorded in the report and never stop the
    /// batch. A ledger failure does: the remaining files are not touched.
    pub fn run(&self) -> Result<BatchReport> {
        let files = self.inbox_files()?;
        info!(
            "Processing {} files from {}",
            files.len(),
            self.inbox_dir.display()
        );

        let mut report = BatchReport::default();
        for path in files {
            let outcome = self.process_file(&path)?;
            report.files.push(FileReport { path, outcome });
        }
        Ok(report)
    }

    /// Carry one file through the whole pipeline.
    ///
    /// Every local failure comes back as a [`FileOutcome::Skipped`] with
    /// the file left in the inbox. The `Err` branch is reserved for
    /// ledger I/O, which poisons the whole batch.
    pub fn process_file(&self, path: &Path) -> std::result::Result<FileOutcome, LedgerError> {
        let doc = match acquire(path) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                let reason = SkipReason::UnsupportedExtension(extension_of(path));
                warn!("Skipped {}: {}", path.display(), reason);
                return Ok(FileOutcome::Skipped(reason));
            }
            Err(e) => {
                warn!("Skipped {}: {}", path.display(), e);
                return Ok(FileOutcome::Skipped(SkipReason::Acquisition(e)));
            }
        };

        let strategy = strategy_for(&doc);
        debug!(
            "Extracting {} with the {} strategy",
            path.display(),
            strategy.name()
        );
        let raw = strategy.extract(&doc);

        let distributor = match &doc {
            SourceDocument::Text(_) => &self.pdf_distributor,
            SourceDocument::Tree(_) => &self.xml_distributor,
        };
        let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        let record = match InvoiceRecord::from_raw(&raw, distributor, filename) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipped {}: {}", path.display(), e);
                return Ok(FileOutcome::Skipped(SkipReason::Rejected(e)));
            }
        };

        let mut ledger = self.store.load()?;
        if ledger.contains(&NaturalKey::of(&record)) {
            warn!("Skipped {}: already in the ledger", path.display());
            return Ok(FileOutcome::Skipped(SkipReason::Duplicate));
        }
        ledger.append(record.clone());
        self.store.persist(&ledger)?;
        info!(
            "Committed invoice {} from {}",
            record.document_number,
            path.display()
        );

        match self.archive(path) {
            Ok(dest) => {
                debug!("Archived {} to {}", path.display(), dest.display());
                Ok(FileOutcome::Committed { record })
            }
            Err(e) => {
                warn!(
                    "Ledger row kept but {} could not be archived: {}",
                    path.display(),
                    e
                );
                Ok(FileOutcome::CommittedUnarchived {
                    record,
                    error: e.to_string(),
                })
            }
        }
    }

    /// Move a committed file into the archive directory, keeping its name.
    fn archive(&self, path: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.archive_dir)?;
        let name = path.file_name().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name")
        })?;
        let dest = self.archive_dir.join(name);

        // rename does not cross filesystems
        if fs::rename(path, &dest).is_err() {
            fs::copy(path, &dest)?;
            fs::remove_file(path)?;
        }
        Ok(dest)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Load a source file into the document form its extension calls for.
///
/// `Ok(None)` means the extension is not one this pipeline handles.
pub fn acquire(path: &Path) -> std::result::Result<Option<SourceDocument>, AcquireError> {
    match extension_of(path).as_str() {
        "pdf" => pdf::read_text(path).map(|text| Some(SourceDocument::Text(text))),
        "xml" => {
            let raw = fs::read_to_string(path).map_err(|e| AcquireError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            XmlDocument::parse(&raw).map(|tree| Some(SourceDocument::Tree(tree)))
        }
        _ => Ok(None),
    }
}

/// Terminal state of one file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Row appended and source file moved to the archive.
    Committed { record: InvoiceRecord },
    /// Row appended but the file could not be moved out of the inbox.
    /// The ledger now references a file the archive does not hold.
    CommittedUnarchived { record: InvoiceRecord, error: String },
    /// Nothing appended; the file stays where it was.
    Skipped(SkipReason),
}

/// Why a file was left in the inbox.
#[derive(Debug)]
pub enum SkipReason {
    /// Extension is neither `.pdf` nor `.xml`.
    UnsupportedExtension(String),
    /// The source document could not be read or parsed.
    Acquisition(AcquireError),
    /// Extraction or validation rejected the document.
    Rejected(ExtractError),
    /// The ledger already holds a row with the same natural key.
    Duplicate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedExtension(ext) => write!(f, "unsupported extension {ext:?}"),
            SkipReason::Acquisition(e) => e.fmt(f),
            SkipReason::Rejected(e) => e.fmt(f),
            SkipReason::Duplicate => f.write_str("already in the ledger"),
        }
    }
}

/// Outcome of one file, with its inbox path.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Everything that happened in one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Rows added to the ledger, archived or not.
    pub fn committed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| {
                matches!(
                    f.outcome,
                    FileOutcome::Committed { .. } | FileOutcome::CommittedUnarchived { .. }
                )
            })
            .count()
    }

    /// Files skipped because their natural key was already present.
    pub fn duplicates(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Skipped(SkipReason::Duplicate)))
            .count()
    }

    /// Files rejected by acquisition, extraction, or validation.
    pub fn rejected(&self) -> usize {
        self.files
            .iter()
            .filter(|f| {
                matches!(
                    f.outcome,
                    FileOutcome::Skipped(SkipReason::Acquisition(_))
                        | FileOutcome::Skipped(SkipReason::Rejected(_))
                )
            })
            .count()
    }

    /// Files whose extension the pipeline does not handle.
    pub fn ignored(&self) -> usize {
        self.files
            .iter()
            .filter(|f| {
                matches!(
                    f.outcome,
                    FileOutcome::Skipped(SkipReason::UnsupportedExtension(_))
                )
            })
            .count()
    }

    /// Committed files still sitting in the inbox.
    pub fn archive_failures(&self) -> Vec<&FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::CommittedUnarchived { .. }))
            .collect()
    }
}
