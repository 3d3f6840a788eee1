//! Configuration structures for the intake pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the faturex pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaturexConfig {
    /// Directory and file layout for batch runs.
    pub paths: PathsConfig,

    /// Extraction settings.
    pub extraction: ExtractionConfig,
}

impl Default for FaturexConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

/// Where batch runs read from and write to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned (non-recursively) for incoming invoice files.
    pub inbox_dir: PathBuf,

    /// Directory committed source files are moved into.
    pub archive_dir: PathBuf,

    /// CSV ledger file, the system of record.
    pub ledger_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            inbox_dir: PathBuf::from("inbox"),
            archive_dir: PathBuf::from("processed"),
            ledger_file: PathBuf::from("ledger.csv"),
        }
    }
}

/// Invoice extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Distributor label stamped on records extracted from PDF bills.
    pub pdf_distributor: String,

    /// Distributor label stamped on records extracted from XML bills.
    pub xml_distributor: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pdf_distributor: "COMPAGÁS".to_string(),
            xml_distributor: "Cegás".to_string(),
        }
    }
}

impl FaturexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
