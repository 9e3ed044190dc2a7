//! Export requests and their receipts

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::ZonalError;

/// Table file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    #[default]
    Csv,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

impl FromStr for FileFormat {
    type Err = ZonalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            other => Err(ZonalError::ConfigError(format!("Unsupported table format '{}'", other))),
        }
    }
}

/// A request to write one table
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTask {
    /// File name without extension
    pub description: String,
    /// Folder below the storage root
    pub folder: String,
    pub file_format: FileFormat,
    /// Columns to write, in order; None writes every column in first-seen order
    pub selectors: Option<Vec<String>>,
}

impl ExportTask {
    pub fn new(description: &str, folder: &str) -> Self {
        ExportTask {
            description: description.to_string(),
            folder: folder.to_string(),
            file_format: FileFormat::Csv,
            selectors: None,
        }
    }

    pub fn with_selectors(mut self, selectors: Vec<String>) -> Self {
        self.selectors = Some(selectors);
        self
    }

    /// File name of the table
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.description, self.file_format.extension())
    }
}

/// Outcome of a finished export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

impl fmt::Display for ExportReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows x {} columns written to {}", self.rows, self.columns.len(), self.path.display())
    }
}
