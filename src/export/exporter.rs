//! Table exporters
//!
//! An exporter turns geometry-free records into a table at some storage
//! location. The local drive exporter writes below a root directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::errors::ZonalResult;
use crate::zonal::ResultRecord;

use super::task::{ExportReceipt, ExportTask, FileFormat};

/// Removes the geometry of every record
pub fn strip_geometry(records: Vec<ResultRecord>) -> Vec<ResultRecord> {
    records.into_iter().map(ResultRecord::strip_geometry).collect()
}

/// Columns of a table: the task's selectors, else first-seen attribute order
pub fn table_columns(records: &[ResultRecord], task: &ExportTask) -> Vec<String> {
    if let Some(selectors) = &task.selectors {
        return selectors.clone();
    }
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for name in record.attributes.names() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

/// Strategy for writing result tables to storage
pub trait TableExporter {
    /// Writes the records as one table
    ///
    /// # Arguments
    /// * `records` - Records without geometry
    /// * `task` - Table name, folder, format and columns
    ///
    /// # Returns
    /// A receipt naming the written file
    fn export(&self, records: &[ResultRecord], task: &ExportTask) -> ZonalResult<ExportReceipt>;
}

/// Writes tables to `<root>/<folder>/<description>.<ext>`
pub struct LocalDriveExporter {
    root: PathBuf,
}

impl LocalDriveExporter {
    pub fn new(root: &Path) -> Self {
        LocalDriveExporter { root: root.to_path_buf() }
    }

    /// Path a task's table is written to
    pub fn target_path(&self, task: &ExportTask) -> PathBuf {
        self.root.join(&task.folder).join(task.file_name())
    }

    fn write_csv(&self, path: &Path, records: &[ResultRecord], columns: &[String]) -> ZonalResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        if !columns.is_empty() {
            writer.write_record(columns)?;
            for record in records {
                writer.write_record(columns.iter().map(|c| {
                    record.get(c).map(|v| v.to_string()).unwrap_or_default()
                }))?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

impl TableExporter for LocalDriveExporter {
    fn export(&self, records: &[ResultRecord], task: &ExportTask) -> ZonalResult<ExportReceipt> {
        let path = self.target_path(task);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        if records.iter().any(|r| r.geometry.is_some()) {
            warn!("Exporting records that still carry geometry; it is not written");
        }

        let columns = table_columns(records, task);
        debug!("Writing {} records to {} with columns {:?}", records.len(), path.display(), columns);
        match task.file_format {
            FileFormat::Csv => self.write_csv(&path, records, &columns)?,
        }

        let receipt = ExportReceipt { path, rows: records.len(), columns };
        info!("Export '{}': {}", task.description, receipt);
        Ok(receipt)
    }
}
