//! Table export
//!
//! Strips geometry from result records and writes them as a CSV table
//! below a storage root.

mod exporter;
mod task;

pub use exporter::{strip_geometry, table_columns, LocalDriveExporter, TableExporter};
pub use task::{ExportReceipt, ExportTask, FileFormat};
