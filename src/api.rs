//! Library entry point for complete extraction runs

use crate::collection::ImageCollection;
use crate::config::RunConfig;
use crate::errors::{ZonalError, ZonalResult};
use crate::export::{strip_geometry, ExportReceipt, ExportTask, LocalDriveExporter, TableExporter};
use crate::features::{buffer_points, Region};
use crate::zonal::{ResultRecord, ZonalAggregator};

/// Main interface to the zonalkit library
pub struct ZonalKit {
    config: RunConfig,
    show_progress: bool,
}

impl ZonalKit {
    /// Create a new instance for a run configuration
    pub fn new(config: RunConfig) -> Self {
        ZonalKit { config, show_progress: false }
    }

    /// Draw a progress bar while aggregating
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Loads the collection and keeps the configured years
    pub fn load_collection(&self) -> ZonalResult<ImageCollection> {
        let collection = ImageCollection::load(
            self.config.collection_path()?,
            self.config.collection.date_pattern.as_deref(),
        )?;
        collection.filter_years(self.config.collection.start_year, self.config.collection.end_year)
    }

    /// Buffered regions of the configured points
    pub fn regions(&self) -> Vec<Region> {
        let buffer = buffer_points(self.config.buffer.radius, self.config.buffer.bounds);
        self.config.point_records().iter().map(buffer).collect()
    }

    /// Runs point preparation and zonal aggregation
    ///
    /// # Returns
    /// The collection used and the records, geometry still attached
    pub fn extract(&self) -> ZonalResult<(ImageCollection, Vec<ResultRecord>)> {
        self.config.validate()?;
        let regions = self.regions();
        let mut collection = self.load_collection()?;
        let records = ZonalAggregator::new()
            .with_progress(self.show_progress)
            .run(&mut collection, &regions, &self.config.params)?;
        Ok((collection, records))
    }

    /// Extracts and exports the table
    ///
    /// Columns are the point id, renamed bands, renamed image properties,
    /// the datetime field and `timestamp`.
    pub fn run(&self) -> ZonalResult<ExportReceipt> {
        let (collection, records) = self.extract()?;
        let representative = collection.first()
            .ok_or_else(|| ZonalError::EmptyCollection(collection.id().to_string()))?;
        let resolved = self.config.params.resolve(representative)?;

        let mut selectors = vec![self.config.points.id_field.clone()];
        selectors.extend(resolved.output_columns());

        let task = ExportTask::new(&self.config.export_description(), &self.config.export.folder)
            .with_selectors(selectors);
        let exporter = LocalDriveExporter::new(&self.config.export.root);
        exporter.export(&strip_geometry(records), &task)
    }

    /// Lists the images of the configured collection and years
    pub fn inspect(&self) -> ZonalResult<String> {
        let collection = self.load_collection()?;
        let mut result = format!(
            "Collection '{}': {} images from {} to {}\n",
            collection.id(),
            collection.len(),
            self.config.collection.start_year,
            self.config.collection.end_year
        );
        for image in collection.images() {
            result.push_str(&format!("\n{}", image));
        }
        Ok(result)
    }
}
