//! Zonal statistics over an image collection

use log::{debug, info, warn};

use crate::collection::{Attributes, Image, ImageCollection, Value};
use crate::errors::{ZonalError, ZonalResult};
use crate::features::Region;
use crate::raster::PixelWindow;
use crate::utils::progress::ProgressTracker;

use super::params::{AggregationParams, ResolvedParams};
use super::record::{ResultRecord, TIMESTAMP_FIELD};
use super::sampling::SamplingGrid;

/// Reduces every region over every image of a collection
pub struct ZonalAggregator {
    show_progress: bool,
}

impl Default for ZonalAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ZonalAggregator {
    pub fn new() -> Self {
        ZonalAggregator { show_progress: false }
    }

    /// Draws a progress bar over the images
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Runs the aggregation
    ///
    /// # Arguments
    /// * `collection` - Images in collection order
    /// * `regions` - Buffered points
    /// * `params` - Caller options; unset ones default from the first image
    ///
    /// # Returns
    /// Records in image order, then region order, without the records
    /// the null policy drops
    pub fn run(
        &self,
        collection: &mut ImageCollection,
        regions: &[Region],
        params: &AggregationParams,
    ) -> ZonalResult<Vec<ResultRecord>> {
        params.validate()?;
        let resolved = {
            let representative = collection.first()
                .ok_or_else(|| ZonalError::EmptyCollection(collection.id().to_string()))?;
            params.resolve(representative)?
        };
        info!("Zonal {} of {} band(s) over {} images and {} regions",
              resolved.reducer, resolved.bands.len(), collection.len(), regions.len());

        let progress = if self.show_progress {
            ProgressTracker::new(collection.len() as u64, "Zonal statistics")
        } else {
            ProgressTracker::hidden()
        };

        let mut records = Vec::new();
        for image in collection.images_mut() {
            progress.set_message(image.id());
            let result = reduce_image(image, regions, &resolved);
            image.release();
            records.extend(result?);
            progress.increment(1);
        }
        progress.finish();

        let total = records.len();
        records.retain(|r| resolved.null_policy.keeps(r, &resolved.bands_rename));
        if records.len() < total {
            debug!("Null filter ({}) dropped {} of {} records", resolved.null_policy, total - records.len(), total);
        }
        info!("Produced {} records", records.len());
        Ok(records)
    }
}

/// Zonal statistics with a hidden progress bar
pub fn zonal_stats(
    collection: &mut ImageCollection,
    regions: &[Region],
    params: &AggregationParams,
) -> ZonalResult<Vec<ResultRecord>> {
    ZonalAggregator::new().run(collection, regions, params)
}

/// Properties attached to every record of an image
fn image_properties(image: &Image, params: &ResolvedParams) -> ZonalResult<Attributes> {
    let mut props = Attributes::new();
    for (from, to) in params.img_props.iter().zip(&params.img_props_rename) {
        props.set(to, image.property(from).cloned().unwrap_or(Value::Null));
    }

    let date = match image.date() {
        Some(d) => Value::Text(params.format_date(&d)?),
        None => {
            warn!("Image '{}' has an out of range time {}", image.id(), image.time_start());
            Value::Null
        }
    };
    props.set(&params.datetime_name, date);
    props.set(TIMESTAMP_FIELD, Value::Integer(image.time_start()));
    Ok(props)
}

fn reduce_image(image: &mut Image, regions: &[Region], params: &ResolvedParams) -> ZonalResult<Vec<ResultRecord>> {
    let band_indices = params.bands.iter()
        .map(|band| image.band_index(band).ok_or_else(|| ZonalError::UnknownBand {
            band: band.clone(),
            image: image.id().to_string(),
        }))
        .collect::<ZonalResult<Vec<usize>>>()?;

    let props = image_properties(image, params)?;
    let footprint = match image.footprint() {
        Some(f) => f,
        None => return Ok(Vec::new()),
    };
    let grid = *image.grid();
    let sampling = SamplingGrid::for_image(&grid, params.scale, params.crs);

    let mut records = Vec::new();
    for region in regions.iter().filter(|r| r.bounds().intersects(&footprint)) {
        let pixels = sampling.sample(&grid, &region.geometry)?;

        let mut band_values = vec![Vec::with_capacity(pixels.len()); band_indices.len()];
        if let Some(window) = PixelWindow::covering(pixels.iter().copied()) {
            let data = image.read_window(window, &band_indices)?;
            for (pos, values) in band_values.iter_mut().enumerate() {
                values.extend(pixels.iter().filter_map(|&(c, r)| data.get(pos, c, r)));
            }
        }

        let mut attributes = region.attributes.clone();
        for (name, values) in params.bands_rename.iter().zip(band_values.iter_mut()) {
            attributes.set(name, params.reducer.reduce(values));
        }
        attributes.extend(&props);
        records.push(ResultRecord::new(region.geometry, attributes));
    }

    debug!("Image '{}': {} of {} regions overlap", image.id(), records.len(), regions.len());
    Ok(records)
}
