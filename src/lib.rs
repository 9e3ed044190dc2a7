pub mod io;
pub mod tiff;
pub mod compression;
pub mod raster;
pub mod coordinate;
pub mod collection;
pub mod features;
pub mod zonal;
pub mod export;
pub mod config;
pub mod utils;
pub mod commands;
pub mod api;
pub mod errors;

pub use crate::api::ZonalKit;
pub use crate::errors::{ZonalError, ZonalResult};

pub use collection::{Image, ImageCollection, Value};
pub use config::RunConfig;
pub use coordinate::{BoundingBox, Point, CoordinateTransformer, CoordinateSystem};
pub use export::{ExportTask, LocalDriveExporter, TableExporter};
pub use features::{buffer_points, PointRecord, Region};
pub use zonal::{zonal_stats, AggregationParams, Reducer, ResultRecord};
