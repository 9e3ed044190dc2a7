//! Zonal statistics
//!
//! Parameters, reducers and the aggregation of buffered regions over
//! every image of a collection.

mod params;
mod record;
mod reducer;
mod sampling;
mod stats;

pub use params::{AggregationParams, ResolvedParams, DEFAULT_DATETIME_FORMAT, DEFAULT_DATETIME_NAME};
pub use record::{NullPolicy, ResultRecord, TIMESTAMP_FIELD};
pub use reducer::Reducer;
pub use sampling::SamplingGrid;
pub use stats::{zonal_stats, ZonalAggregator};
