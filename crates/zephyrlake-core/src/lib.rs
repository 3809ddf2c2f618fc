// zephyrlake-core - Pure measurement processing logic
//
// This crate contains the processing logic for turning flattened OpenAQ
// measurement rows into a typed Arrow table and Parquet bytes. No network,
// no filesystem, no async. The extractor and writer crates layer I/O on top.

pub mod normalize;
pub mod parquet;
pub mod schema;
pub mod signature;
pub mod types;

pub use normalize::{normalize, NormalizedRow, NormalizedTable};
pub use schema::{measurements_schema, measurements_schema_arc};
pub use signature::partition_signature;
pub use types::{MeasurementRow, MeasurementsPage, RawMeasurement};
