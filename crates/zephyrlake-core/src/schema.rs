// Fixed Arrow schema for normalized sensor measurements
//
// Column order is fixed for output determinism; the Parquet files written
// per partition always carry these six columns in this order.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use std::sync::{Arc, OnceLock};

pub const SENSOR_ID: &str = "sensor_id";
pub const PARAMETER: &str = "parameter";
pub const UNIT: &str = "unit";
pub const VALUE: &str = "value";
pub const DATE_UTC: &str = "date_utc";
pub const EVENT_DATE: &str = "event_date";

/// Returns the Arrow schema for normalized measurements.
pub fn measurements_schema() -> Schema {
    measurements_schema_arc().as_ref().clone()
}

/// Returns a cached `Arc<Schema>` for normalized measurements.
pub fn measurements_schema_arc() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| Arc::new(build_schema())))
}

fn build_schema() -> Schema {
    Schema::new(vec![
        Field::new(SENSOR_ID, DataType::Utf8, false),
        Field::new(PARAMETER, DataType::Utf8, true),
        Field::new(UNIT, DataType::Utf8, true),
        Field::new(VALUE, DataType::Float64, true),
        // Rows without a valid timestamp are dropped during normalization,
        // so the column is non-nullable here.
        Field::new(
            DATE_UTC,
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
        Field::new(EVENT_DATE, DataType::Utf8, false),
    ])
}
