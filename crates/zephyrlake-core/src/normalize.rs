// Normalize flattened rows into the fixed-schema typed table
//
// The timestamp parse is the single source-of-truth validity filter: rows
// whose date_utc is missing or unparsable are dropped entirely. A missing
// reading only nulls the value column, the row itself is kept.

use arrow::array::{Float64Builder, RecordBatch, StringBuilder, TimestampMicrosecondBuilder};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::schema::measurements_schema_arc;
use crate::types::MeasurementRow;

/// One retained row of the normalized table.
///
/// Invariant: `event_date` is the UTC calendar date of `date_utc`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub sensor_id: String,
    pub parameter: Option<String>,
    pub unit: Option<String>,
    pub value: Option<f64>,
    pub date_utc: DateTime<Utc>,
    pub event_date: String,
}

/// Ordered collection of normalized rows, convertible to an Arrow batch
/// with the fixed column order {sensor_id, parameter, unit, value,
/// date_utc, event_date}.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    rows: Vec<NormalizedRow>,
}

impl NormalizedTable {
    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Group rows by event_date, in sorted date order.
    pub fn partitions(&self) -> BTreeMap<&str, Vec<&NormalizedRow>> {
        let mut groups: BTreeMap<&str, Vec<&NormalizedRow>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(row.event_date.as_str()).or_default().push(row);
        }
        groups
    }

    /// Number of distinct event_date values in the table.
    pub fn partition_count(&self) -> usize {
        self.partitions().len()
    }

    pub fn to_record_batch(&self) -> anyhow::Result<RecordBatch> {
        let refs: Vec<&NormalizedRow> = self.rows.iter().collect();
        rows_to_record_batch(&refs)
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: Vec<NormalizedRow>) -> Self {
        Self { rows }
    }
}

/// Convert rows into the fixed-schema Arrow batch.
pub fn rows_to_record_batch(rows: &[&NormalizedRow]) -> anyhow::Result<RecordBatch> {
    let schema = measurements_schema_arc();

    let mut sensor_id = StringBuilder::new();
    let mut parameter = StringBuilder::new();
    let mut unit = StringBuilder::new();
    let mut value = Float64Builder::new();
    let mut date_utc = TimestampMicrosecondBuilder::new().with_timezone("UTC");
    let mut event_date = StringBuilder::new();

    for row in rows {
        sensor_id.append_value(&row.sensor_id);
        parameter.append_option(row.parameter.as_deref());
        unit.append_option(row.unit.as_deref());
        value.append_option(row.value);
        date_utc.append_value(row.date_utc.timestamp_micros());
        event_date.append_value(&row.event_date);
    }

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(sensor_id.finish()),
            Arc::new(parameter.finish()),
            Arc::new(unit.finish()),
            Arc::new(value.finish()),
            Arc::new(date_utc.finish()),
            Arc::new(event_date.finish()),
        ],
    )?;

    Ok(batch)
}

/// Normalize flattened rows for one sensor into the typed table.
///
/// `sensor_id` is stamped onto every retained row as a string, keeping the
/// partition key stable across systems with differing integer widths.
pub fn normalize(rows: Vec<MeasurementRow>, sensor_id: u64) -> NormalizedTable {
    if rows.is_empty() {
        return NormalizedTable::default();
    }

    let total = rows.len();
    let sensor_id = sensor_id.to_string();
    let mut kept = Vec::with_capacity(total);

    for row in rows {
        let Some(date_utc) = row.date_utc.as_deref().and_then(parse_utc) else {
            debug!(sensor_id = %sensor_id, raw = ?row.date_utc, "dropping row with invalid timestamp");
            continue;
        };

        kept.push(NormalizedRow {
            sensor_id: sensor_id.clone(),
            parameter: row.parameter,
            unit: row.unit,
            value: coerce_value(row.value),
            date_utc,
            event_date: date_utc.format("%Y-%m-%d").to_string(),
        });
    }

    debug!(kept = kept.len(), fetched = total, "normalized rows");
    NormalizedTable { rows: kept }
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Numeric coercion for the value column. Numbers pass through, numeric
/// strings parse, everything else nulls out without dropping the row.
fn coerce_value(value: Option<Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
