// Raw API payload shapes and the flattened row record
//
// Every nesting level in the API response is optional. Items with missing
// fields flatten to rows with absent values instead of failing the page.

use serde::Deserialize;
use serde_json::Value;

/// One page of the measurements endpoint: `{"results": [...]}`.
#[derive(Debug, Deserialize)]
pub struct MeasurementsPage {
    #[serde(default)]
    pub results: Vec<RawMeasurement>,
}

/// One item from a measurements page, as returned by the API.
///
/// `value` is kept as raw JSON here; numeric coercion happens during
/// normalization so a malformed reading never fails extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMeasurement {
    pub value: Option<Value>,
    pub parameter: Option<RawParameter>,
    pub period: Option<RawPeriod>,
}

/// Parameter details: what was measured and in which units.
#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    pub name: Option<String>,
    pub units: Option<String>,
}

/// The time window of a measurement.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPeriod {
    #[serde(rename = "datetimeFrom")]
    pub datetime_from: Option<RawInstant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInstant {
    pub utc: Option<String>,
}

/// Flattened measurement record produced by the extractor.
///
/// Carries no identity beyond its fields; duplicates are possible and are
/// not deduplicated at this stage.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    pub sensor_id: String,
    pub parameter: Option<String>,
    pub unit: Option<String>,
    pub value: Option<Value>,
    pub date_utc: Option<String>,
}

impl MeasurementRow {
    /// Flatten one raw API item into a row. Missing nested fields map to
    /// `None`, never an error.
    pub fn from_raw(sensor_id: u64, raw: RawMeasurement) -> Self {
        let (parameter, unit) = match raw.parameter {
            Some(p) => (p.name, p.units),
            None => (None, None),
        };

        let date_utc = raw
            .period
            .and_then(|p| p.datetime_from)
            .and_then(|d| d.utc);

        Self {
            sensor_id: sensor_id.to_string(),
            parameter,
            unit,
            value: raw.value,
            date_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_from_json(value: serde_json::Value) -> RawMeasurement {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn flattens_complete_item() {
        let raw = raw_from_json(json!({
            "value": 12.3,
            "parameter": {"name": "pm25", "units": "µg/m³"},
            "period": {"datetimeFrom": {"utc": "2025-08-01T00:00:00Z"}}
        }));

        let row = MeasurementRow::from_raw(359, raw);
        assert_eq!(row.sensor_id, "359");
        assert_eq!(row.parameter.as_deref(), Some("pm25"));
        assert_eq!(row.unit.as_deref(), Some("µg/m³"));
        assert_eq!(row.value, Some(json!(12.3)));
        assert_eq!(row.date_utc.as_deref(), Some("2025-08-01T00:00:00Z"));
    }

    #[test]
    fn missing_nested_fields_become_absent() {
        let raw = raw_from_json(json!({}));

        let row = MeasurementRow::from_raw(7, raw);
        assert_eq!(row.sensor_id, "7");
        assert_eq!(row.parameter, None);
        assert_eq!(row.unit, None);
        assert_eq!(row.value, None);
        assert_eq!(row.date_utc, None);
    }

    #[test]
    fn partially_nested_period_flattens_to_absent() {
        let raw = raw_from_json(json!({
            "value": 4,
            "period": {"datetimeFrom": {}}
        }));

        let row = MeasurementRow::from_raw(1, raw);
        assert_eq!(row.value, Some(json!(4)));
        assert_eq!(row.date_utc, None);
    }

    #[test]
    fn page_with_no_results_field_decodes_empty() {
        let page: MeasurementsPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.results.is_empty());
    }
}
