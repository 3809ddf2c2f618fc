// Partition content signature for idempotent writes
//
// The signature identifies "have I already written exactly this content";
// it is not an integrity hash. Rows are sorted on the full column tuple
// before hashing, so the digest is insensitive to input row order.

use blake3::Hasher;
use std::cmp::Ordering;

use crate::normalize::NormalizedRow;

/// Hex length of a partition signature: 12 chars (6 digest bytes).
pub const SIGNATURE_LEN: usize = 12;

/// Compute the deterministic content signature for one partition.
///
/// The digest is seeded with the event_date and covers the column-restricted
/// content {sensor_id, parameter, unit, value, date_utc} of every row.
pub fn partition_signature(event_date: &str, rows: &[&NormalizedRow]) -> String {
    let mut sorted: Vec<&NormalizedRow> = rows.to_vec();
    sorted.sort_by(|a, b| row_content_ordering(a, b));

    let mut hasher = Hasher::new();
    hasher.update(event_date.as_bytes());

    for row in sorted {
        hash_str(&mut hasher, Some(&row.sensor_id));
        hash_str(&mut hasher, row.parameter.as_deref());
        hash_str(&mut hasher, row.unit.as_deref());
        hash_value(&mut hasher, row.value);
        hasher.update(&row.date_utc.timestamp_micros().to_le_bytes());
    }

    let digest = hasher.finalize();
    hex::encode(&digest.as_bytes()[..SIGNATURE_LEN / 2])
}

/// Total order over the full hashed column tuple. Sorting on a prefix of
/// the columns would leave equal-prefix rows in input order and make the
/// signature order-sensitive.
fn row_content_ordering(a: &NormalizedRow, b: &NormalizedRow) -> Ordering {
    a.date_utc
        .cmp(&b.date_utc)
        .then_with(|| a.sensor_id.cmp(&b.sensor_id))
        .then_with(|| a.parameter.cmp(&b.parameter))
        .then_with(|| a.unit.cmp(&b.unit))
        .then_with(|| value_ordering(a.value, b.value))
}

fn value_ordering(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

// Fields are length-prefixed and presence-tagged so adjacent values cannot
// alias across field boundaries.
fn hash_str(hasher: &mut Hasher, field: Option<&str>) {
    match field {
        Some(s) => {
            hasher.update(&[1]);
            hasher.update(&(s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
}

fn hash_value(hasher: &mut Hasher, value: Option<f64>) {
    match value {
        Some(v) => {
            hasher.update(&[1]);
            hasher.update(&v.to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn row(ts: &str, parameter: &str, value: Option<f64>) -> NormalizedRow {
        let date_utc: DateTime<Utc> = ts.parse().unwrap();
        NormalizedRow {
            sensor_id: "359".to_string(),
            parameter: Some(parameter.to_string()),
            unit: Some("µg/m³".to_string()),
            value,
            date_utc,
            event_date: date_utc.format("%Y-%m-%d").to_string(),
        }
    }

    #[test]
    fn signature_is_deterministic_and_short_hex() {
        let a = row("2025-08-01T00:00:00Z", "pm25", Some(1.0));
        let b = row("2025-08-01T01:00:00Z", "pm10", Some(2.0));

        let first = partition_signature("2025-08-01", &[&a, &b]);
        let second = partition_signature("2025-08-01", &[&a, &b]);

        assert_eq!(first, second);
        assert_eq!(first.len(), SIGNATURE_LEN);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_order_insensitive() {
        let a = row("2025-08-01T00:00:00Z", "pm25", Some(1.0));
        let b = row("2025-08-01T01:00:00Z", "pm10", Some(2.0));
        let c = row("2025-08-01T02:00:00Z", "o3", None);

        let forward = partition_signature("2025-08-01", &[&a, &b, &c]);
        let reversed = partition_signature("2025-08-01", &[&c, &b, &a]);

        assert_eq!(forward, reversed);
    }

    #[test]
    fn equal_sort_prefix_rows_still_hash_order_insensitively() {
        // Same timestamp, sensor, parameter, unit; only the value differs.
        let a = row("2025-08-01T00:00:00Z", "pm25", Some(1.0));
        let b = row("2025-08-01T00:00:00Z", "pm25", Some(2.0));

        assert_eq!(
            partition_signature("2025-08-01", &[&a, &b]),
            partition_signature("2025-08-01", &[&b, &a]),
        );
    }

    #[test]
    fn distinct_content_yields_distinct_signature() {
        let a = row("2025-08-01T00:00:00Z", "pm25", Some(1.0));
        let changed = row("2025-08-01T00:00:00Z", "pm25", Some(1.1));

        assert_ne!(
            partition_signature("2025-08-01", &[&a]),
            partition_signature("2025-08-01", &[&changed]),
        );
    }

    #[test]
    fn absent_and_present_fields_do_not_alias() {
        let mut with_unit = row("2025-08-01T00:00:00Z", "pm25", None);
        let mut without_unit = with_unit.clone();
        with_unit.unit = Some(String::new());
        without_unit.unit = None;

        assert_ne!(
            partition_signature("2025-08-01", &[&with_unit]),
            partition_signature("2025-08-01", &[&without_unit]),
        );
    }

    #[test]
    fn event_date_seeds_the_digest() {
        let a = row("2025-08-01T00:00:00Z", "pm25", Some(1.0));

        assert_ne!(
            partition_signature("2025-08-01", &[&a]),
            partition_signature("2025-08-02", &[&a]),
        );
    }
}
