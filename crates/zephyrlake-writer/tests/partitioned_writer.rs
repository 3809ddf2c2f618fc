// Partitioned writer: idempotence, layout, and atomic-write hygiene.

use std::fs;
use std::path::Path;

use chrono::DateTime;
use serde_json::json;
use tempfile::TempDir;

use zephyrlake_core::{normalize, MeasurementRow, NormalizedTable};
use zephyrlake_writer::PartitionedWriter;

fn row(date_utc: &str, parameter: &str, value: f64) -> MeasurementRow {
    MeasurementRow {
        sensor_id: "359".to_string(),
        parameter: Some(parameter.to_string()),
        unit: Some("µg/m³".to_string()),
        value: Some(json!(value)),
        date_utc: Some(date_utc.to_string()),
    }
}

fn table(rows: Vec<MeasurementRow>) -> NormalizedTable {
    normalize(rows, 359)
}

fn partition_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn empty_table_makes_no_filesystem_change() {
    let out = TempDir::new().unwrap();
    let root = out.path().join("lake");

    let writer = PartitionedWriter::new(&root);
    let written = writer.write(&table(vec![])).unwrap();

    assert!(written.is_empty());
    assert!(!root.exists());
}

#[test]
fn first_write_creates_one_file_per_partition() {
    let out = TempDir::new().unwrap();
    let writer = PartitionedWriter::new(out.path());

    let written = writer
        .write(&table(vec![
            row("2025-08-01T00:00:00Z", "pm25", 12.3),
            row("2025-08-01T12:00:00Z", "pm25", 14.1),
            row("2025-08-02T00:00:00Z", "pm25", 9.8),
            row("2025-08-03T00:00:00Z", "pm25", 7.2),
        ]))
        .unwrap();

    assert_eq!(written.len(), 3);
    for date in ["2025-08-01", "2025-08-02", "2025-08-03"] {
        let dir = out.path().join(format!("event_date={date}"));
        let files = partition_files(&dir);
        assert_eq!(files.len(), 1, "expected one file in {date}");
        assert!(files[0].starts_with("part-"));
        assert!(files[0].ends_with(".parquet"));
        // part-<12 hex chars>.parquet
        let signature = files[0]
            .strip_prefix("part-")
            .unwrap()
            .strip_suffix(".parquet")
            .unwrap();
        assert_eq!(signature.len(), 12);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn rewriting_identical_content_is_a_no_op() {
    let out = TempDir::new().unwrap();
    let writer = PartitionedWriter::new(out.path());

    let rows = vec![
        row("2025-08-01T00:00:00Z", "pm25", 12.3),
        row("2025-08-01T06:00:00Z", "pm10", 30.0),
    ];

    let first = writer.write(&table(rows.clone())).unwrap();
    assert_eq!(first.len(), 1);

    // Same content, different input order, fresh writer (new run).
    let mut shuffled = rows;
    shuffled.reverse();
    let second = PartitionedWriter::new(out.path())
        .write(&table(shuffled))
        .unwrap();

    assert!(second.is_empty());
    let dir = out.path().join("event_date=2025-08-01");
    assert_eq!(partition_files(&dir).len(), 1);
}

#[test]
fn changed_content_gets_its_own_file() {
    let out = TempDir::new().unwrap();
    let writer = PartitionedWriter::new(out.path());

    writer
        .write(&table(vec![row("2025-08-01T00:00:00Z", "pm25", 12.3)]))
        .unwrap();
    let second = writer
        .write(&table(vec![row("2025-08-01T00:00:00Z", "pm25", 99.9)]))
        .unwrap();

    assert_eq!(second.len(), 1);
    let dir = out.path().join("event_date=2025-08-01");
    assert_eq!(partition_files(&dir).len(), 2);
}

#[test]
fn two_same_day_measurements_share_one_file() {
    let out = TempDir::new().unwrap();
    let writer = PartitionedWriter::new(out.path());

    let table = table(vec![
        row("2025-08-01T00:00:00Z", "pm25", 12.3),
        row("2025-08-01T12:00:00Z", "pm25", 14.1),
    ]);
    assert_eq!(table.len(), 2);
    assert!(table.rows().iter().all(|r| r.event_date == "2025-08-01"));

    let written = writer.write(&table).unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(
        written[0].parent().unwrap().file_name().unwrap(),
        "event_date=2025-08-01"
    );
}

#[test]
fn no_temp_files_remain_after_a_successful_run() {
    let out = TempDir::new().unwrap();
    let writer = PartitionedWriter::new(out.path());

    writer
        .write(&table(vec![
            row("2025-08-01T00:00:00Z", "pm25", 12.3),
            row("2025-08-02T00:00:00Z", "pm25", 9.8),
        ]))
        .unwrap();

    for date in ["2025-08-01", "2025-08-02"] {
        let dir = out.path().join(format!("event_date={date}"));
        assert!(partition_files(&dir)
            .iter()
            .all(|name| !name.starts_with(".tmp-")));
    }
}

#[test]
fn written_files_are_readable_parquet() {
    let out = TempDir::new().unwrap();
    let writer = PartitionedWriter::new(out.path());

    let written = writer
        .write(&table(vec![row("2025-08-01T00:00:00Z", "pm25", 12.3)]))
        .unwrap();

    let bytes = fs::read(&written[0]).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[0..4], b"PAR1");
}

#[test]
fn signature_reflects_normalized_timestamps() {
    // Identical instants written with different offsets normalize to the
    // same UTC content and must land in (and skip on) the same file.
    let out = TempDir::new().unwrap();

    let utc = row("2025-08-01T12:00:00Z", "pm25", 1.0);
    let offset = row("2025-08-01T09:00:00-03:00", "pm25", 1.0);
    assert_eq!(
        normalize(vec![utc.clone()], 359).rows()[0].date_utc,
        DateTime::parse_from_rfc3339("2025-08-01T12:00:00Z").unwrap()
    );

    let first = PartitionedWriter::new(out.path())
        .write(&table(vec![utc]))
        .unwrap();
    let second = PartitionedWriter::new(out.path())
        .write(&table(vec![offset]))
        .unwrap();

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}
