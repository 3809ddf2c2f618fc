// zephyrlake-writer - Date-partitioned idempotent Parquet writing
//
// One file per (event_date, content signature): a partition whose signature
// already exists on disk is skipped, never overwritten or appended to.
// Files become visible only through an atomic rename of a temp file written
// in the same directory, so an interrupted run leaves at most a temp file
// behind and never a half-written final file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use zephyrlake_core::normalize::{NormalizedRow, NormalizedTable};
use zephyrlake_core::parquet::write_rows_into;
use zephyrlake_core::partition_signature;

pub mod error;

pub use error::{Result, WriteError};

/// Writes normalized tables under `output_root` as
/// `event_date=<YYYY-MM-DD>/part-<signature>.parquet`.
pub struct PartitionedWriter {
    output_root: PathBuf,
    // Temp names carry a per-writer token so concurrent runs hitting the
    // same partition cannot race on the temp path.
    run_token: String,
}

impl PartitionedWriter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            run_token: Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Write one Parquet file per event_date group, skipping groups whose
    /// signature already exists. Returns the destination paths created by
    /// this call; pre-existing skips are excluded.
    ///
    /// An empty table is a no-op and makes no filesystem change.
    pub fn write(&self, table: &NormalizedTable) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        if table.is_empty() {
            return Ok(written);
        }

        for (event_date, rows) in table.partitions() {
            let part_dir = self.output_root.join(format!("event_date={event_date}"));
            fs::create_dir_all(&part_dir)
                .map_err(|e| WriteError::io("creating partition directory", &part_dir, e))?;

            let signature = partition_signature(event_date, &rows);
            let dest = part_dir.join(format!("part-{signature}.parquet"));

            // Same signature on disk means identical content was already
            // persisted by an earlier run.
            if dest.exists() {
                debug!(path = %dest.display(), "partition already persisted, skipping");
                continue;
            }

            self.write_atomic(event_date, &rows, &dest, &signature)?;
            info!(path = %dest.display(), rows = rows.len(), "wrote partition file");
            written.push(dest);
        }

        Ok(written)
    }

    /// Serialize into `.tmp-<signature>-<token>.parquet` next to the
    /// destination, then rename into place.
    fn write_atomic(
        &self,
        event_date: &str,
        rows: &[&NormalizedRow],
        dest: &Path,
        signature: &str,
    ) -> Result<()> {
        let tmp = dest.with_file_name(format!(".tmp-{signature}-{}.parquet", self.run_token));

        let mut file =
            fs::File::create(&tmp).map_err(|e| WriteError::io("creating temp file", &tmp, e))?;

        if let Err(source) = write_rows_into(rows, &mut file) {
            drop(file);
            let _ = fs::remove_file(&tmp);
            return Err(WriteError::Encode {
                event_date: event_date.to_string(),
                source,
            });
        }

        fs::rename(&tmp, dest).map_err(|e| WriteError::io("renaming temp file", &tmp, e))
    }
}
