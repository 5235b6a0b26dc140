//! Archive extraction and CSV parsing for the meal dataset.
//!
//! The dataset ships as a zip archive holding one CSV entry. The header is
//! resolved against the classifier's columns once; every data record is then
//! turned into a typed [`RawRow`] and classified into the store.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use glucose_core::classifier::{required_columns, ClassificationStats, RawRow, RowClassifier};
use glucose_core::error::{DashboardError, Result};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::store::ObservationStore;

// ── ColumnIndex ───────────────────────────────────────────────────────────────

/// Header positions of every column the classifier reads.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    /// Resolve required columns in `headers` by exact name.
    ///
    /// Fails with [`DashboardError::MissingColumn`] naming the first absent
    /// column. When a name repeats, the last occurrence wins.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions = HashMap::new();
        for column in required_columns() {
            let position = headers
                .iter()
                .enumerate()
                .filter(|(_, h)| *h == column)
                .map(|(i, _)| i)
                .last()
                .ok_or_else(|| DashboardError::MissingColumn(column.to_string()))?;
            positions.insert(column, position);
        }
        Ok(Self { positions })
    }

    /// Build the typed row for `record`. Cells past the end of a short
    /// record read as absent.
    pub fn row(&self, record: &StringRecord) -> RawRow {
        RawRow::from_lookup(|name| self.positions.get(name).and_then(|&i| record.get(i)))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Open `archive_path`, locate `entry` and classify every row into a fresh
/// [`ObservationStore`].
pub fn load_archive(
    archive_path: &Path,
    entry: &str,
) -> Result<(ObservationStore, ClassificationStats)> {
    let file = File::open(archive_path).map_err(|source| DashboardError::ArchiveRead {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file)?;

    let csv_entry = match archive.by_name(entry) {
        Ok(e) => e,
        Err(ZipError::FileNotFound) => {
            return Err(DashboardError::EntryNotFound {
                archive: archive_path.to_path_buf(),
                entry: entry.to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    debug!(
        "Reading {} ({} bytes uncompressed) from {}",
        entry,
        csv_entry.size(),
        archive_path.display()
    );

    let mut store = ObservationStore::new();
    let stats = read_observations(csv_entry, &mut store)?;
    Ok((store, stats))
}

/// Classify every record of a CSV stream into `store`.
///
/// Records the CSV layer cannot decode (e.g. invalid UTF-8) count as
/// rejected rows; an I/O failure of the underlying stream is fatal.
pub fn read_observations<R: Read>(
    reader: R,
    store: &mut ObservationStore,
) -> Result<ClassificationStats> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let index = ColumnIndex::from_headers(&headers)?;

    let mut stats = ClassificationStats::default();
    let mut observations = Vec::new();

    for (line, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!("Skipping undecodable record {}: {}", line + 1, e);
                stats.rows_seen += 1;
                stats.rows_rejected += 1;
                continue;
            }
        };
        RowClassifier::classify_into(&index.row(&record), &mut observations, &mut stats);
    }

    store.append(observations);

    debug!(
        "{} rows read, {} rejected, {} observations, {} readings skipped",
        stats.rows_seen, stats.rows_rejected, stats.observations, stats.readings_skipped,
    );

    Ok(stats)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
