//! Dataset loading pipeline.
//!
//! Reads the archive, classifies every row and returns a [`Dataset`] ready
//! for queries. The dataset is immutable once built.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use glucose_core::classifier::ClassificationStats;
use glucose_core::error::Result;
use tracing::info;

use crate::reader::load_archive;
use crate::store::ObservationStore;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the loaded store.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoadMetadata {
    /// Archive the dataset was read from.
    pub archive: PathBuf,
    /// Name of the CSV entry inside the archive.
    pub entry: String,
    /// ISO-8601 timestamp when the load finished.
    pub generated_at: String,
    /// Row and reading counters from classification.
    pub stats: ClassificationStats,
    /// Wall-clock seconds spent reading and classifying.
    pub load_time_seconds: f64,
}

/// The loaded observation store plus how it was produced.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub store: ObservationStore,
    pub metadata: LoadMetadata,
}

impl Dataset {
    /// Wrap an already-built store, e.g. for tests or in-memory sources.
    pub fn from_store(store: ObservationStore, stats: ClassificationStats) -> Self {
        Self {
            store,
            metadata: LoadMetadata {
                archive: PathBuf::new(),
                entry: String::new(),
                generated_at: Utc::now().to_rfc3339(),
                stats,
                load_time_seconds: 0.0,
            },
        }
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Load `entry` from `archive` into a fresh [`Dataset`].
///
/// Any failure aborts the load; no partial dataset is returned.
pub fn load_dataset(archive: &Path, entry: &str) -> Result<Dataset> {
    let start = Instant::now();
    let (store, stats) = load_archive(archive, entry)?;
    let load_time_seconds = start.elapsed().as_secs_f64();

    info!(
        "Loaded {} observations from {} rows in {:.2}s",
        store.len(),
        stats.rows_seen,
        load_time_seconds
    );

    Ok(Dataset {
        store,
        metadata: LoadMetadata {
            archive: archive.to_path_buf(),
            entry: entry.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            stats,
            load_time_seconds,
        },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::GlucoseAggregator;
    use crate::prepare::write_archive;
    use glucose_core::error::DashboardError;
    use glucose_core::models::{HealthGroup, NutrientFocus};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    const CSV: &str = "Carbs,Protein,Fat,A1c PDL (Lab),#1 Contour Fingerstick GLU,Time (t), #2 Contour Fingerstick GLU,Time (t).1,#3 Contour Fingerstick GLU,Time (t).2,Dexcom GL,Libre GL\n\
        50,10,5,7.0,120,0:00,,,,,110,\n\
        10,40,5,5.8,,,130,15:00,,,,95\n\
        x,1,1,5.0,,,,,,,100,\n";

    fn archive(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("merged_data.csv.zip");
        write_archive(&path, "merged_data.csv", CSV.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_dataset_metadata() {
        let dir = TempDir::new().unwrap();
        let path = archive(&dir);

        let dataset = load_dataset(&path, "merged_data.csv").unwrap();
        assert_eq!(dataset.store.len(), 4);
        assert_eq!(dataset.metadata.archive, path);
        assert_eq!(dataset.metadata.entry, "merged_data.csv");
        assert_eq!(dataset.metadata.stats.rows_seen, 3);
        assert_eq!(dataset.metadata.stats.rows_rejected, 1);
        assert!(chrono::DateTime::parse_from_rfc3339(&dataset.metadata.generated_at).is_ok());
    }

    #[test]
    fn test_load_dataset_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = archive(&dir);

        let first = load_dataset(&path, "merged_data.csv").unwrap();
        let second = load_dataset(&path, "merged_data.csv").unwrap();
        assert_eq!(first.store, second.store);

        let groups: BTreeSet<HealthGroup> = HealthGroup::ALL.into_iter().collect();
        for focus in NutrientFocus::ALL {
            assert_eq!(
                GlucoseAggregator::time_series(&first.store, focus, &groups),
                GlucoseAggregator::time_series(&second.store, focus, &groups),
            );
            assert_eq!(
                GlucoseAggregator::composition(&first.store, focus, &groups),
                GlucoseAggregator::composition(&second.store, focus, &groups),
            );
        }

        let carb_series =
            GlucoseAggregator::time_series(&first.store, NutrientFocus::HighCarb, &groups);
        let type2 = carb_series
            .iter()
            .find(|s| s.group == HealthGroup::Type2Diabetic)
            .unwrap();
        assert_eq!(type2.points.len(), 1);
        assert_eq!(type2.points[0].time, 0.0);
        assert_eq!(type2.points[0].mean, 115.0);
        assert!(
            GlucoseAggregator::composition(&first.store, NutrientFocus::HighFat, &groups).is_none()
        );
    }

    #[test]
    fn test_load_dataset_propagates_failure() {
        let dir = TempDir::new().unwrap();
        let err = load_dataset(&dir.path().join("missing.zip"), "merged_data.csv").unwrap_err();
        assert!(matches!(err, DashboardError::ArchiveRead { .. }));
    }
}
