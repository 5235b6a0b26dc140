use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the meal-glucose crates.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The dataset archive could not be opened or read from disk.
    #[error("Failed to read archive {path}: {source}")]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive opened but does not contain the expected CSV entry.
    #[error("{entry} not found in archive {archive}")]
    EntryNotFound { archive: PathBuf, entry: String },

    /// The archive is corrupt or uses an unsupported compression method.
    #[error("Failed to decompress archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The CSV stream could not be tokenised.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A source table for dataset preparation could not be read.
    #[error("Failed to read {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The CSV header lacks a column the classifier depends on.
    #[error("Missing required column: {0:?}")]
    MissingColumn(String),

    /// A health-group selection must always contain at least one group.
    #[error("Health-group selection cannot be empty")]
    EmptySelection,

    /// A nutrient-focus name did not match any known focus.
    #[error("Invalid nutrient focus: {0}")]
    InvalidFocus(String),

    /// A health-group name did not match any known group.
    #[error("Invalid health group: {0}")]
    InvalidHealthGroup(String),

    /// A JSON document could not be produced or parsed.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the meal-glucose crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_archive_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::ArchiveRead {
            path: PathBuf::from("/data/merged_data.csv.zip"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read archive"));
        assert!(msg.contains("/data/merged_data.csv.zip"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_entry_not_found() {
        let err = DashboardError::EntryNotFound {
            archive: PathBuf::from("data.zip"),
            entry: "merged_data.csv".to_string(),
        };
        assert_eq!(err.to_string(), "merged_data.csv not found in archive data.zip");
    }

    #[test]
    fn test_error_display_missing_column_keeps_whitespace() {
        let err = DashboardError::MissingColumn(" #2 Contour Fingerstick GLU".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required column: \" #2 Contour Fingerstick GLU\""
        );
    }

    #[test]
    fn test_error_display_empty_selection() {
        let err = DashboardError::EmptySelection;
        assert_eq!(err.to_string(), "Health-group selection cannot be empty");
    }

    #[test]
    fn test_error_display_invalid_focus() {
        let err = DashboardError::InvalidFocus("high-sugar".to_string());
        assert_eq!(err.to_string(), "Invalid nutrient focus: high-sugar");
    }

    #[test]
    fn test_error_display_config() {
        let err = DashboardError::Config("no archive".to_string());
        assert_eq!(err.to_string(), "Configuration error: no archive");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashboardError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_zip() {
        let err: DashboardError = zip::result::ZipError::FileNotFound.into();
        assert!(err.to_string().starts_with("Failed to decompress archive"));
    }
}
