//! Builds the merged meal dataset from raw participant exports.
//!
//! Source layout: one `bio.csv` with a `ParticipantID` column plus one
//! `CGMacros-<id>.csv` per participant. Meal rows from every participant are
//! stacked, tagged with their participant id and joined with the bio table.
//! The result is written as `merged_data.csv` and as a zip archive holding it.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use glucose_core::error::{DashboardError, Result};
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Participant metadata table.
pub const BIO_FILE: &str = "bio.csv";
/// Join key shared by the bio table and the merged output.
pub const PARTICIPANT_COLUMN: &str = "ParticipantID";
/// A row is a meal when any of these cells holds a value.
pub const MEAL_COLUMNS: [&str; 5] = ["Calories", "Carbs", "Protein", "Fat", "Fiber"];

/// Cell spellings treated as missing values and written back as empty.
const NULL_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn participant_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^CGMacros-(.*)\.csv$").expect("regex is valid"))
}

// ── Public types ──────────────────────────────────────────────────────────────

/// A participant export discovered in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantFile {
    pub path: PathBuf,
    pub participant_id: i64,
}

/// Summary of a [`prepare_dataset`] run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PrepareOutcome {
    pub csv_path: PathBuf,
    pub archive_path: PathBuf,
    /// Participant files that contributed rows.
    pub participants: usize,
    /// Meal rows written, after the bio join.
    pub rows: usize,
    /// Files matching the naming pattern whose suffix is not an integer.
    pub skipped_files: Vec<PathBuf>,
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// A CSV table with unique column names and null-normalised cells.
#[derive(Debug, Clone, Default, PartialEq)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn read(path: &Path) -> Result<Self> {
        let source_err = |source| DashboardError::SourceRead {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(source_err)?;

        let columns = dedupe_columns(reader.headers().map_err(source_err)?.iter());
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(source_err)?;
            let mut row: Vec<String> = record.iter().map(normalise_cell).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    fn require(&self, column: &str) -> Result<usize> {
        self.position(column)
            .ok_or_else(|| DashboardError::MissingColumn(column.to_string()))
    }
}

/// Rename repeated header names to `name.1`, `name.2`, ... in order.
fn dedupe_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::new();

    for header in headers {
        let mut name = header.to_string();
        if seen.contains(&name) {
            let count = counts.entry(header.to_string()).or_insert(0);
            loop {
                *count += 1;
                let candidate = format!("{}.{}", header, count);
                if !seen.contains(&candidate) {
                    name = candidate;
                    break;
                }
            }
        }
        seen.insert(name.clone());
        columns.push(name);
    }
    columns
}

fn normalise_cell(cell: &str) -> String {
    if NULL_VALUES.contains(&cell) {
        String::new()
    } else {
        cell.to_string()
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// List `CGMacros-*.csv` files directly inside `dir`, sorted by path.
///
/// Returns the usable files and the paths skipped because their suffix is
/// not an integer.
pub fn find_participant_files(dir: &Path) -> Result<(Vec<ParticipantFile>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut skipped = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| DashboardError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(captures) = participant_file_regex().captures(name) else {
            continue;
        };

        match captures[1].parse::<i64>() {
            Ok(participant_id) => files.push(ParticipantFile {
                path: entry.path().to_path_buf(),
                participant_id,
            }),
            Err(_) => {
                warn!("Skipping {}: participant id is not an integer", entry.path().display());
                skipped.push(entry.path().to_path_buf());
            }
        }
    }

    Ok((files, skipped))
}

// ── Merge steps ───────────────────────────────────────────────────────────────

/// Keep meal rows of `table` and append the participant id column.
fn meal_rows(mut table: Table, participant_id: i64) -> Result<Table> {
    let meal_positions = MEAL_COLUMNS
        .iter()
        .map(|c| table.require(c))
        .collect::<Result<Vec<usize>>>()?;

    table
        .rows
        .retain(|row| meal_positions.iter().any(|&i| !row[i].is_empty()));

    let id = participant_id.to_string();
    match table.position(PARTICIPANT_COLUMN) {
        Some(i) => table.rows.iter_mut().for_each(|row| row[i] = id.clone()),
        None => {
            table.columns.push(PARTICIPANT_COLUMN.to_string());
            table.rows.iter_mut().for_each(|row| row.push(id.clone()));
        }
    }
    Ok(table)
}

/// Stack tables, taking the union of their columns in first-seen order.
fn concat(tables: Vec<Table>) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for table in &tables {
        for column in &table.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for table in tables {
        let mapping: Vec<Option<usize>> = columns.iter().map(|c| table.position(c)).collect();
        for row in table.rows {
            rows.push(
                mapping
                    .iter()
                    .map(|pos| pos.map(|i| row[i].clone()).unwrap_or_default())
                    .collect(),
            );
        }
    }

    Table { columns, rows }
}

/// Left-join `bio` onto `meals` by participant id.
///
/// Columns present on both sides (other than the key) get `_x` / `_y`
/// suffixes. A participant with several bio rows repeats the meal row once
/// per bio row; one without any bio row gets empty bio cells.
fn left_join_bio(meals: Table, bio: &Table) -> Result<Table> {
    let meal_key = meals.require(PARTICIPANT_COLUMN)?;
    let bio_key = bio.require(PARTICIPANT_COLUMN)?;

    let mut bio_rows: HashMap<i64, Vec<usize>> = HashMap::new();
    for (index, row) in bio.rows.iter().enumerate() {
        let id = parse_participant_id(&row[bio_key])?;
        bio_rows.entry(id).or_default().push(index);
    }

    let bio_columns: Vec<usize> = (0..bio.columns.len()).filter(|&i| i != bio_key).collect();
    let shared: HashSet<&str> = bio_columns
        .iter()
        .map(|&i| bio.columns[i].as_str())
        .filter(|c| meals.columns.iter().any(|m| m == c))
        .collect();

    let mut columns: Vec<String> = meals
        .columns
        .iter()
        .map(|c| suffixed(c, &shared, "_x"))
        .collect();
    columns.extend(bio_columns.iter().map(|&i| suffixed(&bio.columns[i], &shared, "_y")));

    let mut rows = Vec::new();
    for meal in meals.rows {
        let matches = parse_participant_id(&meal[meal_key])
            .ok()
            .and_then(|id| bio_rows.get(&id));
        match matches {
            Some(indices) => {
                for &b in indices {
                    let mut row = meal.clone();
                    row.extend(bio_columns.iter().map(|&i| bio.rows[b][i].clone()));
                    rows.push(row);
                }
            }
            None => {
                let mut row = meal;
                row.resize(columns.len(), String::new());
                rows.push(row);
            }
        }
    }

    Ok(Table { columns, rows })
}

fn suffixed(column: &str, shared: &HashSet<&str>, suffix: &str) -> String {
    if shared.contains(column) {
        format!("{}{}", column, suffix)
    } else {
        column.to_string()
    }
}

fn parse_participant_id(cell: &str) -> Result<i64> {
    let trimmed = cell.trim();
    trimmed
        .parse::<i64>()
        .or_else(|_| {
            // Ids written as floats, e.g. "3.0".
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
                .ok_or(())
        })
        .map_err(|_| DashboardError::Config(format!("Invalid {}: {:?}", PARTICIPANT_COLUMN, cell)))
}

// ── Output ────────────────────────────────────────────────────────────────────

fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| DashboardError::Io(e.into_error()))
}

/// Write a zip archive at `path` holding `bytes` as its single `entry`.
pub fn write_archive(path: &Path, entry: &str, bytes: &[u8]) -> Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry, options)?;
    zip.write_all(bytes)?;
    zip.finish()?;
    Ok(())
}

// ── Public function ───────────────────────────────────────────────────────────

/// Build the merged dataset from `source_dir` into `output_dir`.
///
/// Writes `<output_dir>/<entry>` and `<output_dir>/<entry>.zip`; the archive
/// is what the dashboard loads.
pub fn prepare_dataset(source_dir: &Path, output_dir: &Path, entry: &str) -> Result<PrepareOutcome> {
    let bio = Table::read(&source_dir.join(BIO_FILE))?;
    bio.require(PARTICIPANT_COLUMN)?;

    let (files, skipped_files) = find_participant_files(source_dir)?;
    if files.is_empty() {
        return Err(DashboardError::Config(format!(
            "No CGMacros-*.csv files found in {}",
            source_dir.display()
        )));
    }

    let mut tables = Vec::with_capacity(files.len());
    for file in &files {
        let table = meal_rows(Table::read(&file.path)?, file.participant_id)?;
        debug!(
            "{}: {} meal rows for participant {}",
            file.path.display(),
            table.rows.len(),
            file.participant_id
        );
        tables.push(table);
    }

    let merged = left_join_bio(concat(tables), &bio)?;
    let bytes = to_csv_bytes(&merged)?;

    fs::create_dir_all(output_dir)?;
    let csv_path = output_dir.join(entry);
    let archive_path = output_dir.join(format!("{}.zip", entry));
    fs::write(&csv_path, &bytes)?;
    write_archive(&archive_path, entry, &bytes)?;

    info!(
        "Wrote {} meal rows from {} participants to {}",
        merged.rows.len(),
        files.len(),
        archive_path.display()
    );

    Ok(PrepareOutcome {
        csv_path,
        archive_path,
        participants: files.len(),
        rows: merged.rows.len(),
        skipped_files,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
