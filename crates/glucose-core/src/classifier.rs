//! Row classification: one raw dataset row into zero or more observations.
//!
//! Malformed data never raises an error here. A row whose macro columns do
//! not parse is rejected whole; a sensor or device reading that does not
//! parse is dropped on its own while its siblings are still emitted.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{HealthGroup, NutrientFocus, Observation};

// ── Column names ──────────────────────────────────────────────────────────────

pub const CARBS_COLUMN: &str = "Carbs";
pub const PROTEIN_COLUMN: &str = "Protein";
pub const FAT_COLUMN: &str = "Fat";
pub const A1C_COLUMN: &str = "A1c PDL (Lab)";

/// Glucose/timestamp column pair of one fingerstick sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerstickColumns {
    pub glucose: &'static str,
    pub time: &'static str,
}

/// The three fingerstick sensors. The leading space on the second glucose
/// column is part of the dataset's header.
pub const FINGERSTICK_COLUMNS: [FingerstickColumns; 3] = [
    FingerstickColumns {
        glucose: "#1 Contour Fingerstick GLU",
        time: "Time (t)",
    },
    FingerstickColumns {
        glucose: " #2 Contour Fingerstick GLU",
        time: "Time (t).1",
    },
    FingerstickColumns {
        glucose: "#3 Contour Fingerstick GLU",
        time: "Time (t).2",
    },
];

/// Continuous glucose monitor columns, read as instantaneous (`time = 0`).
pub const DEVICE_COLUMNS: [&str; 2] = ["Dexcom GL", "Libre GL"];

/// Every column a dataset header must carry.
pub fn required_columns() -> Vec<&'static str> {
    let mut columns = vec![CARBS_COLUMN, PROTEIN_COLUMN, FAT_COLUMN, A1C_COLUMN];
    for pair in FINGERSTICK_COLUMNS {
        columns.push(pair.glucose);
        columns.push(pair.time);
    }
    columns.extend(DEVICE_COLUMNS);
    columns
}

/// HbA1c threshold at and above which a subject is type-2 diabetic.
pub const TYPE2_A1C_THRESHOLD: f64 = 6.5;
/// HbA1c threshold at and above which a subject is pre-diabetic.
pub const PREDIABETIC_A1C_THRESHOLD: f64 = 5.7;

// ── RawRow ────────────────────────────────────────────────────────────────────

/// Raw text of one fingerstick sensor's cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerstickCells {
    pub glucose: Option<String>,
    pub time: Option<String>,
}

/// Typed view of one dataset row, holding only the columns the classifier
/// reads. Empty cells are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub carbs: Option<String>,
    pub protein: Option<String>,
    pub fat: Option<String>,
    pub a1c: Option<String>,
    pub fingersticks: [FingerstickCells; 3],
    pub devices: [Option<String>; 2],
}

impl RawRow {
    /// Build a row by looking up each known column through `lookup`.
    pub fn from_lookup<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let cell = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            carbs: cell(CARBS_COLUMN),
            protein: cell(PROTEIN_COLUMN),
            fat: cell(FAT_COLUMN),
            a1c: cell(A1C_COLUMN),
            fingersticks: FINGERSTICK_COLUMNS.map(|pair| FingerstickCells {
                glucose: cell(pair.glucose),
                time: cell(pair.time),
            }),
            devices: DEVICE_COLUMNS.map(cell),
        }
    }
}

// ── ClassificationStats ───────────────────────────────────────────────────────

/// Counters describing how much of the input survived classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    /// Rows handed to the classifier.
    pub rows_seen: usize,
    /// Rows rejected because a macro column did not parse.
    pub rows_rejected: usize,
    /// Observations emitted.
    pub observations: usize,
    /// Non-empty sensor or device cells that produced no observation.
    pub readings_skipped: usize,
}

// ── RowClassifier ─────────────────────────────────────────────────────────────

/// Stateless classifier turning [`RawRow`]s into [`Observation`]s.
pub struct RowClassifier;

impl RowClassifier {
    /// Classify a single row.
    pub fn classify(row: &RawRow) -> Vec<Observation> {
        let mut out = Vec::new();
        Self::classify_into(row, &mut out, &mut ClassificationStats::default());
        out
    }

    /// Classify `row`, appending observations to `out` and updating `stats`.
    ///
    /// Emission order is fingerstick #1, #2, #3, then Dexcom, then Libre.
    pub fn classify_into(
        row: &RawRow,
        out: &mut Vec<Observation>,
        stats: &mut ClassificationStats,
    ) {
        stats.rows_seen += 1;

        let macros = (
            row.carbs.as_deref().and_then(parse_number),
            row.protein.as_deref().and_then(parse_number),
            row.fat.as_deref().and_then(parse_number),
        );
        let (Some(carbs), Some(protein), Some(fat)) = macros else {
            stats.rows_rejected += 1;
            return;
        };

        let nutrient_focus = Self::nutrient_focus(carbs, protein, fat);
        let health_group = Self::health_group(row.a1c.as_deref().and_then(parse_number));

        let observation = |time: f64, glucose: f64| Observation {
            nutrient_focus,
            health_group,
            time,
            glucose,
            carbs,
            protein,
            fat,
        };

        for cells in &row.fingersticks {
            let (Some(glucose_raw), Some(time_raw)) = (&cells.glucose, &cells.time) else {
                if cells.glucose.is_some() || cells.time.is_some() {
                    stats.readings_skipped += 1;
                }
                continue;
            };
            match (parse_number(glucose_raw), parse_minutes_seconds(time_raw)) {
                (Some(glucose), Some(time)) => {
                    out.push(observation(time, glucose));
                    stats.observations += 1;
                }
                _ => stats.readings_skipped += 1,
            }
        }

        for cell in row.devices.iter().flatten() {
            match parse_number(cell) {
                Some(glucose) => {
                    out.push(observation(0.0, glucose));
                    stats.observations += 1;
                }
                None => stats.readings_skipped += 1,
            }
        }
    }

    /// Dominant macronutrient. Protein wins a tie with fat; every other tie
    /// falls back to [`NutrientFocus::HighCarb`].
    pub fn nutrient_focus(carbs: f64, protein: f64, fat: f64) -> NutrientFocus {
        if protein > carbs && protein >= fat {
            NutrientFocus::HighProtein
        } else if fat > carbs && fat > protein {
            NutrientFocus::HighFat
        } else {
            NutrientFocus::HighCarb
        }
    }

    /// Health group from the lab HbA1c value; a missing value is `Healthy`.
    pub fn health_group(a1c: Option<f64>) -> HealthGroup {
        match a1c {
            Some(v) if v >= TYPE2_A1C_THRESHOLD => HealthGroup::Type2Diabetic,
            Some(v) if v >= PREDIABETIC_A1C_THRESHOLD => HealthGroup::PreDiabetic,
            _ => HealthGroup::Healthy,
        }
    }
}

// ── Lenient number parsing ────────────────────────────────────────────────────

fn float_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("regex is valid")
    })
}

fn integer_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("regex is valid"))
}

/// Parse the leading decimal number of `raw`, ignoring leading whitespace
/// and any trailing text (`"12.5 g"` → `12.5`).
///
/// Returns `None` when no digits lead the string or the value is not finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    let m = float_prefix().find(raw.trim_start())?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the leading integer of `raw` (`"05"` → `5`, `"3.7"` → `3`).
pub fn parse_integer(raw: &str) -> Option<i64> {
    let m = integer_prefix().find(raw.trim_start())?;
    m.as_str().parse::<i64>().ok()
}

/// Parse a `"minutes:seconds"` timestamp into fractional minutes.
///
/// Exactly two components are required. A negative result such as `"-5:30"`
/// or `"0:-30"` is rejected rather than plotted, so every observation keeps
/// `time >= 0` even though some exports carry pre-meal offsets.
pub fn parse_minutes_seconds(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    let [minutes, seconds] = parts.as_slice() else {
        return None;
    };
    let minutes = parse_integer(minutes)? as f64;
    let seconds = parse_integer(seconds)? as f64;
    let time = minutes + seconds / 60.0;
    (time >= 0.0).then_some(time)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
