use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// Energy per gram of carbohydrate (Atwater factor).
pub const CARB_KCAL_PER_GRAM: f64 = 4.0;
/// Energy per gram of protein (Atwater factor).
pub const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
/// Energy per gram of fat (Atwater factor).
pub const FAT_KCAL_PER_GRAM: f64 = 9.0;

/// Which macronutrient dominates a meal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum NutrientFocus {
    /// Carbohydrate-dominant, also the fallback for ties.
    #[default]
    HighCarb,
    /// Protein-dominant.
    HighProtein,
    /// Fat-dominant.
    HighFat,
}

impl NutrientFocus {
    /// Every focus, in selector order.
    pub const ALL: [NutrientFocus; 3] = [
        NutrientFocus::HighCarb,
        NutrientFocus::HighProtein,
        NutrientFocus::HighFat,
    ];

    /// Display label, e.g. `"High-Carb"`.
    pub fn label(self) -> &'static str {
        match self {
            NutrientFocus::HighCarb => "High-Carb",
            NutrientFocus::HighProtein => "High-Protein",
            NutrientFocus::HighFat => "High-Fat",
        }
    }

    /// Lower-case CLI spelling, e.g. `"high-carb"`.
    pub fn slug(self) -> &'static str {
        match self {
            NutrientFocus::HighCarb => "high-carb",
            NutrientFocus::HighProtein => "high-protein",
            NutrientFocus::HighFat => "high-fat",
        }
    }
}

impl fmt::Display for NutrientFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NutrientFocus {
    type Err = DashboardError;

    /// Accepts either the slug or the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        NutrientFocus::ALL
            .into_iter()
            .find(|f| f.slug() == needle || f.label().to_lowercase() == needle)
            .ok_or_else(|| DashboardError::InvalidFocus(s.to_string()))
    }
}

/// Glycemic status of the subject a meal belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum HealthGroup {
    /// Lab value below 5.7, or missing.
    #[default]
    Healthy,
    /// Lab value in `[5.7, 6.5)`.
    PreDiabetic,
    /// Lab value of 6.5 or more.
    Type2Diabetic,
}

impl HealthGroup {
    /// Every group, in legend order.
    pub const ALL: [HealthGroup; 3] = [
        HealthGroup::Healthy,
        HealthGroup::PreDiabetic,
        HealthGroup::Type2Diabetic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HealthGroup::Healthy => "Healthy",
            HealthGroup::PreDiabetic => "Pre-diabetic",
            HealthGroup::Type2Diabetic => "Type 2 Diabetic",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            HealthGroup::Healthy => "healthy",
            HealthGroup::PreDiabetic => "pre-diabetic",
            HealthGroup::Type2Diabetic => "type2-diabetic",
        }
    }
}

impl fmt::Display for HealthGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HealthGroup {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        HealthGroup::ALL
            .into_iter()
            .find(|g| g.slug() == needle || g.label().to_lowercase() == needle)
            .ok_or_else(|| DashboardError::InvalidHealthGroup(s.to_string()))
    }
}

/// Parse a comma-separated list of health groups, e.g. `"healthy,pre-diabetic"`.
///
/// Blank items are ignored; the result may be empty.
pub fn parse_health_groups(list: &str) -> Result<BTreeSet<HealthGroup>, DashboardError> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(HealthGroup::from_str)
        .collect()
}

/// One time-stamped glucose reading tagged with its meal's classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Dominant macronutrient of the meal row.
    pub nutrient_focus: NutrientFocus,
    /// Health group of the subject.
    pub health_group: HealthGroup,
    /// Minutes after the meal; `0` for device readings.
    pub time: f64,
    /// Glucose concentration as recorded.
    pub glucose: f64,
    /// Carbohydrate mass of the meal in grams.
    pub carbs: f64,
    /// Protein mass of the meal in grams.
    pub protein: f64,
    /// Fat mass of the meal in grams.
    pub fat: f64,
}

/// Mean glucose for one exact time value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    pub time: f64,
    pub mean: f64,
}

/// Ordered point sequence for one health group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub group: HealthGroup,
    /// Points sorted ascending by `time`.
    pub points: Vec<AggregatedPoint>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Mean macronutrient composition of the meals matching a filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionSummary {
    pub mean_carbs: f64,
    pub mean_protein: f64,
    pub mean_fat: f64,
    /// Atwater estimate derived from the three means.
    pub mean_calories: f64,
}

impl CompositionSummary {
    /// Build a summary from macro means, deriving the calorie estimate.
    pub fn from_means(mean_carbs: f64, mean_protein: f64, mean_fat: f64) -> Self {
        Self {
            mean_carbs,
            mean_protein,
            mean_fat,
            mean_calories: mean_carbs * CARB_KCAL_PER_GRAM
                + mean_protein * PROTEIN_KCAL_PER_GRAM
                + mean_fat * FAT_KCAL_PER_GRAM,
        }
    }

    /// `(label, grams)` pairs in fixed Carbs, Protein, Fat order.
    pub fn parts(&self) -> [(&'static str, f64); 3] {
        [
            ("Carbs", self.mean_carbs),
            ("Protein", self.mean_protein),
            ("Fat", self.mean_fat),
        ]
    }

    /// Total macro mass in grams.
    pub fn total_grams(&self) -> f64 {
        self.mean_carbs + self.mean_protein + self.mean_fat
    }
}

/// Axis extents covering every point of a set of series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartDomain {
    /// `(min, max)` time in minutes.
    pub x: (f64, f64),
    /// `(min, max)` mean glucose.
    pub y: (f64, f64),
}
