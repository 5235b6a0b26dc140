//! Query results rendered for the non-interactive views.
//!
//! `summary` prints [`DashboardReport::to_text`], `json` prints
//! [`DashboardReport::to_json`]. Both are snapshots of one [`QuerySession`].

use std::collections::BTreeSet;
use std::fmt::Write as _;

use glucose_core::error::Result;
use glucose_core::formatting::{
    format_calories, format_glucose, format_grams, format_number, format_offset, percentage,
};
use glucose_core::models::{ChartDomain, CompositionSummary, HealthGroup, NutrientFocus, Series};
use glucose_data::analysis::LoadMetadata;
use serde::Serialize;

use crate::session::QuerySession;

/// Everything one filter selection produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub focus: NutrientFocus,
    pub groups: BTreeSet<HealthGroup>,
    pub series: Vec<Series>,
    pub composition: Option<CompositionSummary>,
    pub domain: Option<ChartDomain>,
    pub metadata: LoadMetadata,
}

impl DashboardReport {
    pub fn from_session(session: &QuerySession) -> Self {
        let series = session.time_series();
        let domain = glucose_data::domain::chart_domain(&series);
        Self {
            focus: session.focus(),
            groups: session.groups().clone(),
            series,
            composition: session.composition(),
            domain,
            metadata: session.dataset().metadata.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering for terminals without the TUI.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let groups: Vec<&str> = self.groups.iter().map(|g| g.label()).collect();

        let _ = writeln!(out, "Meal focus: {}", self.focus);
        let _ = writeln!(out, "Health groups: {}", groups.join(", "));
        let _ = writeln!(
            out,
            "Observations: {} from {} rows ({} rejected)",
            format_number(self.metadata.stats.observations as f64, 0),
            format_number(self.metadata.stats.rows_seen as f64, 0),
            format_number(self.metadata.stats.rows_rejected as f64, 0),
        );

        out.push_str("\nGlucose response\n");
        for series in &self.series {
            let _ = writeln!(out, "  {}", series.group);
            if series.is_empty() {
                out.push_str("    no readings\n");
                continue;
            }
            for point in &series.points {
                let _ = writeln!(
                    out,
                    "    {:>8}  {}",
                    format_offset(point.time),
                    format_glucose(point.mean)
                );
            }
        }

        out.push_str("\nMeal composition\n");
        match &self.composition {
            Some(summary) => {
                let total = summary.total_grams();
                for (label, grams) in summary.parts() {
                    let _ = writeln!(
                        out,
                        "  {:<8} {:>9}  {:>5.1}%",
                        label,
                        format_grams(grams),
                        percentage(grams, total, 1)
                    );
                }
                let _ = writeln!(out, "  Calories {:>9}", format_calories(summary.mean_calories));
            }
            None => out.push_str("  no data\n"),
        }

        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use glucose_core::classifier::ClassificationStats;
    use glucose_core::models::Observation;
    use glucose_data::analysis::Dataset;
    use glucose_data::store::ObservationStore;
    use std::sync::Arc;

    fn session(observations: Vec<Observation>) -> QuerySession {
        let store: ObservationStore = observations.into_iter().collect();
        QuerySession::new(Arc::new(Dataset::from_store(
            store,
            ClassificationStats::default(),
        )))
    }

    fn obs(time: f64, glucose: f64, carbs: f64) -> Observation {
        Observation {
            nutrient_focus: NutrientFocus::HighCarb,
            health_group: HealthGroup::Healthy,
            time,
            glucose,
            carbs,
            protein: 5.0,
            fat: 2.0,
        }
    }

    #[test]
    fn test_report_json_shape() {
        let report = DashboardReport::from_session(&session(vec![
            obs(0.0, 90.0, 10.0),
            obs(5.5, 110.0, 20.0),
        ]));
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["focus"], "high-carb");
        assert_eq!(value["groups"][0], "healthy");
        assert_eq!(value["series"][0]["points"][1]["time"], 5.5);
        assert_eq!(value["composition"]["mean_calories"], 98.0);
        assert!(value["domain"]["x"].is_array());
        assert!(value["metadata"]["generated_at"].is_string());
    }

    #[test]
    fn test_report_text_lists_points_and_composition() {
        let text = DashboardReport::from_session(&session(vec![
            obs(0.0, 90.0, 10.0),
            obs(5.5, 110.0, 20.0),
        ]))
        .to_text();

        assert!(text.contains("Meal focus: High-Carb"));
        assert!(text.contains("5:30"));
        assert!(text.contains("110.0 mg/dL"));
        assert!(text.contains("15.0g"));
        assert!(text.contains("98 kcal"));
        assert!(text.contains("Pre-diabetic\n    no readings"));
    }

    #[test]
    fn test_report_text_without_data() {
        let report = DashboardReport::from_session(&session(vec![]));
        assert!(report.composition.is_none());
        assert!(report.domain.is_none());
        assert!(report.to_text().contains("  no data"));
    }
}
