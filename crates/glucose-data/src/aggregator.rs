//! Grouped glucose curves and macro composition over an observation store.
//!
//! Both aggregations are pure functions of the store and the filter; nothing
//! from a previous query influences the next one.

use std::collections::{BTreeSet, HashMap};

use glucose_core::models::{
    AggregatedPoint, CompositionSummary, HealthGroup, NutrientFocus, Observation, Series,
};

use crate::store::ObservationStore;

// ── GlucoseStats ──────────────────────────────────────────────────────────────

/// Running glucose sum for one time bucket.
#[derive(Debug, Clone, Copy, Default)]
struct GlucoseStats {
    time: f64,
    sum: f64,
    count: u32,
}

impl GlucoseStats {
    fn add(&mut self, observation: &Observation) {
        self.time = observation.time;
        self.sum += observation.glucose;
        self.count += 1;
    }

    fn point(&self) -> AggregatedPoint {
        AggregatedPoint {
            time: self.time,
            mean: self.sum / f64::from(self.count),
        }
    }
}

// ── MacroStats ────────────────────────────────────────────────────────────────

/// Running macro totals across the filtered observations.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroStats {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub count: u32,
}

impl MacroStats {
    pub fn add_observation(&mut self, observation: &Observation) {
        self.carbs += observation.carbs;
        self.protein += observation.protein;
        self.fat += observation.fat;
        self.count += 1;
    }

    /// Mean composition, or `None` when nothing was added.
    pub fn summary(&self) -> Option<CompositionSummary> {
        if self.count == 0 {
            return None;
        }
        let n = f64::from(self.count);
        Some(CompositionSummary::from_means(
            self.carbs / n,
            self.protein / n,
            self.fat / n,
        ))
    }
}

// ── GlucoseAggregator ─────────────────────────────────────────────────────────

/// Stateless helper computing the dashboard's two aggregations.
pub struct GlucoseAggregator;

impl GlucoseAggregator {
    /// One [`Series`] per requested group, in legend order.
    ///
    /// An empty `groups` set yields no series; a group without matching
    /// observations yields a series with no points.
    pub fn time_series(
        store: &ObservationStore,
        focus: NutrientFocus,
        groups: &BTreeSet<HealthGroup>,
    ) -> Vec<Series> {
        groups
            .iter()
            .map(|&group| Self::group_series(store, focus, group))
            .collect()
    }

    /// Mean glucose per exact time value for one `(focus, group)` pair,
    /// sorted ascending by time.
    pub fn group_series(
        store: &ObservationStore,
        focus: NutrientFocus,
        group: HealthGroup,
    ) -> Series {
        let mut buckets: HashMap<u64, GlucoseStats> = HashMap::new();

        for observation in
            store.query(|o| o.nutrient_focus == focus && o.health_group == group)
        {
            buckets
                .entry(time_key(observation.time))
                .or_default()
                .add(observation);
        }

        let mut points: Vec<AggregatedPoint> =
            buckets.values().map(GlucoseStats::point).collect();
        points.sort_by(|a, b| a.time.total_cmp(&b.time));

        Series { group, points }
    }

    /// Mean macro composition of observations with `focus` whose group is
    /// in `groups`. `None` when no observation matches.
    pub fn composition(
        store: &ObservationStore,
        focus: NutrientFocus,
        groups: &BTreeSet<HealthGroup>,
    ) -> Option<CompositionSummary> {
        let mut stats = MacroStats::default();
        for observation in
            store.query(|o| o.nutrient_focus == focus && groups.contains(&o.health_group))
        {
            stats.add_observation(observation);
        }
        stats.summary()
    }
}

/// Exact-value bucket key; `-0.0` and `0.0` share a bucket.
fn time_key(time: f64) -> u64 {
    if time == 0.0 {
        0.0_f64.to_bits()
    } else {
        time.to_bits()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(
        focus: NutrientFocus,
        group: HealthGroup,
        time: f64,
        glucose: f64,
        macros: (f64, f64, f64),
    ) -> Observation {
        Observation {
            nutrient_focus: focus,
            health_group: group,
            time,
            glucose,
            carbs: macros.0,
            protein: macros.1,
            fat: macros.2,
        }
    }

    fn carb(group: HealthGroup, time: f64, glucose: f64) -> Observation {
        obs(NutrientFocus::HighCarb, group, time, glucose, (50.0, 10.0, 5.0))
    }

    fn groups(list: &[HealthGroup]) -> BTreeSet<HealthGroup> {
        list.iter().copied().collect()
    }

    // ── time_series ───────────────────────────────────────────────────────────

    #[test]
    fn test_time_series_means_per_exact_time() {
        let store: ObservationStore = vec![
            carb(HealthGroup::Healthy, 15.0, 100.0),
            carb(HealthGroup::Healthy, 15.0, 120.0),
            carb(HealthGroup::Healthy, 0.0, 90.0),
            carb(HealthGroup::Healthy, 15.5, 200.0),
        ]
        .into_iter()
        .collect();

        let series = GlucoseAggregator::group_series(
            &store,
            NutrientFocus::HighCarb,
            HealthGroup::Healthy,
        );
        assert_eq!(
            series.points,
            vec![
                AggregatedPoint { time: 0.0, mean: 90.0 },
                AggregatedPoint { time: 15.0, mean: 110.0 },
                AggregatedPoint { time: 15.5, mean: 200.0 },
            ]
        );
    }

    #[test]
    fn test_time_series_filters_focus_and_group() {
        let store: ObservationStore = vec![
            carb(HealthGroup::Healthy, 0.0, 90.0),
            carb(HealthGroup::PreDiabetic, 0.0, 130.0),
            obs(NutrientFocus::HighFat, HealthGroup::Healthy, 0.0, 300.0, (1.0, 1.0, 9.0)),
        ]
        .into_iter()
        .collect();

        let series = GlucoseAggregator::time_series(
            &store,
            NutrientFocus::HighCarb,
            &groups(&[HealthGroup::Healthy]),
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![AggregatedPoint { time: 0.0, mean: 90.0 }]);
    }

    #[test]
    fn test_time_series_one_series_per_group_in_legend_order() {
        let store: ObservationStore = vec![
            carb(HealthGroup::Type2Diabetic, 0.0, 150.0),
            carb(HealthGroup::Healthy, 0.0, 90.0),
        ]
        .into_iter()
        .collect();

        let series = GlucoseAggregator::time_series(
            &store,
            NutrientFocus::HighCarb,
            &groups(&[HealthGroup::Type2Diabetic, HealthGroup::Healthy]),
        );
        let order: Vec<HealthGroup> = series.iter().map(|s| s.group).collect();
        assert_eq!(order, vec![HealthGroup::Healthy, HealthGroup::Type2Diabetic]);
    }

    #[test]
    fn test_time_series_empty_group_is_empty_series() {
        let store: ObservationStore = vec![carb(HealthGroup::Healthy, 0.0, 90.0)]
            .into_iter()
            .collect();

        let series = GlucoseAggregator::time_series(
            &store,
            NutrientFocus::HighCarb,
            &groups(&[HealthGroup::Healthy, HealthGroup::PreDiabetic]),
        );
        assert_eq!(series.len(), 2);
        assert!(!series[0].is_empty());
        assert!(series[1].is_empty());
    }

    #[test]
    fn test_time_series_empty_group_set_is_no_series() {
        let store: ObservationStore = vec![carb(HealthGroup::Healthy, 0.0, 90.0)]
            .into_iter()
            .collect();
        let series =
            GlucoseAggregator::time_series(&store, NutrientFocus::HighCarb, &BTreeSet::new());
        assert!(series.is_empty());
    }

    #[test]
    fn test_time_series_empty_store() {
        let series = GlucoseAggregator::time_series(
            &ObservationStore::new(),
            NutrientFocus::HighProtein,
            &groups(&HealthGroup::ALL),
        );
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(Series::is_empty));
    }

    #[test]
    fn test_time_key_merges_signed_zero() {
        assert_eq!(time_key(-0.0), time_key(0.0));
        assert_ne!(time_key(0.5), time_key(0.0));
    }

    // ── composition ───────────────────────────────────────────────────────────

    #[test]
    fn test_composition_means_and_calories() {
        let store: ObservationStore = vec![
            obs(NutrientFocus::HighCarb, HealthGroup::Healthy, 0.0, 90.0, (10.0, 5.0, 2.0)),
            obs(NutrientFocus::HighCarb, HealthGroup::Healthy, 0.0, 95.0, (20.0, 5.0, 2.0)),
        ]
        .into_iter()
        .collect();

        let summary = GlucoseAggregator::composition(
            &store,
            NutrientFocus::HighCarb,
            &groups(&[HealthGroup::Healthy]),
        )
        .unwrap();
        assert_eq!(summary.mean_carbs, 15.0);
        assert_eq!(summary.mean_protein, 5.0);
        assert_eq!(summary.mean_fat, 2.0);
        assert_eq!(summary.mean_calories, 98.0);
    }

    #[test]
    fn test_composition_combines_requested_groups() {
        let store: ObservationStore = vec![
            obs(NutrientFocus::HighCarb, HealthGroup::Healthy, 0.0, 90.0, (10.0, 0.0, 0.0)),
            obs(NutrientFocus::HighCarb, HealthGroup::PreDiabetic, 0.0, 90.0, (30.0, 0.0, 0.0)),
            obs(NutrientFocus::HighCarb, HealthGroup::Type2Diabetic, 0.0, 90.0, (90.0, 0.0, 0.0)),
        ]
        .into_iter()
        .collect();

        let summary = GlucoseAggregator::composition(
            &store,
            NutrientFocus::HighCarb,
            &groups(&[HealthGroup::Healthy, HealthGroup::PreDiabetic]),
        )
        .unwrap();
        assert_eq!(summary.mean_carbs, 20.0);
    }

    #[test]
    fn test_composition_no_match_is_none() {
        let store: ObservationStore = vec![carb(HealthGroup::Healthy, 0.0, 90.0)]
            .into_iter()
            .collect();

        assert!(GlucoseAggregator::composition(
            &store,
            NutrientFocus::HighFat,
            &groups(&[HealthGroup::Healthy]),
        )
        .is_none());
        assert!(
            GlucoseAggregator::composition(&store, NutrientFocus::HighCarb, &BTreeSet::new())
                .is_none()
        );
    }

    #[test]
    fn test_macro_stats_empty_summary() {
        assert!(MacroStats::default().summary().is_none());
    }
}
