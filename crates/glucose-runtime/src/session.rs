//! Interactive query session over a loaded dataset.
//!
//! [`QuerySession`] owns the current filter and answers the three queries
//! the dashboard draws from. Every answer is recomputed from the dataset and
//! the filter alone.

use std::collections::BTreeSet;
use std::sync::Arc;

use glucose_core::error::{DashboardError, Result};
use glucose_core::models::{ChartDomain, CompositionSummary, HealthGroup, NutrientFocus, Series};
use glucose_data::aggregator::GlucoseAggregator;
use glucose_data::analysis::Dataset;
use glucose_data::domain::chart_domain;

/// Current filter selection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FilterState {
    pub focus: NutrientFocus,
    /// Never empty.
    pub groups: BTreeSet<HealthGroup>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            focus: NutrientFocus::default(),
            groups: HealthGroup::ALL.into_iter().collect(),
        }
    }
}

pub struct QuerySession {
    dataset: Arc<Dataset>,
    filter: FilterState,
}

impl QuerySession {
    /// Start with every group selected and the default focus.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            filter: FilterState::default(),
        }
    }

    /// Start from an explicit filter. Fails on an empty group selection.
    pub fn with_filter(
        dataset: Arc<Dataset>,
        focus: NutrientFocus,
        groups: BTreeSet<HealthGroup>,
    ) -> Result<Self> {
        let mut session = Self::new(dataset);
        session.set_focus(focus);
        session.set_health_groups(groups)?;
        Ok(session)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn focus(&self) -> NutrientFocus {
        self.filter.focus
    }

    pub fn groups(&self) -> &BTreeSet<HealthGroup> {
        &self.filter.groups
    }

    // ── Filter updates ────────────────────────────────────────────────────────

    pub fn set_focus(&mut self, focus: NutrientFocus) {
        if self.filter.focus != focus {
            tracing::debug!(%focus, "nutrient focus changed");
        }
        self.filter.focus = focus;
    }

    /// Replace the group selection.
    ///
    /// An empty set is refused with [`DashboardError::EmptySelection`] and
    /// the previous selection stays in place.
    pub fn set_health_groups(&mut self, groups: BTreeSet<HealthGroup>) -> Result<()> {
        if groups.is_empty() {
            return Err(DashboardError::EmptySelection);
        }
        self.filter.groups = groups;
        Ok(())
    }

    /// Flip one group in or out of the selection.
    ///
    /// Returns `false` without changing anything when this would deselect
    /// the last remaining group.
    pub fn toggle_group(&mut self, group: HealthGroup) -> bool {
        if self.filter.groups.contains(&group) {
            if self.filter.groups.len() == 1 {
                return false;
            }
            self.filter.groups.remove(&group);
        } else {
            self.filter.groups.insert(group);
        }
        true
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn time_series(&self) -> Vec<Series> {
        GlucoseAggregator::time_series(&self.dataset.store, self.filter.focus, &self.filter.groups)
    }

    pub fn composition(&self) -> Option<CompositionSummary> {
        GlucoseAggregator::composition(&self.dataset.store, self.filter.focus, &self.filter.groups)
    }

    /// Axis extents of the current series, `None` when nothing matches.
    pub fn chart_domain(&self) -> Option<ChartDomain> {
        chart_domain(&self.time_series())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
