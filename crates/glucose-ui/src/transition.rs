//! Animated change of the composition panel.
//!
//! When the filter changes, the bars move from the previously displayed
//! composition to the new one over [`TRANSITION`]. An empty result leaves the
//! last displayed composition as the starting point for the next change.

use std::time::{Duration, Instant};

use glucose_core::models::CompositionSummary;

pub const TRANSITION: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy)]
pub struct CompositionTransition {
    from: CompositionSummary,
    to: CompositionSummary,
    started: Instant,
}

impl CompositionTransition {
    /// Start at rest on `summary`.
    pub fn settled(summary: CompositionSummary, now: Instant) -> Self {
        Self {
            from: summary,
            to: summary,
            started: now.checked_sub(TRANSITION).unwrap_or(now),
        }
    }

    /// Animate from whatever is shown at `now` towards `target`.
    pub fn retarget(&mut self, target: CompositionSummary, now: Instant) {
        self.from = self.at(now);
        self.to = target;
        self.started = now;
    }

    pub fn target(&self) -> CompositionSummary {
        self.to
    }

    pub fn is_running(&self, now: Instant) -> bool {
        self.progress(now) < 1.0
    }

    /// Composition to draw at `now`.
    ///
    /// Calories are not animated; the target value shows immediately.
    pub fn at(&self, now: Instant) -> CompositionSummary {
        let t = ease_cubic_in_out(self.progress(now));
        CompositionSummary {
            mean_carbs: lerp(self.from.mean_carbs, self.to.mean_carbs, t),
            mean_protein: lerp(self.from.mean_protein, self.to.mean_protein, t),
            mean_fat: lerp(self.from.mean_fat, self.to.mean_fat, t),
            mean_calories: self.to.mean_calories,
        }
    }

    fn progress(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / TRANSITION.as_secs_f64()).min(1.0)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic ease-in-out over `t` in `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
