//! Zoom and pan state for the glucose chart.
//!
//! The viewport is a window onto the chart domain: `scale` says how much of
//! the domain is visible (1 = all of it) and `center` says where the window
//! sits, as fractions of the full domain. The window never leaves the domain.

use glucose_core::models::ChartDomain;

pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 10.0;
/// Scale multiplier applied per zoom keypress.
pub const ZOOM_STEP: f64 = 1.25;
/// Fraction of the visible window moved per pan keypress.
pub const PAN_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f64,
    center: (f64, f64),
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: MIN_SCALE,
            center: (0.5, 0.5),
        }
    }
}

impl Viewport {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale > MIN_SCALE
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / ZOOM_STEP);
    }

    /// Move the window by `dx`, `dy` window widths (positive is right / up).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let window = 1.0 / self.scale;
        self.center.0 += dx * window;
        self.center.1 += dy * window;
        self.clamp_center();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The part of `domain` currently visible.
    pub fn visible(&self, domain: &ChartDomain) -> ChartDomain {
        ChartDomain {
            x: window(domain.x, self.center.0, self.scale),
            y: window(domain.y, self.center.1, self.scale),
        }
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.clamp_center();
    }

    fn clamp_center(&mut self) {
        let half = 0.5 / self.scale;
        self.center.0 = self.center.0.clamp(half, 1.0 - half);
        self.center.1 = self.center.1.clamp(half, 1.0 - half);
    }
}

fn window((lo, hi): (f64, f64), center: f64, scale: f64) -> (f64, f64) {
    let span = hi - lo;
    let half = 0.5 / scale;
    (lo + (center - half) * span, lo + (center + half) * span)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
