//! Chart axis extents.
//!
//! Extents are widened outward to round tick boundaries so both axes start
//! and end on a labelled tick.

use glucose_core::models::{ChartDomain, Series};

/// Approximate number of ticks the axes are rounded for.
pub const TICK_COUNT: u32 = 10;

const MAX_NICE_ITERATIONS: usize = 10;

/// Combined extents of every point in `series`, rounded with [`nice`].
///
/// `None` when no series has a point.
pub fn chart_domain(series: &[Series]) -> Option<ChartDomain> {
    let mut points = series.iter().flat_map(|s| s.points.iter());
    let first = points.next()?;

    let (mut x_min, mut x_max) = (first.time, first.time);
    let (mut y_min, mut y_max) = (first.mean, first.mean);
    for point in points {
        x_min = x_min.min(point.time);
        x_max = x_max.max(point.time);
        y_min = y_min.min(point.mean);
        y_max = y_max.max(point.mean);
    }

    Some(ChartDomain {
        x: nice(x_min, x_max, TICK_COUNT),
        y: nice(y_min, y_max, TICK_COUNT),
    })
}

/// Widen `[lo, hi]` outward to multiples of a round tick step.
///
/// Repeats until the step stabilises. Degenerate or non-finite ranges come
/// back unchanged.
pub fn nice(lo: f64, hi: f64, count: u32) -> (f64, f64) {
    if !(lo.is_finite() && hi.is_finite()) || lo >= hi || count == 0 {
        return (lo, hi);
    }

    let (mut start, mut stop) = (lo, hi);
    let mut previous: Option<f64> = None;

    for _ in 0..MAX_NICE_ITERATIONS {
        let step = tick_increment(start, stop, count);
        if previous == Some(step) {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else if step < 0.0 {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        } else {
            break;
        }
        previous = Some(step);
    }

    (start, stop)
}

/// Round tick step for `count` ticks over `[start, stop]`.
///
/// Positive values are the step itself (1, 2 or 5 times a power of ten);
/// negative values `-k` stand for a step of `1 / k`, which keeps sub-unit
/// steps exact in floating point.
pub fn tick_increment(start: f64, stop: f64, count: u32) -> f64 {
    let raw = (stop - start) / f64::from(count);
    if !(raw > 0.0) {
        return 0.0;
    }

    let power = raw.log10().floor();
    let error = raw / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glucose_core::models::{AggregatedPoint, HealthGroup};

    fn series(group: HealthGroup, points: &[(f64, f64)]) -> Series {
        Series {
            group,
            points: points
                .iter()
                .map(|&(time, mean)| AggregatedPoint { time, mean })
                .collect(),
        }
    }

    #[test]
    fn test_tick_increment_round_steps() {
        assert_eq!(tick_increment(0.0, 100.0, 10), 10.0);
        assert_eq!(tick_increment(0.0, 37.0, 10), 5.0);
        assert_eq!(tick_increment(0.0, 18.0, 10), 2.0);
        assert_eq!(tick_increment(0.0, 1.0, 10), -10.0);
    }

    #[test]
    fn test_nice_widens_outward() {
        assert_eq!(nice(0.0, 117.0, 10), (0.0, 120.0));
        assert_eq!(nice(87.3, 181.6, 10), (80.0, 190.0));
        assert_eq!(nice(0.13, 0.96, 10), (0.1, 1.0));
    }

    #[test]
    fn test_nice_keeps_round_extents() {
        assert_eq!(nice(0.0, 100.0, 10), (0.0, 100.0));
        assert_eq!(nice(-20.0, 40.0, 10), (-20.0, 40.0));
    }

    #[test]
    fn test_nice_degenerate_range_is_unchanged() {
        assert_eq!(nice(110.0, 110.0, 10), (110.0, 110.0));
        assert_eq!(nice(f64::NAN, 1.0, 10).1, 1.0);
    }

    #[test]
    fn test_chart_domain_spans_all_series() {
        let domain = chart_domain(&[
            series(HealthGroup::Healthy, &[(0.0, 92.0), (60.0, 140.0)]),
            series(HealthGroup::Type2Diabetic, &[(15.0, 181.0), (115.0, 160.0)]),
        ])
        .unwrap();
        assert_eq!(domain.x, (0.0, 120.0));
        assert_eq!(domain.y, (90.0, 190.0));
    }

    #[test]
    fn test_chart_domain_skips_empty_series() {
        let domain = chart_domain(&[
            series(HealthGroup::Healthy, &[]),
            series(HealthGroup::PreDiabetic, &[(0.0, 100.0)]),
        ])
        .unwrap();
        assert_eq!(domain.x, (0.0, 0.0));
        assert_eq!(domain.y, (100.0, 100.0));
    }

    #[test]
    fn test_chart_domain_none_without_points() {
        assert!(chart_domain(&[]).is_none());
        assert!(chart_domain(&[series(HealthGroup::Healthy, &[])]).is_none());
    }
}
