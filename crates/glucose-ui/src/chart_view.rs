//! Glucose response chart for the dashboard TUI.
//!
//! Draws one line per selected health group over the visible part of the
//! chart domain, with the legend in the top-right corner.

use glucose_core::formatting::format_number;
use glucose_core::models::{ChartDomain, Series};
use ratatui::{
    layout::{Constraint, Rect},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::themes::Theme;
use crate::viewport::Viewport;

pub const X_AXIS_TITLE: &str = "Minutes After Meal";
pub const Y_AXIS_TITLE: &str = "Blood Glucose (mg/dL)";

/// Number of labels drawn along each axis.
const AXIS_LABELS: usize = 5;

/// All data required to render the chart.
pub struct ChartViewData<'a> {
    pub series: &'a [Series],
    /// Full extents; `None` when no series has a point.
    pub domain: Option<ChartDomain>,
    pub viewport: Viewport,
}

/// Render the chart into `area`, or a placeholder when there is nothing to
/// plot.
pub fn render_chart(frame: &mut Frame, area: Rect, data: &ChartViewData<'_>, theme: &Theme) {
    let Some(domain) = data.domain else {
        render_no_data(frame, area, theme);
        return;
    };

    let visible = data.viewport.visible(&domain);
    let x_bounds = widen_degenerate(visible.x);
    let y_bounds = widen_degenerate(visible.y);

    let points: Vec<Vec<(f64, f64)>> = data
        .series
        .iter()
        .map(|s| s.points.iter().map(|p| (p.time, p.mean)).collect())
        .collect();

    let datasets: Vec<Dataset<'_>> = data
        .series
        .iter()
        .zip(&points)
        .map(|(series, pts)| {
            Dataset::default()
                .name(series.group.label())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.group_style(series.group))
                .data(pts)
        })
        .collect();

    let title = if data.viewport.is_zoomed() {
        format!(" Glucose Response (zoom x{:.1}) ", data.viewport.scale())
    } else {
        " Glucose Response ".to_string()
    };

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .title(Span::styled(X_AXIS_TITLE, theme.axis_title))
                .style(theme.axis)
                .bounds([x_bounds.0, x_bounds.1])
                .labels(axis_labels(x_bounds, AXIS_LABELS)),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(Y_AXIS_TITLE, theme.axis_title))
                .style(theme.axis)
                .bounds([y_bounds.0, y_bounds.1])
                .labels(axis_labels(y_bounds, AXIS_LABELS)),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    frame.render_widget(chart, area);
}

/// Placeholder shown when the filter matches no readings.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No glucose readings for this selection", theme.dim)),
        Line::from(""),
        Line::from(Span::styled("Try another meal focus or health group", theme.info)),
    ];
    let paragraph = Paragraph::new(Text::from(text))
        .block(Block::default().borders(Borders::ALL).title(" Glucose Response "));
    frame.render_widget(paragraph, area);
}

/// Evenly spaced labels from `lo` to `hi`.
///
/// Uses whole numbers unless the span is too narrow to tell them apart.
pub fn axis_labels((lo, hi): (f64, f64), count: usize) -> Vec<String> {
    let count = count.max(2);
    let step = (hi - lo) / (count - 1) as f64;
    let decimals = if step.abs() < 1.0 { 1 } else { 0 };
    (0..count)
        .map(|i| format_number(lo + step * i as f64, decimals))
        .collect()
}

/// Give a zero-width range some room so the axis can be drawn.
fn widen_degenerate((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use glucose_core::models::{AggregatedPoint, HealthGroup};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn series(group: HealthGroup, points: &[(f64, f64)]) -> Series {
        Series {
            group,
            points: points
                .iter()
                .map(|&(time, mean)| AggregatedPoint { time, mean })
                .collect(),
        }
    }

    fn rendered(data: &ChartViewData<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chart(frame, area, data, &theme);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_axis_labels_whole_numbers() {
        assert_eq!(axis_labels((0.0, 120.0), 5), vec!["0", "30", "60", "90", "120"]);
    }

    #[test]
    fn test_axis_labels_narrow_range_uses_decimals() {
        assert_eq!(axis_labels((0.0, 2.0), 5), vec!["0.0", "0.5", "1.0", "1.5", "2.0"]);
    }

    #[test]
    fn test_widen_degenerate() {
        assert_eq!(widen_degenerate((5.0, 5.0)), (4.0, 6.0));
        assert_eq!(widen_degenerate((0.0, 5.0)), (0.0, 5.0));
    }

    #[test]
    fn test_render_chart_shows_legend_and_axes() {
        let data = [
            series(HealthGroup::Healthy, &[(0.0, 90.0), (60.0, 140.0)]),
            series(HealthGroup::Type2Diabetic, &[(0.0, 150.0), (120.0, 190.0)]),
        ];
        let view = ChartViewData {
            series: &data,
            domain: Some(ChartDomain {
                x: (0.0, 120.0),
                y: (90.0, 190.0),
            }),
            viewport: Viewport::default(),
        };

        let content = rendered(&view);
        assert!(content.contains("Healthy"));
        assert!(content.contains("Type 2 Diabetic"));
        assert!(content.contains("Glucose Response"));
    }

    #[test]
    fn test_render_chart_zoomed_title() {
        let data = [series(HealthGroup::Healthy, &[(0.0, 90.0), (60.0, 140.0)])];
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        let view = ChartViewData {
            series: &data,
            domain: Some(ChartDomain {
                x: (0.0, 60.0),
                y: (90.0, 140.0),
            }),
            viewport,
        };
        assert!(rendered(&view).contains("zoom x1."));
    }

    #[test]
    fn test_render_without_domain_shows_placeholder() {
        let view = ChartViewData {
            series: &[],
            domain: None,
            viewport: Viewport::default(),
        };
        assert!(rendered(&view).contains("No glucose readings"));
    }
}
