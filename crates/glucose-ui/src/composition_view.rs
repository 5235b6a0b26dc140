//! Macro composition panel for the dashboard TUI.
//!
//! Shows the mean Carbs / Protein / Fat mass of the matching meals as a
//! stacked bar plus one share bar per macro, and the mean calorie estimate.

use glucose_core::formatting::format_calories;
use glucose_core::models::CompositionSummary;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::components::progress_bar::{CompositionBar, MacroShareBar};
use crate::themes::Theme;

/// Render the composition panel into `area`.
///
/// `summary` is what to draw right now, which may be mid-transition.
pub fn render_composition(
    frame: &mut Frame,
    area: Rect,
    summary: Option<CompositionSummary>,
    theme: &Theme,
) {
    let lines = match summary {
        Some(summary) => build_composition_lines(&summary, bar_width(area), theme),
        None => vec![
            Line::from(""),
            Line::from(Span::styled("No meals match this selection", theme.dim)),
        ],
    };
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Average Meal Composition "),
    );
    frame.render_widget(paragraph, area);
}

/// Build the panel's lines (extracted for testability).
pub fn build_composition_lines<'a>(
    summary: &CompositionSummary,
    width: u16,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let mut lines = Vec::with_capacity(8);

    let mut stacked = CompositionBar::new(*summary, theme);
    stacked.width = width;
    lines.push(Line::from(""));
    lines.push(stacked.to_line());
    lines.push(Line::from(""));

    let total = summary.total_grams();
    for (label, grams) in summary.parts() {
        let mut bar = MacroShareBar::new(label, grams, total, theme);
        bar.config.width = width.saturating_sub(24);
        lines.push(bar.to_line());
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Avg Calories: ", theme.label),
        Span::styled(format_calories(summary.mean_calories), theme.calories),
    ]));
    lines
}

/// Inner width available for bars inside the bordered block.
fn bar_width(area: Rect) -> u16 {
    area.width.saturating_sub(4).max(10)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
