use glucose_core::formatting::{format_grams, percentage};
use glucose_core::models::CompositionSummary;
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Configuration controlling visual appearance of a bar.
pub struct ProgressBarConfig {
    /// Total width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── MacroShareBar ────────────────────────────────────────────────────────────

/// One macronutrient's share of total macro mass.
///
/// Renders as a fill in the macro's colour followed by `grams (pct%)`.
pub struct MacroShareBar<'a> {
    pub label: &'static str,
    pub grams: f64,
    /// Share of the total in percent, clamped to `[0.0, 100.0]`.
    pub percentage: f64,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> MacroShareBar<'a> {
    pub fn new(label: &'static str, grams: f64, total_grams: f64, theme: &'a Theme) -> Self {
        Self {
            label,
            grams,
            percentage: percentage(grams, total_grams, 1).clamp(0.0, 100.0),
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = ((self.percentage / 100.0) * self.config.width as f64).round() as u16;
        let filled = filled.min(self.config.width);
        let empty = self.config.width - filled;

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        Line::from(vec![
            Span::styled(format!("{:<8}", self.label), self.theme.macro_style(self.label)),
            Span::styled(filled_str, self.theme.macro_style(self.label)),
            Span::styled(empty_str, self.theme.progress_empty),
            Span::styled(
                format!(" {} ({:.1}%)", format_grams(self.grams), self.percentage),
                self.theme.progress_label,
            ),
        ])
    }
}

// ── CompositionBar ───────────────────────────────────────────────────────────

/// A proportional three-colour bar of Carbs, Protein and Fat mass.
///
/// Segments always appear in Carbs, Protein, Fat order so a change of filter
/// only moves the boundaries between them.
pub struct CompositionBar<'a> {
    pub summary: CompositionSummary,
    pub theme: &'a Theme,
    pub width: u16,
}

impl<'a> CompositionBar<'a> {
    pub fn new(summary: CompositionSummary, theme: &'a Theme) -> Self {
        Self {
            summary,
            theme,
            width: 40,
        }
    }

    /// Segment widths in columns, summing to `width` when total mass is
    /// positive and to zero otherwise.
    pub fn segment_widths(&self) -> [u16; 3] {
        let total = self.summary.total_grams();
        let mut widths = [0u16; 3];
        if total <= 0.0 {
            return widths;
        }

        let mut used = 0u16;
        let mut cumulative = 0.0;
        for (i, (_, grams)) in self.summary.parts().iter().enumerate() {
            cumulative += grams.max(0.0);
            let end = ((cumulative / total) * self.width as f64).round() as u16;
            let end = end.min(self.width);
            widths[i] = end.saturating_sub(used);
            used = used.max(end);
        }
        widths
    }

    pub fn to_line(&self) -> Line<'a> {
        let spans: Vec<Span<'a>> = self
            .summary
            .parts()
            .iter()
            .zip(self.segment_widths())
            .filter(|(_, w)| *w > 0)
            .map(|((label, _), w)| Span::styled("█".repeat(w as usize), self.theme.macro_style(label)))
            .collect();
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_share_bar_to_line() {
        let theme = Theme::dark();
        let line = MacroShareBar::new("Carbs", 15.0, 60.0, &theme).to_line();

        assert_eq!(line.spans.len(), 4);
        assert_eq!(line.spans[1].content.chars().count(), 10);
        assert!(line.spans[1].content.chars().all(|c| c == '█'));
        assert_eq!(line.spans[2].content.chars().count(), 30);
        assert_eq!(line.spans[1].style, theme.macro_carbs);

        let label = line.spans[3].content.as_ref();
        assert!(label.contains("15.0g"), "label was: {label}");
        assert!(label.contains("25.0%"), "label was: {label}");
    }

    #[test]
    fn test_macro_share_bar_zero_total() {
        let theme = Theme::dark();
        let bar = MacroShareBar::new("Fat", 0.0, 0.0, &theme);
        assert_eq!(bar.percentage, 0.0);
        let line = bar.to_line();
        assert_eq!(line.spans[1].content.len(), 0);
        assert_eq!(line.spans[2].content.chars().count(), 40);
    }

    #[test]
    fn test_composition_bar_widths_fill_bar() {
        let theme = Theme::dark();
        let bar = CompositionBar::new(CompositionSummary::from_means(15.0, 5.0, 2.0), &theme);
        let widths = bar.segment_widths();
        assert_eq!(widths.iter().sum::<u16>(), 40);
        assert!(widths[0] > widths[1] && widths[1] > widths[2]);
    }

    #[test]
    fn test_composition_bar_keeps_macro_order() {
        let theme = Theme::dark();
        let line =
            CompositionBar::new(CompositionSummary::from_means(1.0, 1.0, 2.0), &theme).to_line();
        let styles: Vec<_> = line.spans.iter().map(|s| s.style).collect();
        assert_eq!(styles, vec![theme.macro_carbs, theme.macro_protein, theme.macro_fat]);
        assert_eq!(line.spans[2].content.chars().count(), 20);
    }

    #[test]
    fn test_composition_bar_empty_mass() {
        let theme = Theme::dark();
        let bar = CompositionBar::new(CompositionSummary::from_means(0.0, 0.0, 0.0), &theme);
        assert_eq!(bar.segment_widths(), [0, 0, 0]);
        assert!(bar.to_line().spans.is_empty());
    }
}
