use std::collections::BTreeSet;

use glucose_core::models::{HealthGroup, NutrientFocus};
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Decorative marks placed either side of the dashboard title.
pub const ACCENT: &str = "◆ ◇ ◆";

/// Width of the `=` separator under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Title with accent decorations, naming the current focus.
/// 2. A 60-column `=` separator.
/// 3. Selected groups in `[ group | group ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    pub focus: NutrientFocus,
    pub groups: &'a BTreeSet<HealthGroup>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(focus: NutrientFocus, groups: &'a BTreeSet<HealthGroup>, theme: &'a Theme) -> Self {
        Self {
            focus,
            groups,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let title = format!(" GLUCOSE RESPONSE ({}) BY HEALTH GROUP ", self.focus.label().to_uppercase());

        let mut info = vec![Span::styled("[ ", self.theme.label)];
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                info.push(Span::styled(" | ", self.theme.label));
            }
            info.push(Span::styled(group.label(), self.theme.group_style(*group)));
        }
        info.push(Span::styled(" ]", self.theme.label));

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(title, self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled("=".repeat(SEPARATOR_WIDTH), self.theme.separator)),
            Line::from(info),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
