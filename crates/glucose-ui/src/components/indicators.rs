use std::collections::BTreeSet;

use glucose_core::models::{HealthGroup, NutrientFocus};
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Key that selects `focus` in the TUI.
pub fn focus_key(focus: NutrientFocus) -> char {
    match focus {
        NutrientFocus::HighCarb => 'c',
        NutrientFocus::HighProtein => 'p',
        NutrientFocus::HighFat => 'f',
    }
}

/// Key that toggles `group` in the TUI.
pub fn group_key(group: HealthGroup) -> char {
    match group {
        HealthGroup::Healthy => '1',
        HealthGroup::PreDiabetic => '2',
        HealthGroup::Type2Diabetic => '3',
    }
}

// ── FocusSelector ────────────────────────────────────────────────────────────

/// Radio-style row listing every nutrient focus with its key.
///
/// Format: `"Meal focus: (c) ● High-Carb  (p) ○ High-Protein  (f) ○ High-Fat"`
pub struct FocusSelector<'a> {
    pub current: NutrientFocus,
    pub theme: &'a Theme,
}

impl<'a> FocusSelector<'a> {
    pub fn new(current: NutrientFocus, theme: &'a Theme) -> Self {
        Self { current, theme }
    }

    pub fn to_line(&self) -> Line<'a> {
        let mut spans = vec![Span::styled("Meal focus: ", self.theme.label)];
        for focus in NutrientFocus::ALL {
            let (mark, style) = if focus == self.current {
                ("●", self.theme.selected)
            } else {
                ("○", self.theme.unselected)
            };
            spans.push(Span::styled(format!("({}) ", focus_key(focus)), self.theme.dim));
            spans.push(Span::styled(format!("{} {}  ", mark, focus.label()), style));
        }
        Line::from(spans)
    }
}

// ── GroupToggles ─────────────────────────────────────────────────────────────

/// Checkbox row listing every health group in its series colour.
///
/// Format: `"Groups: (1) [x] Healthy  (2) [ ] Pre-diabetic  (3) [x] Type 2 Diabetic"`
pub struct GroupToggles<'a> {
    pub selected: &'a BTreeSet<HealthGroup>,
    pub theme: &'a Theme,
}

impl<'a> GroupToggles<'a> {
    pub fn new(selected: &'a BTreeSet<HealthGroup>, theme: &'a Theme) -> Self {
        Self { selected, theme }
    }

    pub fn to_line(&self) -> Line<'a> {
        let mut spans = vec![Span::styled("Groups: ", self.theme.label)];
        for group in HealthGroup::ALL {
            let checked = self.selected.contains(&group);
            let (mark, style) = if checked {
                ("[x]", self.theme.group_style(group))
            } else {
                ("[ ]", self.theme.unselected)
            };
            spans.push(Span::styled(format!("({}) ", group_key(group)), self.theme.dim));
            spans.push(Span::styled(format!("{} {}  ", mark, group.label()), style));
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<char> = NutrientFocus::ALL.iter().map(|&f| focus_key(f)).collect();
        keys.extend(HealthGroup::ALL.iter().map(|&g| group_key(g)));
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn test_focus_selector_marks_current() {
        let theme = Theme::dark();
        let line = FocusSelector::new(NutrientFocus::HighProtein, &theme).to_line();
        let content = text(&line);

        assert!(content.contains("(p) ● High-Protein"), "got: {content}");
        assert!(content.contains("(c) ○ High-Carb"), "got: {content}");
        assert_eq!(line.spans[4].style, theme.selected);
    }

    #[test]
    fn test_group_toggles_reflect_selection() {
        let theme = Theme::dark();
        let selected: BTreeSet<HealthGroup> = [HealthGroup::PreDiabetic].into_iter().collect();
        let line = GroupToggles::new(&selected, &theme).to_line();
        let content = text(&line);

        assert!(content.contains("(1) [ ] Healthy"), "got: {content}");
        assert!(content.contains("(2) [x] Pre-diabetic"), "got: {content}");
        assert_eq!(line.spans[4].style, theme.group_prediabetic);
    }
}
