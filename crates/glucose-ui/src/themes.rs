use glucose_core::models::HealthGroup;
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are considered dark; 7–15 are considered light. If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

const HEALTHY_RGB: Color = Color::Rgb(0x1f, 0x77, 0xb4);
const PREDIABETIC_RGB: Color = Color::Rgb(0xff, 0x7f, 0x0e);
const TYPE2_RGB: Color = Color::Rgb(0x2c, 0xa0, 0x2c);
const CARBS_RGB: Color = Color::Rgb(0x4f, 0xd1, 0xc5);
const PROTEIN_RGB: Color = Color::Rgb(0x63, 0xb3, 0xed);
const FAT_RGB: Color = Color::Rgb(0xfc, 0x81, 0x81);

/// Complete theme definition carrying all UI styles used by glucose-ui
/// components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub dim: Style,
    pub label: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,

    // ── Selectors ────────────────────────────────────────────────────────────
    /// Currently selected focus or checked group.
    pub selected: Style,
    /// Options that are not selected.
    pub unselected: Style,

    // ── Chart ────────────────────────────────────────────────────────────────
    pub axis: Style,
    pub axis_title: Style,
    pub group_healthy: Style,
    pub group_prediabetic: Style,
    pub group_type2: Style,

    // ── Composition ──────────────────────────────────────────────────────────
    pub macro_carbs: Style,
    pub macro_protein: Style,
    pub macro_fat: Style,
    /// Unfilled portion of a composition bar.
    pub progress_empty: Style,
    pub progress_label: Style,
    pub calories: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),

            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),

            selected: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            unselected: Style::default().fg(Color::DarkGray),

            axis: Style::default().fg(Color::Gray),
            axis_title: Style::default().fg(Color::White),
            group_healthy: Style::default().fg(HEALTHY_RGB),
            group_prediabetic: Style::default().fg(PREDIABETIC_RGB),
            group_type2: Style::default().fg(TYPE2_RGB),

            macro_carbs: Style::default().fg(CARBS_RGB),
            macro_protein: Style::default().fg(PROTEIN_RGB),
            macro_fat: Style::default().fg(FAT_RGB),
            progress_empty: Style::default().fg(Color::DarkGray),
            progress_label: Style::default().fg(Color::Gray),
            calories: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Yellow),

            selected: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            unselected: Style::default().fg(Color::Gray),

            axis: Style::default().fg(Color::DarkGray),
            axis_title: Style::default().fg(Color::Black),
            group_healthy: Style::default().fg(HEALTHY_RGB),
            group_prediabetic: Style::default().fg(PREDIABETIC_RGB),
            group_type2: Style::default().fg(TYPE2_RGB),

            macro_carbs: Style::default().fg(CARBS_RGB),
            macro_protein: Style::default().fg(PROTEIN_RGB),
            macro_fat: Style::default().fg(FAT_RGB),
            progress_empty: Style::default().fg(Color::Gray),
            progress_label: Style::default().fg(Color::DarkGray),
            calories: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Classic terminal theme using only the basic 8-colour ANSI palette.
    ///
    /// Avoids bold modifiers and RGB colours for minimal terminal emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),

            selected: Style::default().fg(Color::Cyan),
            unselected: Style::default().fg(Color::DarkGray),

            axis: Style::default().fg(Color::Gray),
            axis_title: Style::default().fg(Color::White),
            group_healthy: Style::default().fg(Color::Blue),
            group_prediabetic: Style::default().fg(Color::Yellow),
            group_type2: Style::default().fg(Color::Green),

            macro_carbs: Style::default().fg(Color::Cyan),
            macro_protein: Style::default().fg(Color::Blue),
            macro_fat: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::DarkGray),
            progress_label: Style::default().fg(Color::White),
            calories: Style::default().fg(Color::White),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Line and legend colour for a health group.
    pub fn group_style(&self, group: HealthGroup) -> Style {
        match group {
            HealthGroup::Healthy => self.group_healthy,
            HealthGroup::PreDiabetic => self.group_prediabetic,
            HealthGroup::Type2Diabetic => self.group_type2,
        }
    }

    /// Segment colour for a macronutrient label (`"Carbs"`, `"Protein"`,
    /// `"Fat"`); anything else gets the plain label style.
    pub fn macro_style(&self, label: &str) -> Style {
        match label {
            "Carbs" => self.macro_carbs,
            "Protein" => self.macro_protein,
            "Fat" => self.macro_fat,
            _ => self.label,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
