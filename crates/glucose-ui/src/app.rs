//! Main application state and TUI event loop for the meal-glucose dashboard.
//!
//! [`App`] owns the query session, the theme and the UI-only state (chart
//! viewport, composition animation, status line). [`run_dashboard`] drives a
//! loading screen while the dataset loads and then the interactive loop.

use std::collections::BTreeSet;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use glucose_core::error::Result;
use glucose_core::models::{ChartDomain, CompositionSummary, HealthGroup, NutrientFocus, Series};
use glucose_runtime::loader::LoadHandle;
use glucose_runtime::session::{FilterState, QuerySession};

use crate::chart_view::{self, ChartViewData};
use crate::components::header::Header;
use crate::components::indicators::{FocusSelector, GroupToggles};
use crate::composition_view;
use crate::themes::Theme;
use crate::transition::CompositionTransition;
use crate::viewport::{Viewport, PAN_STEP};

/// Poll interval while idle.
const IDLE_TICK: Duration = Duration::from_millis(250);
/// Poll interval while the composition animates.
const ANIMATION_TICK: Duration = Duration::from_millis(33);

const HELP: &str = "c/p/f focus  1/2/3 groups  +/- zoom  arrows pan  0 reset  q quit";

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    session: QuerySession,
    series: Vec<Series>,
    domain: Option<ChartDomain>,
    composition: Option<CompositionSummary>,
    viewport: Viewport,
    /// Last non-empty composition and its animation; kept across empty
    /// results so the next change animates from what was last shown.
    transition: Option<CompositionTransition>,
    status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: QuerySession, theme: Theme) -> Self {
        let mut app = Self {
            theme,
            session,
            series: Vec::new(),
            domain: None,
            composition: None,
            viewport: Viewport::default(),
            transition: None,
            status: None,
            should_quit: false,
        };
        app.refresh(Instant::now());
        app
    }

    pub fn session(&self) -> &QuerySession {
        &self.session
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Apply one key press. Returns `true` when anything visible changed.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        self.status = None;

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,

            KeyCode::Char('c') => self.select_focus(NutrientFocus::HighCarb, now),
            KeyCode::Char('p') => self.select_focus(NutrientFocus::HighProtein, now),
            KeyCode::Char('f') => self.select_focus(NutrientFocus::HighFat, now),

            KeyCode::Char('1') => self.toggle_group(HealthGroup::Healthy, now),
            KeyCode::Char('2') => self.toggle_group(HealthGroup::PreDiabetic, now),
            KeyCode::Char('3') => self.toggle_group(HealthGroup::Type2Diabetic, now),

            KeyCode::Char('+') | KeyCode::Char('=') => self.viewport.zoom_in(),
            KeyCode::Char('-') => self.viewport.zoom_out(),
            KeyCode::Char('0') => self.viewport.reset(),
            KeyCode::Left => self.viewport.pan(-PAN_STEP, 0.0),
            KeyCode::Right => self.viewport.pan(PAN_STEP, 0.0),
            KeyCode::Up => self.viewport.pan(0.0, PAN_STEP),
            KeyCode::Down => self.viewport.pan(0.0, -PAN_STEP),

            _ => return false,
        }
        true
    }

    /// `true` while something on screen is still moving.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.transition.is_some_and(|t| t.is_running(now))
    }

    /// Render the dashboard into `frame` as it should look at `now`.
    pub fn render(&self, frame: &mut Frame, now: Instant) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(area);

        let header = Header::new(self.session.focus(), self.session.groups(), &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), rows[0]);

        let selectors = vec![
            FocusSelector::new(self.session.focus(), &self.theme).to_line(),
            GroupToggles::new(self.session.groups(), &self.theme).to_line(),
        ];
        frame.render_widget(Paragraph::new(Text::from(selectors)), rows[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(rows[2]);

        let chart = ChartViewData {
            series: &self.series,
            domain: self.domain,
            viewport: self.viewport,
        };
        chart_view::render_chart(frame, body[0], &chart, &self.theme);

        let shown = self
            .composition
            .and_then(|_| self.transition.map(|t| t.at(now)));
        composition_view::render_composition(frame, body[1], shown, &self.theme);

        self.render_footer(frame, rows[3]);
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn select_focus(&mut self, focus: NutrientFocus, now: Instant) {
        if self.session.focus() != focus {
            self.session.set_focus(focus);
            self.refresh(now);
        }
    }

    fn toggle_group(&mut self, group: HealthGroup, now: Instant) {
        if self.session.toggle_group(group) {
            self.refresh(now);
        } else {
            self.status = Some("At least one health group must stay selected".to_string());
        }
    }

    /// Re-run every query for the current filter.
    fn refresh(&mut self, now: Instant) {
        self.series = self.session.time_series();
        self.domain = glucose_data::domain::chart_domain(&self.series);
        self.composition = self.session.composition();
        self.viewport.reset();

        if let Some(summary) = self.composition {
            match self.transition.as_mut() {
                Some(transition) => transition.retarget(summary, now),
                None => self.transition = Some(CompositionTransition::settled(summary, now)),
            }
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some(message) => Line::from(Span::styled(message.clone(), self.theme.warning)),
            None => Line::from(Span::styled(HELP, self.theme.dim)),
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

// ── Loading screen ────────────────────────────────────────────────────────────

/// Placeholder shown while the dataset loads.
pub fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Loading meal dataset...", theme.info)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    let paragraph = Paragraph::new(Text::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Meal Glucose "),
    );
    frame.render_widget(paragraph, area);
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

// ── Event loop ────────────────────────────────────────────────────────────────

/// Run the dashboard until the user quits.
///
/// Shows a loading screen until `load` finishes, then the interactive view
/// starting from `focus` and `groups`. Returns the final filter so the caller
/// can remember it, or `None` when the user quit during loading. The
/// terminal is restored on every exit path.
pub async fn run_dashboard(
    load: LoadHandle,
    theme: Theme,
    focus: NutrientFocus,
    groups: BTreeSet<HealthGroup>,
) -> Result<Option<FilterState>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = drive(&mut terminal, load, theme, focus, groups).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn drive(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    load: LoadHandle,
    theme: Theme,
    focus: NutrientFocus,
    groups: BTreeSet<HealthGroup>,
) -> Result<Option<FilterState>> {
    // ── Loading ───────────────────────────────────────────────────────────────
    while !load.is_finished() {
        terminal.draw(|frame| render_loading(frame, frame.area(), &theme))?;
        if event::poll(IDLE_TICK)? {
            if let Event::Key(key) = event::read()? {
                if is_quit(&key) {
                    load.detach();
                    return Ok(None);
                }
            }
        }
    }
    let dataset = load.wait().await?;
    let session = QuerySession::with_filter(dataset, focus, groups)?;
    let mut app = App::new(session, theme);

    // ── Interactive ───────────────────────────────────────────────────────────
    loop {
        let now = Instant::now();
        terminal.draw(|frame| app.render(frame, now))?;

        let tick = if app.is_animating(now) {
            ANIMATION_TICK
        } else {
            IDLE_TICK
        };
        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key, Instant::now());
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(Some(app.session.filter().clone()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
