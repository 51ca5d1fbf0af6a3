pub mod app_dirs;
pub mod config;
pub mod runtime;
pub mod scramble;
pub mod session;
pub mod solve;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod ui;
pub mod util;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{SessionStore, StoreError},
    solve::PuzzleType,
    stats::{session_stats, SessionStats},
    storage::{FileHistoryStore, HistoryStore},
    timer::{InputEdge, Phase, TimerMachine},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 10;

/// terminal speedcubing timer with inspection and rolling averages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal speedcubing timer with WCA-style inspection, per-puzzle scrambles, named practice sessions, and rolling ao5/ao12 statistics."
)]
pub struct Cli {
    /// puzzle type to practice
    #[clap(short = 'p', long, value_enum)]
    puzzle: Option<PuzzleType>,

    /// enable the 15 second inspection countdown
    #[clap(long)]
    inspection: bool,

    /// disable inspection even if the saved config enables it
    #[clap(long, conflicts_with = "inspection")]
    no_inspection: bool,

    /// switch to (or create) a session by name before starting
    #[clap(short = 's', long)]
    session: Option<String>,
}

impl Cli {
    /// Command-line flags override the persisted config for this run.
    fn apply(&self, config: &mut Config) {
        if let Some(puzzle) = self.puzzle {
            config.puzzle = puzzle;
        }
        if self.inspection {
            config.use_inspection = true;
        }
        if self.no_inspection {
            config.use_inspection = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePurpose {
    NewSession,
    RenameSession,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Timing,
    ConfirmClear,
    NameEntry { purpose: NamePurpose, buffer: String },
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub store: SessionStore,
    pub timer: TimerMachine,
    pub scramble: String,
    pub stats: SessionStats,
    pub state: AppState,
    pub message: Option<String>,
    /// Whether the terminal reports key release events. Without them,
    /// a second press substitutes for the release half of the
    /// hold-and-release start gesture.
    pub release_events: bool,
    pub last_now: Instant,
}

impl App {
    pub fn new(config: Config, store: SessionStore) -> Self {
        let scramble = scramble::generate(config.puzzle);
        let mut app = Self {
            timer: TimerMachine::new(config.use_inspection),
            config,
            store,
            scramble,
            stats: SessionStats::default(),
            state: AppState::Timing,
            message: None,
            release_events: true,
            last_now: Instant::now(),
        };
        app.refresh_stats();
        app
    }

    pub fn current_solves(&self) -> Vec<crate::solve::Solve> {
        self.store.active().solves_of(self.config.puzzle)
    }

    fn refresh_stats(&mut self) {
        self.stats = session_stats(&self.current_solves());
    }

    fn apply_result(&mut self, result: timer::SolveResult) {
        match result.raw_time_ms {
            Some(raw) if !result.is_dnf => {
                self.store
                    .record_solve(self.config.puzzle, self.scramble.clone(), raw, result.penalty_units);
            }
            _ => {
                self.store.record_dnf(self.config.puzzle, self.scramble.clone());
            }
        }
        self.refresh_stats();
    }

    /// Feed one press/release edge at `now`. Returns true when the
    /// solve history changed.
    pub fn handle_edge(&mut self, edge: InputEdge, now: Instant) -> bool {
        self.last_now = now;
        if let Some(result) = self.timer.handle_edge(edge, now) {
            self.apply_result(result);
            // A manually stopped solve gets its next scramble at once;
            // the auto-DNF path defers via the timer's refresh delay.
            self.scramble = scramble::generate(self.config.puzzle);
            true
        } else {
            false
        }
    }

    /// Advance time-driven behavior. Returns true when the solve
    /// history changed (an inspection overrun committed a DNF).
    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.last_now = now;
        let mut changed = false;
        if let Some(result) = self.timer.on_tick(now) {
            self.apply_result(result);
            changed = true;
        }
        if self.timer.take_scramble_refresh(now) {
            self.scramble = scramble::generate(self.config.puzzle);
        }
        changed
    }

    /// Returns true when the switch happened (and the config should be
    /// persisted).
    pub fn switch_puzzle(&mut self, puzzle: PuzzleType) -> bool {
        if puzzle == self.config.puzzle || !self.timer.can_switch_puzzle() {
            return false;
        }
        self.config.puzzle = puzzle;
        self.timer.cancel_deadlines();
        self.scramble = scramble::generate(puzzle);
        self.refresh_stats();
        true
    }

    pub fn toggle_inspection(&mut self) -> bool {
        if !self.timer.is_idle() {
            return false;
        }
        self.config.use_inspection = !self.config.use_inspection;
        self.timer = TimerMachine::new(self.config.use_inspection);
        true
    }

    fn latest_solve_id(&self) -> Option<u64> {
        self.store
            .active()
            .solves
            .iter()
            .find(|s| s.puzzle == self.config.puzzle)
            .map(|s| s.id)
    }

    pub fn cycle_penalty_latest(&mut self) -> bool {
        match self.latest_solve_id() {
            Some(id) => {
                self.store.cycle_penalty(id);
                self.refresh_stats();
                true
            }
            None => false,
        }
    }

    pub fn toggle_dnf_latest(&mut self) -> bool {
        match self.latest_solve_id() {
            Some(id) => {
                self.store.toggle_dnf(id);
                self.refresh_stats();
                true
            }
            None => false,
        }
    }

    pub fn delete_latest(&mut self) -> bool {
        match self.latest_solve_id() {
            Some(id) => {
                self.store.delete_solve(id);
                self.refresh_stats();
                true
            }
            None => false,
        }
    }

    pub fn clear_current_puzzle(&mut self) -> bool {
        if self.store.active().count_of(self.config.puzzle) == 0 {
            return false;
        }
        self.store.clear_all_of_type(self.config.puzzle);
        self.refresh_stats();
        true
    }

    pub fn next_session(&mut self) -> bool {
        if !self.timer.can_switch_puzzle() || self.store.sessions.len() < 2 {
            return false;
        }
        let idx = self
            .store
            .sessions
            .iter()
            .position(|s| s.id == self.store.active_session_id)
            .unwrap_or(0);
        let next = self.store.sessions[(idx + 1) % self.store.sessions.len()].id;
        self.store.switch_to(next);
        self.scramble = scramble::generate(self.config.puzzle);
        self.refresh_stats();
        true
    }

    pub fn begin_name_entry(&mut self, purpose: NamePurpose) {
        if !self.timer.is_idle() {
            return;
        }
        let buffer = match purpose {
            NamePurpose::NewSession => String::new(),
            NamePurpose::RenameSession => self.store.active().name.clone(),
        };
        self.state = AppState::NameEntry { purpose, buffer };
    }

    pub fn name_entry_push(&mut self, c: char) {
        if let AppState::NameEntry { buffer, .. } = &mut self.state {
            buffer.push(c);
        }
    }

    pub fn name_entry_backspace(&mut self) {
        if let AppState::NameEntry { buffer, .. } = &mut self.state {
            buffer.pop();
        }
    }

    /// Commit the pending name entry. An empty name cancels. Returns
    /// true when the store changed.
    pub fn commit_name_entry(&mut self) -> bool {
        let state = std::mem::replace(&mut self.state, AppState::Timing);
        let AppState::NameEntry { purpose, buffer } = state else {
            return false;
        };
        let name = buffer.trim().to_string();
        if name.is_empty() {
            return false;
        }
        match purpose {
            NamePurpose::NewSession => {
                self.store.create_session(name);
                self.scramble = scramble::generate(self.config.puzzle);
            }
            NamePurpose::RenameSession => self.store.rename_active(name),
        }
        self.refresh_stats();
        true
    }

    pub fn delete_session(&mut self) -> bool {
        if !self.timer.is_idle() {
            return false;
        }
        match self.store.delete_active() {
            Ok(()) => {
                self.scramble = scramble::generate(self.config.puzzle);
                self.refresh_stats();
                true
            }
            Err(err @ StoreError::LastSession) => {
                self.message = Some(err.to_string());
                false
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply(&mut config);

    let history = FileHistoryStore::new();
    let mut store = history.load();
    if let Some(name) = &cli.session {
        match store.sessions.iter().find(|s| s.name == *name).map(|s| s.id) {
            Some(id) => store.switch_to(id),
            None => {
                store.create_session(name.clone());
            }
        }
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let release_events = matches!(supports_keyboard_enhancement(), Ok(true));
    if release_events {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, store);
    app.release_events = release_events;
    let res = start_tui(&mut terminal, &mut app, &history, &config_store);

    if release_events {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    history: &dyn HistoryStore,
    config_store: &dyn ConfigStore,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                let now = Instant::now();
                let refreshing = app.timer.refresh_pending();
                if app.on_tick(now) {
                    let _ = history.save(&app.store);
                }
                // Redraw only while something on screen is moving.
                if !app.timer.is_idle() || refreshing || app.timer.refresh_pending() {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            AppEvent::Key(key) => {
                let now = Instant::now();
                if handle_key(app, key, now, history, config_store) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

fn handle_key(
    app: &mut App,
    key: KeyEvent,
    now: Instant,
    history: &dyn HistoryStore,
    config_store: &dyn ConfigStore,
) -> Flow {
    app.message = None;

    if matches!(app.state, AppState::NameEntry { .. }) {
        if key.kind == KeyEventKind::Release {
            return Flow::Continue;
        }
        match key.code {
            KeyCode::Esc => app.state = AppState::Timing,
            KeyCode::Enter => {
                if app.commit_name_entry() {
                    let _ = history.save(&app.store);
                }
            }
            KeyCode::Backspace => app.name_entry_backspace(),
            KeyCode::Char(c) => app.name_entry_push(c),
            _ => {}
        }
        return Flow::Continue;
    }

    if app.state == AppState::ConfirmClear {
        if key.kind == KeyEventKind::Release {
            return Flow::Continue;
        }
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Enter) && app.clear_current_puzzle() {
            let _ = history.save(&app.store);
        }
        app.state = AppState::Timing;
        return Flow::Continue;
    }

    // The spacebar is the timer input; both halves of the gesture
    // matter, so it is handled before the press-only gate below.
    if key.code == KeyCode::Char(' ') {
        match key.kind {
            KeyEventKind::Press => {
                if app.handle_edge(InputEdge::PressStart, now) {
                    let _ = history.save(&app.store);
                }
                if !app.release_events && app.timer.phase() == Phase::ArmedHold {
                    app.handle_edge(InputEdge::PressEnd, now);
                }
            }
            KeyEventKind::Release => {
                app.handle_edge(InputEdge::PressEnd, now);
            }
            KeyEventKind::Repeat => {}
        }
        return Flow::Continue;
    }

    if key.kind != KeyEventKind::Press {
        return Flow::Continue;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    match key.code {
        KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('2') => {
            if app.switch_puzzle(PuzzleType::TwoByTwo) {
                let _ = config_store.save(&app.config);
            }
        }
        KeyCode::Char('3') => {
            if app.switch_puzzle(PuzzleType::ThreeByThree) {
                let _ = config_store.save(&app.config);
            }
        }
        KeyCode::Char('4') => {
            if app.switch_puzzle(PuzzleType::FourByFour) {
                let _ = config_store.save(&app.config);
            }
        }
        KeyCode::Char('5') => {
            if app.switch_puzzle(PuzzleType::FiveByFive) {
                let _ = config_store.save(&app.config);
            }
        }
        KeyCode::Char('p') => {
            if app.switch_puzzle(PuzzleType::Pyraminx) {
                let _ = config_store.save(&app.config);
            }
        }
        KeyCode::Char('i') => {
            if app.toggle_inspection() {
                let _ = config_store.save(&app.config);
            }
        }
        KeyCode::Char('=') | KeyCode::Char('+') => {
            if app.cycle_penalty_latest() {
                let _ = history.save(&app.store);
            }
        }
        KeyCode::Char('f') => {
            if app.toggle_dnf_latest() {
                let _ = history.save(&app.store);
            }
        }
        KeyCode::Char('d') => {
            if app.delete_latest() {
                let _ = history.save(&app.store);
            }
        }
        KeyCode::Char('q') => {
            if app.store.active().count_of(app.config.puzzle) > 0 {
                app.state = AppState::ConfirmClear;
            }
        }
        KeyCode::Char('n') => app.begin_name_entry(NamePurpose::NewSession),
        KeyCode::Char('r') => app.begin_name_entry(NamePurpose::RenameSession),
        KeyCode::Char('w') => {
            if app.delete_session() {
                let _ = history.save(&app.store);
            }
        }
        KeyCode::Tab => {
            if app.next_session() {
                let _ = history.save(&app.store);
            }
        }
        _ => {}
    }

    Flow::Continue
}
