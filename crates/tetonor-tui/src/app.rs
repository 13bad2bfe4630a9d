use crate::leaderboard::FileRankingStore;
use crate::stats::{GameResult, StatsManager};
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use log::{info, warn};
use std::time::Duration;
use tetonor_core::{
    Clock, Difficulty, Game, GameConfig, GameError, GameEvent, GameMode, Generator, IgnoreReason,
    Notice, Phase, RankingApi, SubmitOutcome, SystemClock,
};

/// Grid columns on screen
pub const GRID_COLUMNS: usize = 4;
/// Strip numbers per row on screen
pub const STRIP_COLUMNS: usize = 8;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Normal gameplay
    Playing,
    /// Too many mistakes, waiting for Enter
    GameOver,
    /// Board completed
    Won,
    /// Rankings screen
    Leaderboard,
}

/// Which part of the board the cursor is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Strip,
    Grid,
}

/// Startup options resolved from the command line and config file
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub config: GameConfig,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub seed: u64,
    pub player_name: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            config: GameConfig::default(),
            difficulty: Difficulty::Easy,
            mode: GameMode::Standard,
            seed: 0,
            player_name: None,
        }
    }
}

/// The main application state
pub struct App<C: Clock = SystemClock> {
    /// Current game
    pub game: Game<C>,
    /// Which area the cursor moves in
    pub focus: Focus,
    /// Cursor position in the grid
    pub grid_cursor: usize,
    /// Cursor position in the strip
    pub strip_cursor: usize,
    /// Color theme
    pub theme: Theme,
    /// Message to display
    pub message: Option<String>,
    /// Message timer
    message_timer: u32,
    /// Current screen state
    pub screen_state: ScreenState,
    /// Local statistics
    pub stats: StatsManager,
    /// Score rankings
    pub rankings: RankingApi<FileRankingStore>,
    /// Selected level for the leaderboard screen
    pub leaderboard_difficulty: Difficulty,
    /// Seed the generator was started with
    pub seed: u64,
    /// Whether the current round has been recorded (to avoid double recording)
    round_recorded: bool,
}

impl<C: Clock> App<C> {
    /// Create the app and generate the first board
    pub fn new(
        settings: AppSettings,
        clock: C,
        mut stats: StatsManager,
        store: FileRankingStore,
    ) -> Result<Self, GameError> {
        if let Some(name) = settings.player_name {
            stats.player_name = name;
        }

        let generator = Generator::seeded(settings.config, settings.seed);
        let game = Game::with_parts(generator, clock, settings.difficulty, settings.mode)?;
        info!(
            "Started {} {} game with seed {}",
            game.mode(),
            game.difficulty(),
            settings.seed
        );

        Ok(Self {
            game,
            focus: Focus::Strip,
            grid_cursor: 0,
            strip_cursor: 0,
            theme: Theme::dark(),
            message: None,
            message_timer: 0,
            screen_state: ScreenState::Playing,
            stats,
            rankings: RankingApi::new(store),
            leaderboard_difficulty: settings.difficulty,
            seed: settings.seed,
            round_recorded: false,
        })
    }

    /// Poll interval for the event loop
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(50)
    }

    /// Update timers and run due adjudications (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        let notices = self.game.poll();
        self.apply_notices(notices);
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 60; // ~3 seconds at 50ms ticks
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::GameOver | ScreenState::Won => self.handle_endgame_key(key),
            ScreenState::Leaderboard => self.handle_leaderboard_key(key),
            ScreenState::Playing => self.handle_game_key(key),
        }
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            // Quit - record abandoned round if in progress
            KeyCode::Char('q') => {
                self.abandon_round();
                return AppAction::Quit;
            }

            // Navigation
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Strip => Focus::Grid,
                    Focus::Grid => Focus::Strip,
                };
            }

            // Select under cursor
            KeyCode::Enter | KeyCode::Char(' ') => {
                let event = match self.focus {
                    Focus::Strip => GameEvent::StripClicked(self.strip_cursor),
                    Focus::Grid => GameEvent::GridClicked(self.grid_cursor),
                };
                self.dispatch(event);
            }

            KeyCode::Char('n') => {
                self.abandon_round();
                self.dispatch(GameEvent::NewGame);
            }
            KeyCode::Char(c @ '1'..='3') => {
                let level = match c {
                    '1' => Difficulty::Easy,
                    '2' => Difficulty::Medium,
                    _ => Difficulty::Hard,
                };
                self.abandon_round();
                self.dispatch(GameEvent::DifficultyChanged(level));
            }
            KeyCode::Char('p') => {
                let mode = match self.game.mode() {
                    GameMode::Standard => GameMode::Pro,
                    GameMode::Pro => GameMode::Standard,
                };
                self.abandon_round();
                self.dispatch(GameEvent::ModeChanged(mode));
                if self.game.mode() == GameMode::Pro {
                    self.focus = Focus::Grid;
                }
            }

            KeyCode::Char('b') => {
                self.leaderboard_difficulty = self.game.difficulty();
                self.screen_state = ScreenState::Leaderboard;
            }
            KeyCode::Char('t') => {
                self.theme = self.theme.next();
                let name = self.theme.name;
                self.show_message(&format!("{} theme", name));
            }

            _ => {}
        }

        AppAction::Continue
    }

    fn handle_endgame_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => {
                self.dispatch(GameEvent::Acknowledge);
            }
            KeyCode::Char('b') => {
                self.leaderboard_difficulty = self.game.difficulty();
                self.screen_state = ScreenState::Leaderboard;
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_leaderboard_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('b') => {
                self.screen_state = self.screen_for_phase();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.leaderboard_difficulty = self.leaderboard_difficulty.prev();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.leaderboard_difficulty = self.leaderboard_difficulty.next();
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn screen_for_phase(&self) -> ScreenState {
        match self.game.phase() {
            Phase::Playing => ScreenState::Playing,
            Phase::GameOver => ScreenState::GameOver,
            Phase::Won => ScreenState::Won,
        }
    }

    /// Send an event to the game and react to what it reports
    pub fn dispatch(&mut self, event: GameEvent) {
        match self.game.handle(event) {
            Ok(notices) => self.apply_notices(notices),
            Err(e) => {
                warn!("{:?} failed: {}", event, e);
                self.show_message(&format!("Error: {}", e));
            }
        }
    }

    fn apply_notices(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Selected(_)
                | Notice::Deselected(_)
                | Notice::TargetCleared(_)
                | Notice::AdjudicationScheduled
                | Notice::AdjudicationCancelled => {}
                Notice::TargetSelected(index) => {
                    if let Some(cell) = self.game.puzzle().grid.get(index) {
                        let msg = format!("Target {}{}", cell.value, cell.kind.symbol());
                        self.show_message(&msg);
                    }
                }
                Notice::Ignored(reason) => {
                    if let Some(msg) = ignore_message(reason) {
                        self.show_message(msg);
                    }
                }
                Notice::Matched { points } => self.show_message(&format!("Match! +{}", points)),
                Notice::CellSolved { points } => {
                    self.show_message(&format!("Solved! +{}", points))
                }
                Notice::ExtraSolution { points } => {
                    self.show_message(&format!("Extra solution! +{}", points))
                }
                Notice::ExtraAlreadyFound => self.show_message("Extra solution already found"),
                Notice::Mismatch { remaining, .. } => {
                    self.show_message(&format!(
                        "No match! {} {} left",
                        remaining,
                        if remaining == 1 { "chance" } else { "chances" }
                    ));
                }
                Notice::GameOver => {
                    self.record_round(GameResult::Loss);
                    self.screen_state = ScreenState::GameOver;
                }
                Notice::RoundComplete { level, score } => {
                    self.record_round(GameResult::Win);
                    self.screen_state = ScreenState::Won;
                    info!("Completed {} board with score {}", level, score);
                }
                Notice::NewRound { level, report } => {
                    self.round_recorded = false;
                    self.screen_state = ScreenState::Playing;
                    self.grid_cursor = 0;
                    self.strip_cursor = 0;
                    if report.clean {
                        self.show_message(&format!("New {} game", level));
                    } else {
                        self.show_message(&format!(
                            "New {} game (extra solutions possible)",
                            level
                        ));
                    }
                }
            }
        }
    }

    /// Record an unfinished round that has seen any play
    fn abandon_round(&mut self) {
        let round = self.game.round();
        let started = round.pairs_found > 0 || round.mistakes > 0 || round.score > 0;
        if self.game.phase() == Phase::Playing && started {
            self.record_round(GameResult::Abandoned);
        }
    }

    /// Record the current round to stats, submitting new local bests to the rankings
    fn record_round(&mut self, result: GameResult) {
        if self.round_recorded {
            return;
        }
        self.round_recorded = true;

        let level = self.game.difficulty();
        let score = self.game.score();
        let new_best = self.stats.record(level, result, score);

        if result == GameResult::Win && new_best {
            let name = self.stats.player_name.clone();
            match self.rankings.submit(&name, score, level) {
                Ok(SubmitOutcome::Kept { .. }) => {
                    info!("Ranking for {} on {} kept previous score", name, level)
                }
                Ok(_) => info!("Submitted {} on {} for {}", score, level, name),
                Err(e) => {
                    warn!("Failed to submit score: {}", e);
                    self.show_message("Could not save ranking");
                }
            }
        }

        if let Err(e) = self.stats.save() {
            warn!("Failed to save stats: {}", e);
        }
    }

    fn move_cursor(&mut self, row_delta: i32, col_delta: i32) {
        let (cursor, columns, len) = match self.focus {
            Focus::Grid => (
                &mut self.grid_cursor,
                GRID_COLUMNS,
                self.game.puzzle().grid.len(),
            ),
            Focus::Strip => (
                &mut self.strip_cursor,
                STRIP_COLUMNS,
                self.game.puzzle().strip.len(),
            ),
        };
        if len == 0 {
            return;
        }
        let rows = len.div_ceil(columns);

        let row = (*cursor / columns) as i32 + row_delta;
        let col = (*cursor % columns) as i32 + col_delta;
        let row = row.clamp(0, rows as i32 - 1) as usize;
        let col = col.clamp(0, columns as i32 - 1) as usize;
        *cursor = (row * columns + col).min(len - 1);
    }
}

fn ignore_message(reason: IgnoreReason) -> Option<&'static str> {
    match reason {
        IgnoreReason::StripItemUsed => Some("That number is already used"),
        IgnoreReason::SelectionFull => Some("Two numbers already selected"),
        IgnoreReason::CellSolved => Some("That cell is already solved"),
        IgnoreReason::TargetRequired => Some("Pick a target cell first (Tab)"),
        IgnoreReason::NotProMode => Some("Targeting cells needs pro mode (p)"),
        IgnoreReason::RoundOver | IgnoreReason::NothingToAcknowledge => None,
    }
}
