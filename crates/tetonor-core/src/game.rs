use crate::clock::{Clock, SystemClock};
use crate::config::{Difficulty, GameConfig};
use crate::error::GameError;
use crate::generator::{GenerationReport, Generator};
use crate::puzzle::{sorted, CellKind, GridCell, Puzzle, StripItem};
use crate::scheduler::{Scheduler, TaskId};
use crate::scoring::ScoreKind;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// How the player solves cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Pick two strip numbers; their sum and product cells are solved together
    #[default]
    Standard,
    /// Pick a target cell first, then two strip numbers for that cell alone
    Pro,
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::Standard => write!(f, "Standard"),
            GameMode::Pro => write!(f, "Pro"),
        }
    }
}

/// Where the round is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    /// Too many mistakes; waiting for acknowledgement before a fresh board
    GameOver,
    /// Every cell solved
    Won,
}

/// Input from the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    StripClicked(usize),
    GridClicked(usize),
    NewGame,
    DifficultyChanged(Difficulty),
    ModeChanged(GameMode),
    Acknowledge,
}

/// Why an input had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    StripItemUsed,
    SelectionFull,
    CellSolved,
    TargetRequired,
    NotProMode,
    RoundOver,
    NothingToAcknowledge,
}

/// What happened as a result of an event or a deferred adjudication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Selected(usize),
    Deselected(usize),
    TargetSelected(usize),
    TargetCleared(usize),
    Ignored(IgnoreReason),
    AdjudicationScheduled,
    AdjudicationCancelled,
    /// Intended pair found; both cells solved
    Matched { points: u32 },
    /// Pro mode: the target cell was solved
    CellSolved { points: u32 },
    /// A ghost solution seen for the first time this round
    ExtraSolution { points: u32 },
    ExtraAlreadyFound,
    Mismatch { mistakes: u32, remaining: u32 },
    GameOver,
    RoundComplete { level: Difficulty, score: u32 },
    NewRound {
        level: Difficulty,
        report: GenerationReport,
    },
}

/// Strip picks and, in pro mode, the target cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected strip indices in click order, at most two
    pub strip: Vec<usize>,
    pub target: Option<usize>,
}

impl Selection {
    pub fn clear(&mut self) {
        self.strip.clear();
        self.target = None;
    }

    pub fn contains_strip(&self, index: usize) -> bool {
        self.strip.contains(&index)
    }
}

/// Per-round counters
#[derive(Debug, Clone)]
pub struct RoundState {
    /// Cells solved so far
    pub pairs_found: usize,
    pub score: u32,
    pub mistakes: u32,
    /// Start of the interval scored by the next adjudication
    pub timer_start: Instant,
    /// `"min-max"` keys of ghost solutions already rewarded
    pub found_extra_solutions: HashSet<String>,
}

impl RoundState {
    fn new(now: Instant) -> Self {
        Self {
            pairs_found: 0,
            score: 0,
            mistakes: 0,
            timer_start: now,
            found_extra_solutions: HashSet::new(),
        }
    }
}

/// Read-only snapshot for rendering
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub grid: &'a [GridCell],
    pub strip: &'a [StripItem],
    pub selection: &'a Selection,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub phase: Phase,
    pub score: u32,
    pub mistakes: u32,
    pub max_mistakes: u32,
    pub pairs_found: usize,
    pub adjudication_pending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Adjudicate,
}

/// The game engine: one board, one round and the player's selection
pub struct Game<C: Clock = SystemClock> {
    config: GameConfig,
    generator: Generator,
    clock: C,
    difficulty: Difficulty,
    mode: GameMode,
    phase: Phase,
    puzzle: Puzzle,
    report: GenerationReport,
    round: RoundState,
    selection: Selection,
    scheduler: Scheduler<Task>,
    pending: Option<TaskId>,
}

impl Game<SystemClock> {
    /// Create a new game on the wall clock with a fresh random generator
    pub fn new(difficulty: Difficulty, mode: GameMode) -> Result<Self, GameError> {
        Self::with_parts(Generator::new(), SystemClock, difficulty, mode)
    }
}

impl<C: Clock> Game<C> {
    /// Create a game from an existing generator and clock, generating the first board
    pub fn with_parts(
        mut generator: Generator,
        clock: C,
        difficulty: Difficulty,
        mode: GameMode,
    ) -> Result<Self, GameError> {
        let generated = generator.generate(difficulty)?;
        Ok(Self::with_puzzle(
            generator,
            clock,
            difficulty,
            mode,
            generated.puzzle,
            generated.report,
        ))
    }

    /// Create a game around a board that was built elsewhere
    pub fn with_puzzle(
        generator: Generator,
        clock: C,
        difficulty: Difficulty,
        mode: GameMode,
        puzzle: Puzzle,
        report: GenerationReport,
    ) -> Self {
        let now = clock.now();
        Self {
            config: generator.config().clone(),
            generator,
            clock,
            difficulty,
            mode,
            phase: Phase::Playing,
            puzzle,
            report,
            round: RoundState::new(now),
            selection: Selection::default(),
            scheduler: Scheduler::new(),
            pending: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn report(&self) -> GenerationReport {
        self.report
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn score(&self) -> u32 {
        self.round.score
    }

    pub fn mistakes(&self) -> u32 {
        self.round.mistakes
    }

    /// Whether an adjudication is waiting for its settle delay
    pub fn is_adjudication_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    pub fn view(&self) -> GameView<'_> {
        GameView {
            grid: &self.puzzle.grid,
            strip: &self.puzzle.strip,
            selection: &self.selection,
            difficulty: self.difficulty,
            mode: self.mode,
            phase: self.phase,
            score: self.round.score,
            mistakes: self.round.mistakes,
            max_mistakes: self.config.max_mistakes,
            pairs_found: self.round.pairs_found,
            adjudication_pending: self.is_adjudication_pending(),
        }
    }

    /// Apply one input event
    pub fn handle(&mut self, event: GameEvent) -> Result<Vec<Notice>, GameError> {
        match event {
            GameEvent::StripClicked(index) => self.on_strip_clicked(index),
            GameEvent::GridClicked(index) => self.on_grid_clicked(index),
            GameEvent::NewGame => self.new_round(self.difficulty),
            GameEvent::DifficultyChanged(level) => self.new_round(level),
            GameEvent::ModeChanged(mode) => {
                let previous = self.mode;
                self.mode = mode;
                self.new_round(self.difficulty).inspect_err(|_| {
                    self.mode = previous;
                })
            }
            GameEvent::Acknowledge => match self.phase {
                Phase::GameOver | Phase::Won => self.new_round(self.difficulty),
                Phase::Playing => Ok(vec![Notice::Ignored(IgnoreReason::NothingToAcknowledge)]),
            },
        }
    }

    /// Run deferred work whose settle delay has passed
    pub fn poll(&mut self) -> Vec<Notice> {
        let due = self.scheduler.take_due(self.clock.now());
        self.run_tasks(due)
    }

    /// Run all deferred work now, ignoring the settle delay
    pub fn flush(&mut self) -> Vec<Notice> {
        let due = self.scheduler.drain();
        self.run_tasks(due)
    }

    /// Time left before the pending adjudication runs
    pub fn time_until_due(&self) -> Option<Duration> {
        self.scheduler
            .next_due()
            .map(|due| due.saturating_duration_since(self.clock.now()))
    }

    /// Generate a fresh board and reset the round.
    ///
    /// On failure the current board and level are kept.
    fn new_round(&mut self, difficulty: Difficulty) -> Result<Vec<Notice>, GameError> {
        let generated = self.generator.generate(difficulty)?;

        self.cancel_pending();
        self.difficulty = difficulty;
        self.puzzle = generated.puzzle;
        self.report = generated.report;
        self.round = RoundState::new(self.clock.now());
        self.selection.clear();
        self.phase = Phase::Playing;

        Ok(vec![Notice::NewRound {
            level: difficulty,
            report: generated.report,
        }])
    }

    fn on_strip_clicked(&mut self, index: usize) -> Result<Vec<Notice>, GameError> {
        if self.phase != Phase::Playing {
            return Ok(vec![Notice::Ignored(IgnoreReason::RoundOver)]);
        }
        let item = self
            .puzzle
            .strip
            .get(index)
            .ok_or(GameError::StripIndexOutOfRange(index))?;

        if self.mode == GameMode::Pro && self.selection.target.is_none() {
            return Ok(vec![Notice::Ignored(IgnoreReason::TargetRequired)]);
        }
        if item.used {
            return Ok(vec![Notice::Ignored(IgnoreReason::StripItemUsed)]);
        }

        let mut notices = Vec::new();
        if let Some(pos) = self.selection.strip.iter().position(|&i| i == index) {
            self.selection.strip.remove(pos);
            notices.push(Notice::Deselected(index));
            if self.cancel_pending() {
                notices.push(Notice::AdjudicationCancelled);
            }
        } else if self.selection.strip.len() < 2 {
            self.selection.strip.push(index);
            notices.push(Notice::Selected(index));
            if self.selection.strip.len() == 2 {
                self.schedule_adjudication();
                notices.push(Notice::AdjudicationScheduled);
            }
        } else {
            notices.push(Notice::Ignored(IgnoreReason::SelectionFull));
        }
        Ok(notices)
    }

    fn on_grid_clicked(&mut self, index: usize) -> Result<Vec<Notice>, GameError> {
        if self.phase != Phase::Playing {
            return Ok(vec![Notice::Ignored(IgnoreReason::RoundOver)]);
        }
        if self.mode != GameMode::Pro {
            return Ok(vec![Notice::Ignored(IgnoreReason::NotProMode)]);
        }
        let cell = self
            .puzzle
            .grid
            .get(index)
            .ok_or(GameError::GridIndexOutOfRange(index))?;
        if cell.solved {
            return Ok(vec![Notice::Ignored(IgnoreReason::CellSolved)]);
        }

        let mut notices = Vec::new();
        // The strip picks belong to the old target once they are being adjudicated
        if self.cancel_pending() {
            self.selection.strip.clear();
            notices.push(Notice::AdjudicationCancelled);
        }

        if self.selection.target == Some(index) {
            self.selection.clear();
            notices.push(Notice::TargetCleared(index));
        } else {
            self.selection.target = Some(index);
            notices.push(Notice::TargetSelected(index));
        }
        Ok(notices)
    }

    fn schedule_adjudication(&mut self) {
        let due = self.clock.now() + Duration::from_millis(self.config.settle_delay_ms);
        let (id, _token) = self.scheduler.schedule(Task::Adjudicate, due);
        self.pending = Some(id);
    }

    /// Cancel the pending adjudication, if any
    fn cancel_pending(&mut self) -> bool {
        let cancelled = match self.pending.take() {
            Some(id) => self.scheduler.cancel(id),
            None => false,
        };
        self.scheduler.clear();
        cancelled
    }

    fn run_tasks(&mut self, tasks: Vec<Task>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for task in tasks {
            match task {
                Task::Adjudicate => {
                    self.pending = None;
                    notices.extend(self.adjudicate());
                }
            }
        }
        notices
    }

    fn adjudicate(&mut self) -> Vec<Notice> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        let (first, second) = match self.selection.strip[..] {
            [first, second] => (first, second),
            _ => return Vec::new(),
        };

        match self.mode {
            GameMode::Standard => self.adjudicate_standard(first, second),
            GameMode::Pro => self.adjudicate_pro(first, second),
        }
    }

    fn adjudicate_standard(&mut self, first: usize, second: usize) -> Vec<Notice> {
        let x = self.puzzle.strip[first].value;
        let y = self.puzzle.strip[second].value;
        let (lo, hi) = sorted(x, y);
        let pair_hash = format!("{}-{}", lo, hi);

        let sum_matches = self.unsolved_matching(CellKind::Sum, x + y);
        let product_matches = self.unsolved_matching(CellKind::Product, x * y);
        debug!(
            "Selected {} and {}: sum {} ({} cells), product {} ({} cells)",
            x,
            y,
            x + y,
            sum_matches.len(),
            x * y,
            product_matches.len()
        );

        if sum_matches.is_empty() || product_matches.is_empty() {
            return self.register_mistake();
        }

        let intended = sum_matches.iter().find_map(|&s| {
            let sum_cell = &self.puzzle.grid[s];
            if !sum_cell.is_solution(x, y) {
                return None;
            }
            product_matches
                .iter()
                .find(|&&p| self.puzzle.grid[p].pair_id == sum_cell.pair_id)
                .map(|&p| (s, p))
        });

        self.selection.clear();

        match intended {
            Some((sum_index, product_index)) => {
                debug!("Intended pair {}-{} found", lo, hi);
                self.puzzle.grid[sum_index].solved = true;
                self.puzzle.grid[product_index].solved = true;
                self.puzzle.strip[first].used = true;
                self.puzzle.strip[second].used = true;
                self.round.pairs_found += 2;

                let points = self.award(ScoreKind::Normal);
                let mut notices = vec![Notice::Matched { points }];
                notices.extend(self.check_win());
                notices
            }
            None if self.round.found_extra_solutions.insert(pair_hash) => {
                debug!("Extra solution {}-{} found", lo, hi);
                let points = self.award(ScoreKind::Ghost);
                vec![Notice::ExtraSolution { points }]
            }
            None => vec![Notice::ExtraAlreadyFound],
        }
    }

    fn adjudicate_pro(&mut self, first: usize, second: usize) -> Vec<Notice> {
        let Some(target) = self.selection.target else {
            self.selection.clear();
            return Vec::new();
        };
        let x = self.puzzle.strip[first].value;
        let y = self.puzzle.strip[second].value;
        let cell = &self.puzzle.grid[target];
        let result = cell.kind.apply(x, y);
        debug!(
            "Target {} ({:?}): {} {} {} = {}",
            cell.value,
            cell.kind,
            x,
            cell.kind.symbol(),
            y,
            result
        );

        if cell.solved || result != cell.value {
            return self.register_mistake();
        }

        self.puzzle.grid[target].solved = true;
        let sibling_solved = self
            .puzzle
            .sibling_of(target)
            .is_some_and(|s| self.puzzle.grid[s].solved);
        if sibling_solved {
            // Retire the pair's own numbers; the picked ones may belong elsewhere
            let pair_id = self.puzzle.grid[target].pair_id;
            for item in self.puzzle.strip.iter_mut().filter(|s| s.pair_id == pair_id) {
                item.used = true;
            }
        }
        self.round.pairs_found += 1;
        self.selection.clear();

        let points = self.award(ScoreKind::Normal);
        let mut notices = vec![Notice::CellSolved { points }];
        notices.extend(self.check_win());
        notices
    }

    fn unsolved_matching(&self, kind: CellKind, value: u32) -> Vec<usize> {
        self.puzzle
            .grid
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.solved && c.kind == kind && c.value == value)
            .map(|(i, _)| i)
            .collect()
    }

    /// Score the interval since the last award and restart the timer
    fn award(&mut self, kind: ScoreKind) -> u32 {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.round.timer_start);
        self.round.timer_start = now;

        let multiplier = self
            .config
            .level(self.difficulty)
            .map(|l| l.multiplier)
            .unwrap_or(1);
        let points = self.config.scoring.score(kind, elapsed, multiplier);
        self.round.score += points;
        points
    }

    fn register_mistake(&mut self) -> Vec<Notice> {
        self.round.mistakes += 1;
        self.selection.clear();

        let max = self.config.max_mistakes;
        let mistakes = self.round.mistakes;
        let mut notices = vec![Notice::Mismatch {
            mistakes,
            remaining: max.saturating_sub(mistakes),
        }];
        if mistakes >= max {
            self.phase = Phase::GameOver;
            notices.push(Notice::GameOver);
        }
        notices
    }

    fn check_win(&mut self) -> Option<Notice> {
        if !self.puzzle.is_solved() {
            return None;
        }
        self.phase = Phase::Won;
        self.cancel_pending();
        Some(Notice::RoundComplete {
            level: self.difficulty,
            score: self.round.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::puzzle::Pair;

    /// Board with a known ghost: 2 and 6 give sum 8 (pair 0) and product 12 (pair 1).
    ///
    /// Grid: 0 = 8+, 1 = 15×, 2 = 7+, 3 = 12×, 4 = 12+, 5 = 20×, 6 = 7+, 7 = 6×
    /// Strip: 0 = 3, 1 = 5, 2 = 3, 3 = 4, 4 = 2, 5 = 10, 6 = 6, 7 = 1
    fn ghost_board() -> Puzzle {
        Puzzle::from_pairs(&[
            Pair::new(3, 5, 0),
            Pair::new(3, 4, 1),
            Pair::new(2, 10, 2),
            Pair::new(6, 1, 3),
        ])
    }

    fn game_with(mode: GameMode) -> (Game<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let report = GenerationReport {
            attempts: 1,
            clean: false,
        };
        let game = Game::with_puzzle(
            Generator::with_seed(11),
            clock.clone(),
            Difficulty::Easy,
            mode,
            ghost_board(),
            report,
        );
        (game, clock)
    }

    fn pick(game: &mut Game<ManualClock>, a: usize, b: usize) -> Vec<Notice> {
        game.handle(GameEvent::StripClicked(a)).unwrap();
        game.handle(GameEvent::StripClicked(b)).unwrap();
        game.flush()
    }

    #[test]
    fn test_intended_match_solves_both_cells() {
        let (mut game, _) = game_with(GameMode::Standard);
        let notices = pick(&mut game, 2, 3);

        assert_eq!(notices, vec![Notice::Matched { points: 150 }]);
        assert!(game.puzzle().grid[2].solved);
        assert!(game.puzzle().grid[3].solved);
        assert!(!game.puzzle().grid[6].solved);
        assert!(game.puzzle().strip[2].used);
        assert!(game.puzzle().strip[3].used);
        assert_eq!(game.round().pairs_found, 2);
        assert_eq!(game.score(), 150);
        assert!(game.selection().strip.is_empty());
    }

    #[test]
    fn test_full_playthrough_wins() {
        let (mut game, _) = game_with(GameMode::Standard);
        pick(&mut game, 0, 1);
        pick(&mut game, 2, 3);
        pick(&mut game, 4, 5);
        let notices = pick(&mut game, 6, 7);

        assert_eq!(
            notices,
            vec![
                Notice::Matched { points: 150 },
                Notice::RoundComplete {
                    level: Difficulty::Easy,
                    score: 600
                }
            ]
        );
        assert_eq!(game.phase(), Phase::Won);
        assert!(game.puzzle().is_solved());
        assert_eq!(game.round().pairs_found, 8);
        assert_eq!(
            game.handle(GameEvent::StripClicked(0)).unwrap(),
            vec![Notice::Ignored(IgnoreReason::RoundOver)]
        );
    }

    #[test]
    fn test_generated_board_playthrough() {
        let clock = ManualClock::new();
        let mut game = Game::with_parts(
            Generator::with_seed(2024),
            clock,
            Difficulty::Medium,
            GameMode::Standard,
        )
        .unwrap();

        let pair_ids: Vec<u32> = game.puzzle().grid.iter().map(|c| c.pair_id).collect();
        let mut done = HashSet::new();
        let mut last = Vec::new();
        for pair_id in pair_ids {
            if !done.insert(pair_id) {
                continue;
            }
            let picks: Vec<usize> = game
                .puzzle()
                .strip
                .iter()
                .enumerate()
                .filter(|(_, s)| s.pair_id == pair_id)
                .map(|(i, _)| i)
                .collect();
            last = pick(&mut game, picks[0], picks[1]);
            assert!(matches!(last[0], Notice::Matched { .. }));
        }

        assert!(game.puzzle().is_solved());
        assert_eq!(game.phase(), Phase::Won);
        assert!(matches!(last.last(), Some(Notice::RoundComplete { .. })));
    }

    #[test]
    fn test_ghost_rewarded_once() {
        let (mut game, _) = game_with(GameMode::Standard);

        assert_eq!(pick(&mut game, 4, 6), vec![Notice::ExtraSolution { points: 50 }]);
        assert_eq!(game.score(), 50);
        assert!(!game.puzzle().strip[4].used);
        assert!(!game.puzzle().strip[6].used);
        assert_eq!(game.puzzle().solved_count(), 0);

        // Same values in the other order hash the same
        assert_eq!(pick(&mut game, 6, 4), vec![Notice::ExtraAlreadyFound]);
        assert_eq!(game.score(), 50);
        assert_eq!(game.mistakes(), 0);
        assert!(game.round().found_extra_solutions.contains("2-6"));
    }

    #[test]
    fn test_sum_without_product_is_mistake() {
        let (mut game, _) = game_with(GameMode::Standard);
        // 5 + 2 = 7 is on the board, 5 * 2 = 10 is not
        assert_eq!(
            pick(&mut game, 1, 4),
            vec![Notice::Mismatch {
                mistakes: 1,
                remaining: 2
            }]
        );
        assert!(game.selection().strip.is_empty());
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_three_mistakes_restart_with_zero_score() {
        let (mut game, _) = game_with(GameMode::Standard);
        pick(&mut game, 0, 1);
        assert_eq!(game.score(), 150);

        pick(&mut game, 2, 4);
        pick(&mut game, 2, 4);
        let notices = pick(&mut game, 2, 4);
        assert_eq!(
            notices,
            vec![
                Notice::Mismatch {
                    mistakes: 3,
                    remaining: 0
                },
                Notice::GameOver
            ]
        );
        assert_eq!(game.phase(), Phase::GameOver);

        let notices = game.handle(GameEvent::Acknowledge).unwrap();
        assert!(matches!(notices[0], Notice::NewRound { .. }));
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.mistakes(), 0);
        assert_eq!(game.puzzle().grid.len(), 16);
        assert_eq!(game.puzzle().solved_count(), 0);
    }

    #[test]
    fn test_used_and_full_selection_ignored() {
        let (mut game, _) = game_with(GameMode::Standard);
        pick(&mut game, 2, 3);

        assert_eq!(
            game.handle(GameEvent::StripClicked(2)).unwrap(),
            vec![Notice::Ignored(IgnoreReason::StripItemUsed)]
        );

        game.handle(GameEvent::StripClicked(0)).unwrap();
        game.handle(GameEvent::StripClicked(1)).unwrap();
        assert_eq!(
            game.handle(GameEvent::StripClicked(5)).unwrap(),
            vec![Notice::Ignored(IgnoreReason::SelectionFull)]
        );
        assert_eq!(
            game.handle(GameEvent::StripClicked(99)),
            Err(GameError::StripIndexOutOfRange(99))
        );
    }

    #[test]
    fn test_deselect_cancels_pending_adjudication() {
        let (mut game, _) = game_with(GameMode::Standard);
        game.handle(GameEvent::StripClicked(0)).unwrap();
        assert_eq!(
            game.handle(GameEvent::StripClicked(1)).unwrap(),
            vec![Notice::Selected(1), Notice::AdjudicationScheduled]
        );
        assert!(game.is_adjudication_pending());

        assert_eq!(
            game.handle(GameEvent::StripClicked(1)).unwrap(),
            vec![Notice::Deselected(1), Notice::AdjudicationCancelled]
        );
        assert!(!game.is_adjudication_pending());
        assert!(game.flush().is_empty());
        assert_eq!(game.selection().strip, vec![0]);
        assert_eq!(game.puzzle().solved_count(), 0);
    }

    #[test]
    fn test_settle_delay_gates_adjudication() {
        let (mut game, clock) = game_with(GameMode::Standard);
        game.handle(GameEvent::StripClicked(0)).unwrap();
        game.handle(GameEvent::StripClicked(1)).unwrap();

        assert!(game.poll().is_empty());
        clock.advance(Duration::from_millis(299));
        assert!(game.poll().is_empty());
        assert_eq!(game.time_until_due(), Some(Duration::from_millis(1)));

        clock.advance(Duration::from_millis(1));
        assert!(matches!(game.poll()[..], [Notice::Matched { .. }]));
    }

    #[test]
    fn test_elapsed_time_scored_between_adjudications() {
        let (mut game, clock) = game_with(GameMode::Standard);
        clock.advance(Duration::from_secs(30));
        assert_eq!(pick(&mut game, 0, 1), vec![Notice::Matched { points: 100 }]);

        clock.advance(Duration::from_secs(10));
        assert_eq!(pick(&mut game, 2, 3), vec![Notice::Matched { points: 130 }]);
        assert_eq!(game.score(), 230);
    }

    #[test]
    fn test_grid_click_needs_pro_mode() {
        let (mut game, _) = game_with(GameMode::Standard);
        assert_eq!(
            game.handle(GameEvent::GridClicked(0)).unwrap(),
            vec![Notice::Ignored(IgnoreReason::NotProMode)]
        );
    }

    #[test]
    fn test_pro_requires_target() {
        let (mut game, _) = game_with(GameMode::Pro);
        assert_eq!(
            game.handle(GameEvent::StripClicked(0)).unwrap(),
            vec![Notice::Ignored(IgnoreReason::TargetRequired)]
        );

        assert_eq!(
            game.handle(GameEvent::GridClicked(2)).unwrap(),
            vec![Notice::TargetSelected(2)]
        );
        assert_eq!(
            game.handle(GameEvent::GridClicked(2)).unwrap(),
            vec![Notice::TargetCleared(2)]
        );
        assert_eq!(game.selection().target, None);
    }

    #[test]
    fn test_pro_consumes_numbers_after_both_halves() {
        let (mut game, _) = game_with(GameMode::Pro);

        game.handle(GameEvent::GridClicked(2)).unwrap();
        assert_eq!(pick(&mut game, 2, 3), vec![Notice::CellSolved { points: 150 }]);
        assert!(game.puzzle().grid[2].solved);
        assert!(!game.puzzle().strip[2].used);
        assert_eq!(game.round().pairs_found, 1);
        assert_eq!(game.selection(), &Selection::default());

        game.handle(GameEvent::GridClicked(3)).unwrap();
        assert_eq!(pick(&mut game, 2, 3), vec![Notice::CellSolved { points: 150 }]);
        assert!(game.puzzle().strip[2].used);
        assert!(game.puzzle().strip[3].used);
        assert_eq!(game.round().pairs_found, 2);

        assert_eq!(
            game.handle(GameEvent::GridClicked(3)).unwrap(),
            vec![Notice::Ignored(IgnoreReason::CellSolved)]
        );
    }

    #[test]
    fn test_pro_accepts_any_numbers_that_fit() {
        let (mut game, _) = game_with(GameMode::Pro);
        // 5 + 2 = 7 solves pair 3's sum cell
        game.handle(GameEvent::GridClicked(6)).unwrap();
        assert_eq!(pick(&mut game, 1, 4), vec![Notice::CellSolved { points: 150 }]);
        assert!(game.puzzle().grid[6].solved);
    }

    /// Every used strip item belongs to a pair whose two cells are solved
    fn assert_used_items_retired(puzzle: &Puzzle) {
        for item in puzzle.strip.iter().filter(|s| s.used) {
            assert!(
                puzzle
                    .grid
                    .iter()
                    .filter(|c| c.pair_id == item.pair_id)
                    .all(|c| c.solved),
                "used strip item {} belongs to unsolved pair {}",
                item.value,
                item.pair_id
            );
        }
    }

    #[test]
    fn test_pro_cross_pair_solve_retires_own_pair() {
        // Grid: 0 = 8+, 1 = 12x, 2 = 7+, 3 = 12x. Strip: 0 = 2, 1 = 6, 2 = 3, 3 = 4
        let puzzle = Puzzle::from_pairs(&[Pair::new(2, 6, 0), Pair::new(3, 4, 1)]);
        assert!(crate::conflict::find_conflicts(&puzzle.strip, &puzzle.grid).is_empty());
        let report = GenerationReport {
            attempts: 1,
            clean: true,
        };
        let mut game = Game::with_puzzle(
            Generator::with_seed(11),
            ManualClock::new(),
            Difficulty::Easy,
            GameMode::Pro,
            puzzle,
            report,
        );

        game.handle(GameEvent::GridClicked(0)).unwrap();
        assert_eq!(pick(&mut game, 0, 1), vec![Notice::CellSolved { points: 150 }]);

        // 3 x 4 fills pair 0's product cell
        game.handle(GameEvent::GridClicked(1)).unwrap();
        assert_eq!(pick(&mut game, 2, 3), vec![Notice::CellSolved { points: 150 }]);
        assert!(game.puzzle().strip[0].used);
        assert!(game.puzzle().strip[1].used);
        assert!(!game.puzzle().strip[2].used);
        assert!(!game.puzzle().strip[3].used);
        assert_used_items_retired(game.puzzle());

        game.handle(GameEvent::GridClicked(2)).unwrap();
        assert_eq!(pick(&mut game, 2, 3), vec![Notice::CellSolved { points: 150 }]);
        assert_used_items_retired(game.puzzle());

        game.handle(GameEvent::GridClicked(3)).unwrap();
        assert_eq!(
            pick(&mut game, 2, 3),
            vec![
                Notice::CellSolved { points: 150 },
                Notice::RoundComplete {
                    level: Difficulty::Easy,
                    score: 600
                }
            ]
        );
        assert!(game.puzzle().strip.iter().all(|s| s.used));
        assert_eq!(game.phase(), Phase::Won);
    }

    #[test]
    fn test_pro_mismatch_clears_target() {
        let (mut game, _) = game_with(GameMode::Pro);
        game.handle(GameEvent::GridClicked(0)).unwrap();
        assert_eq!(
            pick(&mut game, 7, 4),
            vec![Notice::Mismatch {
                mistakes: 1,
                remaining: 2
            }]
        );
        assert_eq!(game.selection(), &Selection::default());
        assert!(!game.puzzle().grid[0].solved);
    }

    #[test]
    fn test_pro_retarget_cancels_pending() {
        let (mut game, _) = game_with(GameMode::Pro);
        game.handle(GameEvent::GridClicked(0)).unwrap();
        game.handle(GameEvent::StripClicked(0)).unwrap();
        game.handle(GameEvent::StripClicked(1)).unwrap();

        assert_eq!(
            game.handle(GameEvent::GridClicked(4)).unwrap(),
            vec![Notice::AdjudicationCancelled, Notice::TargetSelected(4)]
        );
        assert!(game.selection().strip.is_empty());
        assert!(game.flush().is_empty());
    }

    #[test]
    fn test_mode_and_difficulty_change_start_new_round() {
        let (mut game, _) = game_with(GameMode::Standard);
        pick(&mut game, 0, 1);

        let notices = game.handle(GameEvent::ModeChanged(GameMode::Pro)).unwrap();
        assert!(matches!(notices[..], [Notice::NewRound { .. }]));
        assert_eq!(game.mode(), GameMode::Pro);
        assert_eq!(game.score(), 0);

        game.handle(GameEvent::DifficultyChanged(Difficulty::Hard))
            .unwrap();
        assert_eq!(game.difficulty(), Difficulty::Hard);
        let max = game.config().level(Difficulty::Hard).unwrap().max;
        assert!(game.puzzle().strip.iter().all(|s| s.value <= max));
    }

    #[test]
    fn test_failed_generation_keeps_current_round() {
        let mut config = GameConfig::default();
        config.levels.remove(&Difficulty::Hard);
        let clock = ManualClock::new();
        let mut game = Game::with_parts(
            Generator::seeded(config, 1),
            clock,
            Difficulty::Easy,
            GameMode::Standard,
        )
        .unwrap();
        let before = game.puzzle().clone();

        assert_eq!(
            game.handle(GameEvent::DifficultyChanged(Difficulty::Hard)),
            Err(GameError::UnknownLevel("hard".to_string()))
        );
        assert_eq!(game.difficulty(), Difficulty::Easy);
        assert_eq!(game.puzzle(), &before);
    }

    #[test]
    fn test_acknowledge_while_playing_is_ignored() {
        let (mut game, _) = game_with(GameMode::Standard);
        assert_eq!(
            game.handle(GameEvent::Acknowledge).unwrap(),
            vec![Notice::Ignored(IgnoreReason::NothingToAcknowledge)]
        );
    }
}
