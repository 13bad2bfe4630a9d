mod app;
mod leaderboard;
mod render;
mod stats;
mod theme;


use anyhow::Context;
use app::{App, AppSettings};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use leaderboard::FileRankingStore;
use stats::StatsManager;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tetonor_core::{Difficulty, GameConfig, GameMode, SystemClock};

/// Tetonor in the terminal: pair the numbers in the strip so their sums and
/// products fill the grid.
#[derive(Debug, Parser)]
#[command(name = "tetonor", version, about)]
struct Cli {
    /// Starting level: easy, medium or hard
    #[arg(short, long)]
    level: Option<Difficulty>,

    /// Start in pro mode (target a cell, then pick its two numbers)
    #[arg(long)]
    pro: bool,

    /// Player name used for rankings
    #[arg(short, long)]
    name: Option<String>,

    /// Seed for reproducible boards
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding the game configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for stats, rankings and the log file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep stats and rankings in memory only
    #[arg(long)]
    ephemeral: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir.clone() {
        Some(dir) => dir,
        None => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tetonor"),
    };
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;

    init_logging(&data_dir)?;

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    config.validate().context("invalid game configuration")?;

    let settings = AppSettings {
        config,
        difficulty: cli.level.unwrap_or(Difficulty::Easy),
        mode: if cli.pro {
            GameMode::Pro
        } else {
            GameMode::Standard
        },
        seed: cli.seed.unwrap_or_else(rand::random),
        player_name: cli.name,
    };

    let (stats, store) = if cli.ephemeral {
        (StatsManager::default(), FileRankingStore::in_memory())
    } else {
        (
            StatsManager::load(&data_dir.join("stats.json")),
            FileRankingStore::open(&data_dir.join("rankings.json")),
        )
    };
    let app = App::new(settings, SystemClock, stats, store).context("starting game")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run_app(&mut stdout, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    result.context("terminal error")
}

fn init_logging(data_dir: &std::path::Path) -> anyhow::Result<()> {
    let path = data_dir.join("tetonor.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config(path: &std::path::Path) -> anyhow::Result<GameConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    GameConfig::from_json(&json).with_context(|| format!("parsing config file {}", path.display()))
}

fn run_app(stdout: &mut io::Stdout, mut app: App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.tick_rate();

        render::render(stdout, &app)?;
        stdout.flush()?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    break;
                }

                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key) {
                        app::AppAction::Continue => {}
                        app::AppAction::Quit => break,
                    }
                }
            }
        }

        // Timers and the settle delay
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
