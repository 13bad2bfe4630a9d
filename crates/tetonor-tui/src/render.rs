use crate::app::{App, Focus, ScreenState, GRID_COLUMNS, STRIP_COLUMNS};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io;
use tetonor_core::{CellKind, Clock, Difficulty, GameMode, GameView};

const CELL_WIDTH: usize = 9;
const STRIP_ITEM_WIDTH: usize = 6;

pub fn render<C: Clock>(stdout: &mut io::Stdout, app: &App<C>) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(stdout, Hide, SetBackgroundColor(app.theme.bg), Clear(ClearType::All))?;

    match app.screen_state {
        ScreenState::Playing => render_game_screen(stdout, app, term_width, term_height)?,
        ScreenState::GameOver | ScreenState::Won => {
            render_game_screen(stdout, app, term_width, term_height)?;
            render_endgame(stdout, app, term_width, term_height)?;
        }
        ScreenState::Leaderboard => {
            render_leaderboard_screen(stdout, app, term_width, term_height)?
        }
    }

    execute!(stdout, Show)?;
    Ok(())
}

fn render_game_screen<C: Clock>(
    stdout: &mut io::Stdout,
    app: &App<C>,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let view = app.game.view();

    let grid_width = (1 + (CELL_WIDTH + 1) * GRID_COLUMNS) as u16;
    let grid_rows = view.grid.len().div_ceil(GRID_COLUMNS) as u16;
    let grid_height = grid_rows * 2 + 1;
    let strip_width = (STRIP_ITEM_WIDTH + 1) * STRIP_COLUMNS;
    let strip_rows = view.strip.len().div_ceil(STRIP_COLUMNS) as u16;

    // Board + gap + info panel
    let board_width = grid_width.max(strip_width as u16);
    let total_width = board_width + 28;
    let start_x = if term_width > total_width {
        (term_width - total_width) / 2
    } else {
        1
    };
    let start_y = if term_height > grid_height + strip_rows + 12 {
        2
    } else {
        1
    };

    render_grid(stdout, app, &view, start_x, start_y)?;

    let strip_y = start_y + grid_height + 1;
    render_strip(stdout, app, &view, start_x, strip_y)?;

    let info_x = start_x + board_width + 4;
    render_info_panel(stdout, app, &view, info_x, start_y)?;

    let controls_y = strip_y + strip_rows + 2;
    render_controls(stdout, app, start_x, controls_y)?;

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    Ok(())
}

fn render_grid<C: Clock>(
    stdout: &mut io::Stdout,
    app: &App<C>,
    view: &GameView<'_>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let border = format!("+{}", format!("{}+", "-".repeat(CELL_WIDTH)).repeat(GRID_COLUMNS));

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.border),
        Print(&border)
    )?;

    for (row, cells) in view.grid.chunks(GRID_COLUMNS).enumerate() {
        let cell_y = y + 1 + row as u16 * 2;
        execute!(
            stdout,
            MoveTo(x, cell_y),
            SetForegroundColor(theme.border),
            Print("|")
        )?;

        for (col, cell) in cells.iter().enumerate() {
            let index = row * GRID_COLUMNS + col;
            let is_cursor = app.focus == Focus::Grid && index == app.grid_cursor;
            let is_target = view.selection.target == Some(index);

            let fg = if cell.solved {
                theme.solved
            } else {
                match cell.kind {
                    CellKind::Sum => theme.sum,
                    CellKind::Product => theme.product,
                }
            };
            let bg = if is_target {
                theme.selected_bg
            } else if is_cursor {
                theme.cursor_bg
            } else {
                theme.bg
            };
            let (open, close) = if is_cursor { ('[', ']') } else { (' ', ' ') };

            execute!(
                stdout,
                SetBackgroundColor(bg),
                SetForegroundColor(fg),
                Print(format!(
                    "{}{:>6}{}{}",
                    open,
                    cell.value,
                    cell.kind.symbol(),
                    close
                )),
                SetBackgroundColor(theme.bg),
                SetForegroundColor(theme.border),
                Print("|")
            )?;
        }

        execute!(
            stdout,
            MoveTo(x, cell_y + 1),
            SetForegroundColor(theme.border),
            Print(&border)
        )?;
    }

    Ok(())
}

fn render_strip<C: Clock>(
    stdout: &mut io::Stdout,
    app: &App<C>,
    view: &GameView<'_>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;

    for (row, items) in view.strip.chunks(STRIP_COLUMNS).enumerate() {
        execute!(stdout, MoveTo(x, y + row as u16))?;

        for (col, item) in items.iter().enumerate() {
            let index = row * STRIP_COLUMNS + col;
            let is_cursor = app.focus == Focus::Strip && index == app.strip_cursor;
            let is_selected = view.selection.contains_strip(index);

            let fg = if item.used { theme.used } else { theme.fg };
            let bg = if is_selected {
                theme.selected_bg
            } else if is_cursor {
                theme.cursor_bg
            } else {
                theme.bg
            };
            let (open, close) = if is_cursor { ('[', ']') } else { (' ', ' ') };

            execute!(
                stdout,
                SetBackgroundColor(bg),
                SetForegroundColor(fg),
                Print(format!("{}{:>4}{}", open, item.value, close)),
                SetBackgroundColor(theme.bg),
                Print(" ")
            )?;
        }
    }

    Ok(())
}

fn render_info_panel<C: Clock>(
    stdout: &mut io::Stdout,
    app: &App<C>,
    view: &GameView<'_>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let game = &app.game;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print("═══ TETONOR ═══")
    )?;

    let multiplier = game
        .config()
        .level(view.difficulty)
        .map(|l| l.multiplier)
        .unwrap_or(1);
    execute!(
        stdout,
        MoveTo(x, y + 2),
        SetForegroundColor(theme.info),
        Print(format!(
            "Level: {:>9}",
            format!("{} x{}", view.difficulty, multiplier)
        ))
    )?;

    let mode_color = if view.mode == GameMode::Pro {
        Color::Cyan
    } else {
        theme.fg
    };
    execute!(
        stdout,
        MoveTo(x, y + 3),
        SetForegroundColor(theme.info),
        Print("Mode: "),
        SetForegroundColor(mode_color),
        Print(format!("{:>10}", view.mode.to_string()))
    )?;

    execute!(
        stdout,
        MoveTo(x, y + 5),
        SetForegroundColor(theme.fg),
        Print(format!("Score: {:>9}", view.score))
    )?;

    let best = app
        .stats
        .best_score(view.difficulty)
        .map(|b| b.to_string())
        .unwrap_or_else(|| "-".to_string());
    execute!(
        stdout,
        MoveTo(x, y + 6),
        SetForegroundColor(theme.info),
        Print(format!("Best: {:>10}", best))
    )?;

    let mistakes_color = if view.mistakes + 1 >= view.max_mistakes {
        theme.error
    } else if view.mistakes > 0 {
        Color::Yellow
    } else {
        theme.info
    };
    execute!(
        stdout,
        MoveTo(x, y + 8),
        SetForegroundColor(mistakes_color),
        Print(format!(
            "Mistakes: {:>6}",
            format!("{}/{}", view.mistakes, view.max_mistakes)
        ))
    )?;

    let solved = view.grid.iter().filter(|c| c.solved).count();
    execute!(
        stdout,
        MoveTo(x, y + 9),
        SetForegroundColor(theme.info),
        Print(format!(
            "Solved: {:>8}",
            format!("{}/{}", solved, view.grid.len())
        ))
    )?;

    execute!(
        stdout,
        MoveTo(x, y + 11),
        SetForegroundColor(theme.border),
        Print("────────────────")
    )?;

    let picked: Vec<String> = view
        .selection
        .strip
        .iter()
        .filter_map(|&i| view.strip.get(i))
        .map(|s| s.value.to_string())
        .collect();
    execute!(
        stdout,
        MoveTo(x, y + 12),
        SetForegroundColor(theme.info),
        Print(format!("Picked: {:>8}", picked.join(" ")))
    )?;

    if view.mode == GameMode::Pro {
        let target = view
            .selection
            .target
            .and_then(|i| view.grid.get(i))
            .map(|c| format!("{}{}", c.value, c.kind.symbol()))
            .unwrap_or_else(|| "none".to_string());
        execute!(
            stdout,
            MoveTo(x, y + 13),
            SetForegroundColor(theme.info),
            Print(format!("Target: {:>8}", target))
        )?;
    }

    if view.adjudication_pending {
        execute!(
            stdout,
            MoveTo(x, y + 14),
            SetForegroundColor(theme.key),
            Print("Checking...")
        )?;
    }

    execute!(
        stdout,
        MoveTo(x, y + 16),
        SetForegroundColor(theme.border),
        Print(format!("Player: {}", app.stats.player_name)),
        MoveTo(x, y + 17),
        Print(format!("Seed: {}", app.seed)),
        MoveTo(x, y + 18),
        Print(format!("Theme: {}", theme.name))
    )?;

    Ok(())
}

fn render_controls<C: Clock>(
    stdout: &mut io::Stdout,
    app: &App<C>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;

    let controls = [
        ("hjkl/Arrows", "Move"),
        ("Tab", "Grid/Strip"),
        ("Enter", "Select"),
        ("n", "New game"),
        ("1/2/3", "Level"),
        ("p", "Pro mode"),
        ("b", "Leaderboard"),
        ("t", "Theme"),
        ("q", "Quit"),
    ];

    // Display in 3 columns
    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 3;
        let row = i % 3;
        let cx = x + (col as u16) * 24;
        let cy = y + row as u16;

        execute!(
            stdout,
            MoveTo(cx, cy),
            SetForegroundColor(theme.key),
            Print(format!("{:>11}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_message<C: Clock>(
    stdout: &mut io::Stdout,
    app: &App<C>,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.chars().count() as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

fn render_endgame<C: Clock>(
    stdout: &mut io::Stdout,
    app: &App<C>,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let game = &app.game;

    let (title, color) = if app.screen_state == ScreenState::Won {
        ("PUZZLE COMPLETE", theme.success)
    } else {
        ("GAME OVER", theme.error)
    };

    let mut lines = vec![
        title.to_string(),
        String::new(),
        format!("{} score: {}", game.difficulty(), game.score()),
    ];
    if app.screen_state == ScreenState::Won {
        if let Some(best) = app.stats.best_score(game.difficulty()) {
            lines.push(format!("Best: {}", best));
        }
    } else {
        lines.push("Your score is reset to zero.".to_string());
    }
    lines.push(String::new());
    lines.push("Enter: new game  b: rankings  q: quit".to_string());

    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 6;
    let height = lines.len() as u16 + 2;
    let x = term_width.saturating_sub(width as u16) / 2;
    let y = term_height.saturating_sub(height) / 2;

    execute!(
        stdout,
        SetBackgroundColor(theme.bg),
        SetForegroundColor(color),
        MoveTo(x, y),
        Print(format!("╔{}╗", "═".repeat(width - 2)))
    )?;
    for (i, line) in lines.iter().enumerate() {
        let fg = if i == 0 { color } else { theme.fg };
        execute!(
            stdout,
            MoveTo(x, y + 1 + i as u16),
            SetForegroundColor(color),
            Print("║"),
            SetForegroundColor(fg),
            Print(format!("{:^w$}", line, w = width - 2)),
            SetForegroundColor(color),
            Print("║")
        )?;
    }
    execute!(
        stdout,
        MoveTo(x, y + height - 1),
        Print(format!("╚{}╝", "═".repeat(width - 2)))
    )?;

    Ok(())
}

fn render_leaderboard_screen<C: Clock>(
    stdout: &mut io::Stdout,
    app: &App<C>,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;

    let title = "═══ RANKINGS ═══";
    let title_x = term_width.saturating_sub(title.chars().count() as u16) / 2;
    execute!(
        stdout,
        MoveTo(title_x, 1),
        SetForegroundColor(theme.key),
        Print(title)
    )?;

    // Level filter
    let diff_y = 3;
    execute!(
        stdout,
        MoveTo(4, diff_y),
        SetForegroundColor(theme.info),
        Print("◀ ")
    )?;
    for &level in Difficulty::all() {
        let color = if level == app.leaderboard_difficulty {
            theme.key
        } else {
            theme.border
        };
        execute!(
            stdout,
            SetForegroundColor(color),
            Print(format!(" {} ", level))
        )?;
    }
    execute!(stdout, SetForegroundColor(theme.info), Print(" ▶"))?;

    let header_y = diff_y + 2;
    execute!(
        stdout,
        MoveTo(4, header_y),
        SetForegroundColor(theme.fg),
        Print(format!("{:>4} {:>16} {:>8}", "Rank", "Player", "Score")),
        MoveTo(4, header_y + 1),
        SetForegroundColor(theme.border),
        Print("─".repeat(30))
    )?;

    match app.rankings.top(app.leaderboard_difficulty) {
        Ok(entries) if entries.is_empty() => {
            execute!(
                stdout,
                MoveTo(4, header_y + 3),
                SetForegroundColor(theme.border),
                Print("No scores yet. Finish a board!")
            )?;
        }
        Ok(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                let rank_color = match i {
                    0 => Color::Yellow, // Gold
                    1 => Color::Grey,   // Silver
                    2 => Color::Rgb {
                        r: 205,
                        g: 127,
                        b: 50,
                    }, // Bronze
                    _ => theme.info,
                };
                let name: String = entry.name.chars().take(16).collect();
                execute!(
                    stdout,
                    MoveTo(4, header_y + 2 + i as u16),
                    SetForegroundColor(rank_color),
                    Print(format!("{:>4}", i + 1)),
                    SetForegroundColor(theme.fg),
                    Print(format!(" {:>16}", name)),
                    SetForegroundColor(theme.key),
                    Print(format!(" {:>8}", entry.score))
                )?;
            }
        }
        Err(e) => {
            execute!(
                stdout,
                MoveTo(4, header_y + 3),
                SetForegroundColor(theme.error),
                Print(format!("Could not load rankings: {}", e))
            )?;
        }
    }

    let level_stats = app.stats.level(app.leaderboard_difficulty);
    execute!(
        stdout,
        MoveTo(40, header_y),
        SetForegroundColor(theme.fg),
        Print("Your games"),
        SetForegroundColor(theme.info),
        MoveTo(40, header_y + 2),
        Print(format!("Won:       {:>6}", level_stats.wins)),
        MoveTo(40, header_y + 3),
        Print(format!("Lost:      {:>6}", level_stats.losses)),
        MoveTo(40, header_y + 4),
        Print(format!("Abandoned: {:>6}", level_stats.abandoned)),
        MoveTo(40, header_y + 5),
        Print(format!("Win rate:  {:>5.0}%", level_stats.win_rate())),
        MoveTo(40, header_y + 6),
        Print(format!(
            "Best:      {:>6}",
            level_stats
                .best_score
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string())
        ))
    )?;

    let nav_y = term_height.saturating_sub(3);
    execute!(
        stdout,
        MoveTo(4, nav_y),
        SetForegroundColor(theme.border),
        Print("─".repeat(50)),
        MoveTo(4, nav_y + 1),
        SetForegroundColor(theme.key),
        Print("←/→"),
        SetForegroundColor(theme.info),
        Print(" Change level  "),
        SetForegroundColor(theme.key),
        Print("Esc"),
        SetForegroundColor(theme.info),
        Print(" Back")
    )?;

    Ok(())
}
