use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    time::{Duration, Instant},
};

use tetris::game::{GameConfig, GameSession, Phase};
use tetris::piece::{BagPieceProvider, PieceProvider, RandomPieceProvider, TetrominoType};
use tetris::snapshot::GameSnapshot;

// ============================================================================
// Command Line
// ============================================================================

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PieceRule {
    /// Independent uniform draw per piece
    Uniform,
    /// Shuffled bag of all seven pieces
    Bag7,
}

#[derive(Parser, Debug)]
#[command(name = "tetris", about = "Falling-block puzzle in the terminal")]
struct Args {
    /// Board width in cells
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(4..=40))]
    cols: u16,

    /// Board height in cells
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(4..=60))]
    rows: u16,

    /// RNG seed (optional)
    #[arg(long)]
    seed: Option<u64>,

    /// How the next piece is chosen
    #[arg(long, value_enum, default_value_t = PieceRule::Uniform)]
    piece_rule: PieceRule,

    /// Print the final score report as JSON on exit
    #[arg(long)]
    report: bool,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const FRAME_MS: u64 = 16;

fn tag_color(tag: u8) -> Color {
    match TetrominoType::from_tag(tag) {
        Some(TetrominoType::I) => Color::Cyan,
        Some(TetrominoType::J) => Color::Blue,
        Some(TetrominoType::L) => Color::Rgb(255, 165, 0),
        Some(TetrominoType::O) => Color::Yellow,
        Some(TetrominoType::S) => Color::Green,
        Some(TetrominoType::T) => Color::Magenta,
        Some(TetrominoType::Z) => Color::Red,
        None => Color::Reset,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, snapshot: &GameSnapshot) {
    let area = frame.size();
    render_game(frame, snapshot, area);

    match snapshot.phase {
        Phase::Running => {}
        Phase::Idle => render_popup(
            frame,
            area,
            " Tetris ",
            vec![
                Line::from(""),
                Line::from(Span::styled("READY", Style::default().fg(Color::Green))),
                Line::from(""),
                hint("Press Enter to start"),
                hint("Press ESC to quit"),
            ],
        ),
        Phase::Paused => render_popup(
            frame,
            area,
            " Paused ",
            vec![
                Line::from(""),
                Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
                Line::from(""),
                hint("Press P to continue"),
                hint("Press ESC to quit"),
            ],
        ),
        Phase::GameOver => render_popup(
            frame,
            area,
            " Game Over ",
            vec![
                Line::from(""),
                Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
                Line::from(""),
                Line::from(format!("Score: {}", snapshot.score)),
                Line::from(format!("Lines: {}", snapshot.lines_cleared)),
                Line::from(format!("Level: {}", snapshot.level)),
                Line::from(""),
                hint("Enter: play again"),
                hint("ESC: quit"),
            ],
        ),
    }
}

fn hint(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

fn render_game(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let cols = snapshot.board.first().map_or(0, Vec::len) as u16;
    let rows = snapshot.board.len() as u16;

    let grid_display_width = cols * CELL_WIDTH + 2;
    let grid_display_height = rows + 2;
    let preview_width = 12;
    let info_width = 14;
    let total_width = grid_display_width + preview_width + info_width + 4;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Next][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(preview_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, snapshot, horizontal[0]);
    render_preview(frame, snapshot, horizontal[1]);
    render_info(frame, snapshot, horizontal[2]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↑/X: Rotate | Z: Rotate back | ↓: Drop | Space: Hard drop | P: Pause",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn tag_rows(grid: &[Vec<u8>]) -> Vec<Line<'static>> {
    grid.iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&tag| {
                    if tag == 0 {
                        Span::raw(EMPTY_CHAR)
                    } else {
                        Span::styled(BLOCK_CHAR, Style::default().fg(tag_color(tag)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn render_grid(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(tag_rows(&snapshot.composite()));
    frame.render_widget(paragraph, inner);
}

fn render_preview(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(kind) = snapshot.next_piece_kind else {
        return;
    };

    // Drop empty rows so the preview sits at the top of the panel
    let shape: Vec<Vec<u8>> = kind
        .shape()
        .tags()
        .into_iter()
        .filter(|row| row.iter().any(|&tag| tag != 0))
        .collect();

    let mut lines = vec![Line::from("")];
    lines.extend(tag_rows(&shape).into_iter().map(|line| {
        let mut spans = vec![Span::raw(" ")];
        spans.extend(line.spans);
        Line::from(spans)
    }));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", snapshot.score)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", snapshot.lines_cleared)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", snapshot.level)),
        Line::from(""),
        Line::from(Span::styled("Drop", Style::default().fg(Color::Magenta))),
        Line::from(format!("{} ms", snapshot.drop_interval_ms)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, text: Vec<Line>) {
    let height = text.len() as u16 + 2;
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, height, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

/// Returns `false` when the player asked to quit.
fn handle_key(game: &mut GameSession, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return false,
        KeyCode::Enter => game.start(),
        KeyCode::Char('p') | KeyCode::Char('P') => game.toggle_pause(),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
            game.move_left();
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            game.move_right();
        }
        KeyCode::Up | KeyCode::Char('x') | KeyCode::Char('X') => {
            game.rotate();
        }
        KeyCode::Char('z') | KeyCode::Char('Z') => {
            game.rotate_counter_clockwise();
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
            game.soft_drop();
        }
        KeyCode::Char(' ') => game.hard_drop(),
        _ => {}
    }
    true
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, game: &mut GameSession) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_MS);
    let mut last_frame = Instant::now();

    loop {
        let snapshot = game.snapshot();
        terminal.draw(|frame| render(frame, &snapshot))?;

        let timeout = frame_duration
            .checked_sub(last_frame.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(game, key.code) {
                    return Ok(());
                }
            }
        }

        let elapsed = last_frame.elapsed();
        if elapsed >= frame_duration {
            game.tick(u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX));
            last_frame = Instant::now();
        }

        // The UI redraws from snapshots only, so the event log is just drained
        game.take_events();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    let provider: Box<dyn PieceProvider> = match args.piece_rule {
        PieceRule::Uniform => Box::new(RandomPieceProvider::seeded(seed)),
        PieceRule::Bag7 => Box::new(BagPieceProvider::seeded(seed)),
    };
    let config = GameConfig {
        cols: args.cols as usize,
        rows: args.rows as usize,
    };
    let mut game = GameSession::with_provider(config, provider);

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .context("failed to create terminal")
        .and_then(|mut terminal| run(&mut terminal, &mut game));

    // Restore the terminal whatever happened in the loop; the loop's error wins
    let restored = disable_raw_mode()
        .and_then(|()| stdout().execute(LeaveAlternateScreen).map(|_| ()))
        .context("failed to restore terminal");
    result?;
    restored?;

    if args.report {
        let report = game.snapshot().report();
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}
