use serde::{Deserialize, Serialize};

use crate::board::{Board, GRID_HEIGHT, GRID_WIDTH};
use crate::collision::{collides, rotate_with_recovery, Rotation};
use crate::piece::{PieceProvider, RandomPieceProvider, Tetromino, TetrominoType};
use crate::scoring::Progress;
use crate::snapshot::GameSnapshot;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub cols: usize,
    pub rows: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: GRID_WIDTH,
            rows: GRID_HEIGHT,
        }
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Started,
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    Paused,
    Resumed,
    GameOver,
}

// ============================================================================
// Session
// ============================================================================

/// One game, owned by the host and driven by intents plus elapsed time.
///
/// Intents that do not apply to the current phase are ignored.
pub struct GameSession {
    board: Board,
    current_piece: Option<Tetromino>,
    next_piece: Option<TetrominoType>,
    progress: Progress,
    drop_counter_ms: u32,
    phase: Phase,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self::with_provider(config, Box::new(RandomPieceProvider::new()))
    }

    pub fn with_provider(config: GameConfig, provider: Box<dyn PieceProvider>) -> Self {
        Self::with_board(Board::new(config.cols, config.rows), provider)
    }

    /// Starts idle on a prepared board. `start` keeps the board as is.
    pub fn with_board(board: Board, provider: Box<dyn PieceProvider>) -> Self {
        Self {
            board,
            current_piece: None,
            next_piece: None,
            progress: Progress::new(),
            drop_counter_ms: 0,
            phase: Phase::Idle,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    pub fn start(&mut self) {
        match self.phase {
            Phase::Idle => {}
            Phase::GameOver => self.reset(),
            Phase::Running | Phase::Paused => return,
        }

        self.phase = Phase::Running;
        self.drop_counter_ms = 0;
        self.events.push(GameEvent::Started);
        self.spawn_next_piece();
    }

    fn reset(&mut self) {
        self.board.clear();
        self.current_piece = None;
        self.next_piece = None;
        self.progress = Progress::new();
        self.drop_counter_ms = 0;
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
            self.events.push(GameEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
            self.events.push(GameEvent::Resumed);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle | Phase::GameOver => {}
        }
    }

    /// Advances the gravity clock. Drops the piece one row once more than the
    /// current drop interval has accumulated. Time does not accumulate unless running.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.phase != Phase::Running {
            return;
        }

        self.drop_counter_ms = self.drop_counter_ms.saturating_add(elapsed_ms);
        if self.drop_counter_ms > self.progress.drop_interval_ms {
            self.soft_drop();
        }
    }

    // ------------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------------

    pub fn move_left(&mut self) -> bool {
        self.move_horizontal(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_horizontal(1)
    }

    pub fn move_horizontal(&mut self, dir: i32) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(piece) = &self.current_piece else {
            return false;
        };

        let moved = piece.moved(dir, 0);
        if collides(&self.board, &moved) {
            return false;
        }
        self.current_piece = Some(moved);
        self.events.push(GameEvent::PieceMoved);
        true
    }

    pub fn rotate(&mut self) -> bool {
        self.rotate_piece(Rotation::Clockwise)
    }

    pub fn rotate_counter_clockwise(&mut self) -> bool {
        self.rotate_piece(Rotation::CounterClockwise)
    }

    fn rotate_piece(&mut self, rotation: Rotation) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(piece) = self.current_piece.as_mut() else {
            return false;
        };

        let rotated = rotate_with_recovery(&self.board, piece, rotation);
        if rotated {
            self.events.push(GameEvent::PieceRotated);
        }
        rotated
    }

    /// Moves the piece down one row, or locks it if it cannot move.
    /// Returns whether the piece moved.
    pub fn soft_drop(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(piece) = &self.current_piece else {
            return false;
        };

        self.drop_counter_ms = 0;
        let moved = piece.moved(0, 1);
        if collides(&self.board, &moved) {
            self.lock_and_spawn();
            false
        } else {
            self.current_piece = Some(moved);
            self.events.push(GameEvent::PieceMoved);
            true
        }
    }

    pub fn hard_drop(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(piece) = self.current_piece.as_mut() else {
            return;
        };

        loop {
            let moved = piece.moved(0, 1);
            if collides(&self.board, &moved) {
                break;
            }
            *piece = moved;
        }
        self.drop_counter_ms = 0;
        self.lock_and_spawn();
    }

    // ------------------------------------------------------------------------
    // Lock / spawn
    // ------------------------------------------------------------------------

    fn lock_and_spawn(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };

        self.board.merge(&piece);
        self.events.push(GameEvent::PieceLocked);

        let lines = self.board.sweep();
        if lines > 0 {
            self.events.push(GameEvent::LinesCleared(lines));
            if let Some(level) = self.progress.record_clear(lines) {
                self.events.push(GameEvent::LevelUp(level));
            }
        }

        self.spawn_next_piece();
    }

    /// Promotes the lookahead to the active piece and draws a new lookahead.
    /// A collision at the spawn position ends the game.
    fn spawn_next_piece(&mut self) {
        let next_type = match self.next_piece.take() {
            Some(kind) => kind,
            None => self.piece_provider.next_piece(),
        };
        self.next_piece = Some(self.piece_provider.next_piece());

        let piece = Tetromino::spawn(next_type, self.board.cols());
        let blocked = collides(&self.board, &piece);
        self.current_piece = Some(piece);

        if blocked {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.tags(),
            active_piece_shape: self.current_piece.as_ref().map(|p| p.shape.tags()),
            active_piece_origin: self.current_piece.as_ref().map(|p| p.position),
            next_piece_kind: self.next_piece,
            score: self.progress.score,
            level: self.progress.level,
            lines_cleared: self.progress.lines_cleared,
            drop_interval_ms: self.progress.drop_interval_ms,
            phase: self.phase,
        }
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> Option<&Tetromino> {
        self.current_piece.as_ref()
    }

    pub fn next_piece(&self) -> Option<TetrominoType> {
        self.next_piece
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn level(&self) -> u32 {
        self.progress.level
    }

    pub fn lines_cleared(&self) -> u32 {
        self.progress.lines_cleared
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.progress.drop_interval_ms
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::board::CellState;
    use crate::piece::SequencePieceProvider;

    pub fn empty_board() -> Board {
        Board::new(GRID_WIDTH, GRID_HEIGHT)
    }

    pub fn fill_row(board: &mut Board, y: usize) {
        for x in 0..board.cols() {
            board.set(x, y, CellState::Filled(TetrominoType::T));
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, y: usize, gap_x: usize) {
        for x in 0..board.cols() {
            if x != gap_x {
                board.set(x, y, CellState::Filled(TetrominoType::T));
            }
        }
    }

    /// A session on `board` that deals `pieces` in order, cycling.
    pub fn session_with(board: Board, pieces: Vec<TetrominoType>) -> GameSession {
        GameSession::with_board(board, Box::new(SequencePieceProvider::new(pieces)))
    }

    /// Like `session_with`, already started.
    pub fn running_session(board: Board, pieces: Vec<TetrominoType>) -> GameSession {
        let mut game = session_with(board, pieces);
        game.start();
        game
    }
}
