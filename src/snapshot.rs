use serde::{Deserialize, Serialize};

use crate::game::Phase;
use crate::piece::{to_coord, Position, TetrominoType};

/// Read-only view of a session, taken after any mutating call.
/// Grids use the numeric encoding: 0 is empty, 1..=7 the piece tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: Vec<Vec<u8>>,
    pub active_piece_shape: Option<Vec<Vec<u8>>>,
    pub active_piece_origin: Option<Position>,
    pub next_piece_kind: Option<TetrominoType>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub drop_interval_ms: u32,
    pub phase: Phase,
}

impl GameSnapshot {
    /// The board with the active piece drawn over it. Off-grid piece cells are skipped.
    pub fn composite(&self) -> Vec<Vec<u8>> {
        let mut grid = self.board.clone();

        if let (Some(shape), Some(origin)) = (&self.active_piece_shape, self.active_piece_origin)
        {
            for (dy, row) in shape.iter().enumerate() {
                for (dx, &tag) in row.iter().enumerate() {
                    if tag == 0 {
                        continue;
                    }
                    let x = origin.x + to_coord(dx);
                    let y = origin.y + to_coord(dy);
                    if y < 0 || x < 0 {
                        continue;
                    }
                    if let Some(cell) = grid
                        .get_mut(y as usize)
                        .and_then(|r| r.get_mut(x as usize))
                    {
                        *cell = tag;
                    }
                }
            }
        }

        grid
    }

    pub fn report(&self) -> ScoreReport {
        ScoreReport::from(self)
    }
}

/// What a host hands to its persistence or reporting collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
}

impl From<&GameSnapshot> for ScoreReport {
    fn from(snapshot: &GameSnapshot) -> Self {
        Self {
            score: snapshot.score,
            level: snapshot.level,
            lines_cleared: snapshot.lines_cleared,
            game_over: snapshot.phase == Phase::GameOver,
        }
    }
}
