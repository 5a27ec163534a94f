use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::CellState;

// ============================================================================
// Catalog
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl TetrominoType {
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::J,
        TetrominoType::L,
        TetrominoType::O,
        TetrominoType::S,
        TetrominoType::T,
        TetrominoType::Z,
    ];

    /// Identity tag used in the numeric grid encoding (1..=7).
    pub fn tag(self) -> u8 {
        match self {
            TetrominoType::I => 1,
            TetrominoType::J => 2,
            TetrominoType::L => 3,
            TetrominoType::O => 4,
            TetrominoType::S => 5,
            TetrominoType::T => 6,
            TetrominoType::Z => 7,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1..=7 => Some(Self::ALL[tag as usize - 1]),
            _ => None,
        }
    }

    /// Canonical orientation. Other orientations are derived by rotation.
    pub fn shape(self) -> Shape {
        let layout: Vec<Vec<u8>> = match self {
            TetrominoType::I => vec![
                vec![0, 1, 0, 0],
                vec![0, 1, 0, 0],
                vec![0, 1, 0, 0],
                vec![0, 1, 0, 0],
            ],
            TetrominoType::J => vec![vec![0, 1, 0], vec![0, 1, 0], vec![1, 1, 0]],
            TetrominoType::L => vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 1]],
            TetrominoType::O => vec![vec![1, 1], vec![1, 1]],
            TetrominoType::S => vec![vec![0, 1, 1], vec![1, 1, 0], vec![0, 0, 0]],
            TetrominoType::T => vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 1, 0]],
            TetrominoType::Z => vec![vec![1, 1, 0], vec![0, 1, 1], vec![0, 0, 0]],
        };

        Shape::new(
            layout
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|bit| {
                            if bit == 0 {
                                CellState::Empty
                            } else {
                                CellState::Filled(self)
                            }
                        })
                        .collect()
                })
                .collect(),
        )
    }

    fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

// ============================================================================
// Shape Matrix
// ============================================================================

/// One rotation state of a tetromino, as a row-major cell matrix.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    cells: Vec<Vec<CellState>>,
}

impl Shape {
    pub fn new(cells: Vec<Vec<CellState>>) -> Self {
        Self { cells }
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Occupied cells as `(column, row)` offsets from the matrix origin.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_filled())
                .map(move |(x, _)| (to_coord(x), to_coord(y)))
        })
    }

    /// 90° clockwise: an N×M matrix becomes M×N with `out[i][j] = in[N-1-j][i]`.
    pub fn rotated_clockwise(&self) -> Self {
        let n = self.height();
        let m = self.width();
        let cells = (0..m)
            .map(|i| (0..n).map(|j| self.cells[n - 1 - j][i]).collect())
            .collect();
        Self { cells }
    }

    pub fn rotated_counter_clockwise(&self) -> Self {
        self.rotated_clockwise()
            .rotated_clockwise()
            .rotated_clockwise()
    }

    pub fn tags(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.tag()).collect())
            .collect()
    }
}

// ============================================================================
// Active Piece
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Grid index to signed coordinate. Indices past `i32::MAX` saturate; no allocatable
/// board gets there, and a saturated limit still compares correctly against positions.
pub fn to_coord(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tetromino {
    pub tetromino_type: TetrominoType,
    pub shape: Shape,
    pub position: Position,
}

impl Tetromino {
    /// Spawn position: top row, horizontally centered, rounding toward the left.
    pub fn spawn(tetromino_type: TetrominoType, cols: usize) -> Self {
        let shape = tetromino_type.shape();
        let x = to_coord(cols / 2) - to_coord(shape.width() / 2);
        Self {
            tetromino_type,
            shape,
            position: Position { x, y: 0 },
        }
    }

    pub fn new_at(tetromino_type: TetrominoType, x: i32, y: i32) -> Self {
        Self {
            tetromino_type,
            shape: tetromino_type.shape(),
            position: Position { x, y },
        }
    }

    /// Board coordinates of every occupied cell.
    pub fn blocks(&self) -> Vec<Position> {
        self.shape
            .occupied()
            .map(|(dx, dy)| Position {
                x: self.position.x + dx,
                y: self.position.y + dy,
            })
            .collect()
    }

    pub fn moved(&self, dx: i32, dy: i32) -> Self {
        Self {
            tetromino_type: self.tetromino_type,
            shape: self.shape.clone(),
            position: Position {
                x: self.position.x + dx,
                y: self.position.y + dy,
            },
        }
    }
}

// ============================================================================
// Lookahead Providers
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

/// Independent uniform draw per piece. Repeats and droughts are possible.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::random(&mut self.rng)
    }
}

/// Shuffled 7-bag: every kind appears once per seven draws.
pub struct BagPieceProvider {
    rng: StdRng,
    bag: [TetrominoType; 7],
    index: usize,
}

impl BagPieceProvider {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            bag: TetrominoType::ALL,
            index: TetrominoType::ALL.len(),
        }
    }

    pub fn new() -> Self {
        Self::seeded(rand::random())
    }
}

impl Default for BagPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for BagPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        if self.index >= self.bag.len() {
            self.bag = TetrominoType::ALL;
            self.bag.shuffle(&mut self.rng);
            self.index = 0;
        }
        let piece = self.bag[self.index];
        self.index += 1;
        piece
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
