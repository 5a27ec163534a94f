use crate::piece::{Tetromino, TetrominoType};

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellState {
    Empty,
    Filled(TetrominoType),
}

impl CellState {
    pub fn is_filled(self) -> bool {
        self != CellState::Empty
    }

    /// 0 for empty, otherwise the piece identity tag.
    pub fn tag(self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Filled(t) => t.tag(),
        }
    }
}

/// Fixed-size grid of settled cells. Row 0 is the top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    cols: usize,
    rows: usize,
    cells: Vec<Vec<CellState>>,
}

impl Board {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![vec![CellState::Empty; cols]; rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[Vec<CellState>] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> CellState {
        self.cells[y][x]
    }

    pub fn set(&mut self, x: usize, y: usize, cell: CellState) {
        self.cells[y][x] = cell;
    }

    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(CellState::Empty);
        }
    }

    /// Writes the piece's occupied cells into the grid. Cells above row 0 are dropped.
    pub fn merge(&mut self, piece: &Tetromino) {
        let cell = CellState::Filled(piece.tetromino_type);
        for block in piece.blocks() {
            if block.y < 0 || block.x < 0 {
                continue;
            }
            let (x, y) = (block.x as usize, block.y as usize);
            if x < self.cols && y < self.rows {
                self.cells[y][x] = cell;
            }
        }
    }

    /// Removes every full row, bottom to top, inserting an empty row at the top for each.
    /// Returns the number of rows removed.
    pub fn sweep(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = self.rows;

        while y > 0 {
            if self.is_row_complete(y - 1) {
                self.cells.remove(y - 1);
                self.cells.insert(0, vec![CellState::Empty; self.cols]);
                cleared += 1;
                // Re-check the same index: the row above has shifted into it
            } else {
                y -= 1;
            }
        }

        cleared
    }

    pub fn is_row_complete(&self, y: usize) -> bool {
        let row = &self.cells[y];
        !row.is_empty() && row.iter().all(|cell| cell.is_filled())
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.cells[y].iter().filter(|cell| cell.is_filled()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_filled())
            .count()
    }

    pub fn tags(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.tag()).collect())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}
