//! Placement checks and rotation with horizontal recovery.

use crate::board::Board;
use crate::piece::{to_coord, Shape, Tetromino};

/// True if any occupied cell of `piece` leaves the side walls, reaches the floor,
/// or lands on a settled cell. Cells above row 0 only check the walls.
pub fn collides(board: &Board, piece: &Tetromino) -> bool {
    let cols = to_coord(board.cols());
    let rows = to_coord(board.rows());

    piece.blocks().into_iter().any(|block| {
        if block.x < 0 || block.x >= cols || block.y >= rows {
            return true;
        }
        block.y >= 0 && board.get(block.x as usize, block.y as usize).is_filled()
    })
}

pub fn rotate_clockwise(shape: &Shape) -> Shape {
    shape.rotated_clockwise()
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// Rotates `piece` in place. If the rotated piece collides, shifts it sideways by
/// `+1, -2, +3, -4, …` until it fits. Steps are cumulative and limited to magnitude
/// `w`, the rotated shape's width, so the x positions tried after the original `x` are:
///
/// - `w = 2`: `x+1`, `x-1`
/// - `w = 3`: `x+1`, `x-1`, `x+2`
/// - `w = 4`: `x+1`, `x-1`, `x+2`, `x-2`
///
/// If none fits, the original piece is restored.
///
/// Returns whether the rotation was applied.
pub fn rotate_with_recovery(board: &Board, piece: &mut Tetromino, rotation: Rotation) -> bool {
    let mut candidate = piece.clone();
    candidate.shape = match rotation {
        Rotation::Clockwise => piece.shape.rotated_clockwise(),
        Rotation::CounterClockwise => piece.shape.rotated_counter_clockwise(),
    };

    let limit = to_coord(candidate.shape.width());
    let mut step: i32 = 1;

    while collides(board, &candidate) {
        if step.abs() > limit {
            return false;
        }
        candidate.position.x += step;
        step = -(step + step.signum());
    }

    *piece = candidate;
    true
}
