//! Board module - manages the playfield grid
//!
//! The board is a 10x20 grid where each cell is empty or holds the kind that
//! was locked there. Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) with x in 0..10 (left to right), y in 0..20 (top to bottom).
//! Nothing outside the grid is ever addressed; out-of-range reads return `None`.

use crate::pieces::{occupies, BOX_SIZE};
use crate::session::ActivePiece;
use crate::types::{Cell, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// The playfield - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Row-major cells (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Cell at (x, y), or `None` when out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at (x, y). Returns false if out of bounds.
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Whether a piece with the given shape and rotation, with its box at
    /// `(x, y)`, would be out of bounds or overlap a filled cell.
    ///
    /// Occupied cells above the top edge (negative y) are allowed so that
    /// pieces can spawn partially off-grid. Pure: no hidden state.
    pub fn collides(&self, kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> bool {
        for ly in 0..BOX_SIZE {
            for lx in 0..BOX_SIZE {
                if !occupies(kind, rotation, lx, ly) {
                    continue;
                }
                let bx = x + lx;
                let by = y + ly;
                if bx < 0 || bx >= BOARD_WIDTH as i8 || by >= BOARD_HEIGHT as i8 {
                    return true;
                }
                if by >= 0 && self.is_occupied(bx, by) {
                    return true;
                }
            }
        }
        false
    }

    /// Copy every occupied, in-bounds cell of `piece` into the grid.
    ///
    /// Cells still above the top edge are dropped. Callers confirm
    /// `!collides(..)` at the piece's position first.
    pub fn lock(&mut self, piece: &ActivePiece) {
        for ly in 0..BOX_SIZE {
            for lx in 0..BOX_SIZE {
                if occupies(piece.kind, piece.rotation, lx, ly) {
                    self.set(piece.x + lx, piece.y + ly, Some(piece.kind));
                }
            }
        }
    }

    /// Remove one row and shift everything above it down by one.
    /// The top row becomes empty.
    fn collapse_row(&mut self, y: usize) {
        let width = BOARD_WIDTH as usize;
        for row in (1..=y).rev() {
            let src_start = (row - 1) * width;
            self.cells
                .copy_within(src_start..src_start + width, row * width);
        }
        for cell in &mut self.cells[..width] {
            *cell = None;
        }
    }

    /// Remove every full row, scanning bottom to top, and return how many
    /// were removed.
    ///
    /// After a collapse the same row index is examined again, since the row
    /// that slid into it may be full as well.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = BOARD_HEIGHT as usize;
        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.collapse_row(row);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }

    /// Write the grid as color indices (0 = empty, 1-7 = kind) for rendering
    pub fn write_u8_grid(&self, out: &mut [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) {
        let width = BOARD_WIDTH as usize;
        for (y, row) in out.iter_mut().enumerate() {
            let start = y * width;
            for (x, dst) in row.iter_mut().enumerate() {
                *dst = self.cells[start + x].map_or(0, PieceKind::color_index);
            }
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [None; BOARD_SIZE];
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row_except(board: &mut Board, y: i8, gap: Option<i8>) {
        for x in 0..BOARD_WIDTH as i8 {
            if Some(x) != gap {
                board.set(x, y, Some(PieceKind::O));
            }
        }
    }

    #[test]
    fn test_board_new() {
        let board = Board::new();
        assert_eq!(board.width(), 10);
        assert_eq!(board.height(), 20);
        assert!(board.cells().iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_get_set_bounds() {
        let mut board = Board::new();
        assert!(board.set(0, 0, Some(PieceKind::T)));
        assert_eq!(board.get(0, 0), Some(Some(PieceKind::T)));
        assert!(!board.set(-1, 0, Some(PieceKind::T)));
        assert!(!board.set(10, 0, Some(PieceKind::T)));
        assert!(!board.set(0, 20, Some(PieceKind::T)));
        assert_eq!(board.get(0, -1), None);
    }

    #[test]
    fn collides_with_walls_and_floor() {
        let board = Board::new();
        // I north occupies local row 1, columns 0..4
        assert!(!board.collides(PieceKind::I, Rotation::North, 0, 0));
        assert!(board.collides(PieceKind::I, Rotation::North, -1, 0));
        assert!(board.collides(PieceKind::I, Rotation::North, 7, 0));
        assert!(!board.collides(PieceKind::I, Rotation::North, 6, 0));
        assert!(!board.collides(PieceKind::I, Rotation::North, 0, 18));
        assert!(board.collides(PieceKind::I, Rotation::North, 0, 19));
    }

    #[test]
    fn cells_above_top_do_not_collide() {
        let board = Board::new();
        assert!(!board.collides(PieceKind::I, Rotation::East, 3, -3));
        assert!(!board.collides(PieceKind::O, Rotation::North, 4, -2));
    }

    #[test]
    fn collides_with_filled_cell() {
        let mut board = Board::new();
        board.set(4, 5, Some(PieceKind::Z));
        // O north occupies (0,0),(1,0),(0,1),(1,1)
        assert!(board.collides(PieceKind::O, Rotation::North, 3, 4));
        assert!(!board.collides(PieceKind::O, Rotation::North, 5, 4));
    }

    #[test]
    fn lock_skips_cells_above_grid() {
        let mut board = Board::new();
        let piece = ActivePiece {
            kind: PieceKind::I,
            rotation: Rotation::East,
            x: 0,
            y: -2,
        };
        board.lock(&piece);
        let filled = board.cells().iter().filter(|c| c.is_some()).count();
        assert_eq!(filled, 2);
        assert!(board.is_occupied(2, 0));
        assert!(board.is_occupied(2, 1));
    }

    #[test]
    fn clear_single_row_shifts_above() {
        let mut board = Board::new();
        fill_row_except(&mut board, 19, None);
        board.set(3, 18, Some(PieceKind::L));
        assert_eq!(board.clear_full_rows(), 1);
        assert_eq!(board.get(3, 19), Some(Some(PieceKind::L)));
        assert!(!board.is_row_full(19));
        assert!((0..10).all(|x| board.get(x, 0) == Some(None)));
    }

    #[test]
    fn clear_adjacent_rows_rechecks_index() {
        let mut board = Board::new();
        fill_row_except(&mut board, 18, None);
        fill_row_except(&mut board, 19, None);
        board.set(0, 17, Some(PieceKind::J));
        assert_eq!(board.clear_full_rows(), 2);
        assert_eq!(board.get(0, 19), Some(Some(PieceKind::J)));
        assert_eq!(board.cells().iter().filter(|c| c.is_some()).count(), 1);
    }

    #[test]
    fn partial_row_is_kept() {
        let mut board = Board::new();
        fill_row_except(&mut board, 19, Some(9));
        assert_eq!(board.clear_full_rows(), 0);
        assert!(board.is_occupied(0, 19));
    }

    #[test]
    fn write_u8_grid_uses_color_indices() {
        let mut board = Board::new();
        board.set(1, 2, Some(PieceKind::L));
        let mut grid = [[0u8; 10]; 20];
        board.write_u8_grid(&mut grid);
        assert_eq!(grid[2][1], 7);
        assert_eq!(grid[0][0], 0);
    }
}
