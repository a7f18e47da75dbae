//! Pieces module - tetromino geometry
//!
//! Every shape/rotation pair is a 16-bit occupancy mask over a 4x4 box,
//! row-major with bit 15 at local (0, 0). The table is immutable static data;
//! all access goes through the bounds-checked [`occupies`].

use crate::types::{PieceKind, Rotation};

/// Local offset of one occupied cell inside the 4x4 box
pub type MinoOffset = (i8, i8);

/// The four occupied cells of a piece, in row-major order
pub type PieceShape = [MinoOffset; 4];

/// Side length of the bounding box
pub const BOX_SIZE: i8 = 4;

/// Occupancy masks indexed by `[shape_id][rotation]`
pub static TETROMINOES: [[u16; 4]; 7] = [
    // I
    [0x0F00, 0x2222, 0x00F0, 0x4444],
    // O
    [0xCC00, 0xCC00, 0xCC00, 0xCC00],
    // T
    [0x0E40, 0x4C40, 0x4E00, 0x4640],
    // S
    [0x06C0, 0x8C40, 0x6C00, 0x4620],
    // Z
    [0x0C60, 0x4C80, 0xC600, 0x2640],
    // J
    [0x0E80, 0xC440, 0x2E00, 0x44C0],
    // L
    [0x0E20, 0x44C0, 0x8E00, 0xC440],
];

/// Raw mask for a shape and rotation
#[inline]
pub fn mask(kind: PieceKind, rotation: Rotation) -> u16 {
    TETROMINOES[kind.index()][rotation.index()]
}

/// Whether the piece occupies local cell `(local_x, local_y)` of its box.
///
/// Coordinates outside `0..4` are never occupied.
#[inline]
pub fn occupies(kind: PieceKind, rotation: Rotation, local_x: i8, local_y: i8) -> bool {
    if !(0..BOX_SIZE).contains(&local_x) || !(0..BOX_SIZE).contains(&local_y) {
        return false;
    }
    let bit = 15 - (local_y * BOX_SIZE + local_x) as u16;
    (mask(kind, rotation) >> bit) & 1 == 1
}

/// Occupied cells of a piece as offsets from its box origin
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    let mut shape = [(0, 0); 4];
    let mut n = 0;
    for ly in 0..BOX_SIZE {
        for lx in 0..BOX_SIZE {
            if occupies(kind, rotation, lx, ly) && n < shape.len() {
                shape[n] = (lx, ly);
                n += 1;
            }
        }
    }
    shape
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mask_has_four_cells() {
        for row in TETROMINOES.iter() {
            for m in row.iter() {
                assert_eq!(m.count_ones(), 4, "mask {m:#06x}");
            }
        }
    }

    #[test]
    fn i_north_is_second_row() {
        let shape = get_shape(PieceKind::I, Rotation::North);
        assert_eq!(shape, [(0, 1), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn o_is_rotation_invariant() {
        let north = get_shape(PieceKind::O, Rotation::North);
        for r in [Rotation::East, Rotation::South, Rotation::West] {
            assert_eq!(get_shape(PieceKind::O, r), north);
        }
    }

    #[test]
    fn occupies_rejects_out_of_box() {
        assert!(!occupies(PieceKind::I, Rotation::North, -1, 1));
        assert!(!occupies(PieceKind::I, Rotation::North, 4, 1));
        assert!(!occupies(PieceKind::I, Rotation::East, 2, 4));
        assert!(occupies(PieceKind::I, Rotation::East, 2, 3));
    }
}
