//! Board tests: storage, collision and row clearing

use rotary_dial::core::{occupies, ActivePiece, Board, SimpleRng};
use rotary_dial::types::{PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

fn fill_row(board: &mut Board, y: i8, kind: PieceKind) {
    for x in 0..BOARD_WIDTH as i8 {
        assert!(board.set(x, y, Some(kind)));
    }
}

#[test]
fn test_board_new_empty() {
    let board = Board::new();
    assert_eq!(board.width(), BOARD_WIDTH);
    assert_eq!(board.height(), BOARD_HEIGHT);

    for y in 0..BOARD_HEIGHT as i8 {
        for x in 0..BOARD_WIDTH as i8 {
            assert_eq!(board.get(x, y), Some(None), "cell ({x}, {y})");
        }
    }
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = Board::new();
    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, -1), None);
    assert_eq!(board.get(BOARD_WIDTH as i8, 0), None);
    assert_eq!(board.get(0, BOARD_HEIGHT as i8), None);
}

#[test]
fn test_board_set_and_get() {
    let mut board = Board::new();
    assert!(board.set(5, 10, Some(PieceKind::T)));
    assert_eq!(board.get(5, 10), Some(Some(PieceKind::T)));
    assert!(board.is_occupied(5, 10));

    assert!(board.set(5, 10, None));
    assert_eq!(board.get(5, 10), Some(None));

    assert!(!board.set(-1, 0, Some(PieceKind::T)));
    assert!(!board.set(0, BOARD_HEIGHT as i8, Some(PieceKind::T)));
}

/// Reference collision check written directly from the rules
fn collides_reference(board: &Board, kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> bool {
    for ly in 0..4i8 {
        for lx in 0..4i8 {
            if !occupies(kind, rotation, lx, ly) {
                continue;
            }
            let (bx, by) = (x + lx, y + ly);
            if bx < 0 || bx >= BOARD_WIDTH as i8 || by >= BOARD_HEIGHT as i8 {
                return true;
            }
            if by >= 0 && board.is_occupied(bx, by) {
                return true;
            }
        }
    }
    false
}

#[test]
fn test_collides_matches_reference_on_random_boards() {
    let mut rng = SimpleRng::new(2024);
    for _ in 0..8 {
        let mut board = Board::new();
        for y in 6..BOARD_HEIGHT as i8 {
            for x in 0..BOARD_WIDTH as i8 {
                if rng.one_in(3) {
                    board.set(x, y, Some(rng.next_piece()));
                }
            }
        }

        for kind in PieceKind::ALL {
            for r in 0..4 {
                let rotation = Rotation::from_index(r);
                for y in -4..(BOARD_HEIGHT as i8 + 2) {
                    for x in -4..(BOARD_WIDTH as i8 + 2) {
                        assert_eq!(
                            board.collides(kind, rotation, x, y),
                            collides_reference(&board, kind, rotation, x, y),
                            "{kind:?} {rotation:?} at ({x}, {y})"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_cells_above_the_top_never_collide() {
    let mut board = Board::new();
    fill_row(&mut board, 0, PieceKind::Z);
    // Vertical I in column 0 spans rows y..y+3; fully above row 0 is fine.
    assert!(!board.collides(PieceKind::I, Rotation::East, -2, -4));
    assert!(board.collides(PieceKind::I, Rotation::East, -2, -3));
}

#[test]
fn test_lock_writes_color_and_skips_rows_above_top() {
    let mut board = Board::new();
    let piece = ActivePiece {
        kind: PieceKind::I,
        rotation: Rotation::East,
        x: 0,
        y: -2,
    };
    board.lock(&piece);

    let mut grid = [[0u8; 10]; 20];
    board.write_u8_grid(&mut grid);
    let column: Vec<u8> = grid.iter().map(|row| row[2]).collect();
    assert_eq!(&column[..2], &[1, 1]);
    assert!(column[2..].iter().all(|&c| c == 0));
    assert_eq!(board.cells().iter().filter(|c| c.is_some()).count(), 2);
}

#[test]
fn test_clear_single_row() {
    let mut board = Board::new();
    fill_row(&mut board, 19, PieceKind::O);
    board.set(4, 18, Some(PieceKind::T));

    assert_eq!(board.clear_full_rows(), 1);
    assert_eq!(board.get(4, 19), Some(Some(PieceKind::T)));
    assert_eq!(board.get(4, 18), Some(None));
    assert!(!board.is_row_full(19));
}

#[test]
fn test_clear_non_adjacent_rows() {
    let mut board = Board::new();
    fill_row(&mut board, 19, PieceKind::I);
    fill_row(&mut board, 17, PieceKind::I);
    board.set(0, 18, Some(PieceKind::S));
    board.set(5, 16, Some(PieceKind::L));

    assert_eq!(board.clear_full_rows(), 2);

    // Old row 18 lands on 19, old row 16 on 18.
    assert_eq!(board.get(0, 19), Some(Some(PieceKind::S)));
    assert_eq!(board.get(5, 18), Some(Some(PieceKind::L)));
    assert_eq!(board.cells().iter().filter(|c| c.is_some()).count(), 2);
    for y in 0..18 {
        for x in 0..BOARD_WIDTH as i8 {
            assert_eq!(board.get(x, y), Some(None));
        }
    }
}

#[test]
fn test_clear_stacked_full_rows() {
    let mut board = Board::new();
    for y in 16..20 {
        fill_row(&mut board, y, PieceKind::J);
    }
    board.set(9, 15, Some(PieceKind::Z));

    assert_eq!(board.clear_full_rows(), 4);
    assert_eq!(board.get(9, 19), Some(Some(PieceKind::Z)));
    assert_eq!(board.cells().iter().filter(|c| c.is_some()).count(), 1);
}
