//! Game session scenarios driven through the per-tick controller

use rotary_dial::core::{ActivePiece, GameSession, TickInput, TickReport};
use rotary_dial::types::{GameEvent, Millis, PieceKind, Rotation, BOARD_WIDTH};

/// Fresh session with an I piece at the spawn position
fn session_with_i() -> GameSession {
    let mut session = GameSession::new(7, 0);
    assert!(session.set_active(ActivePiece::spawn(PieceKind::I)));
    session
}

fn gravity_tick(session: &mut GameSession, now: Millis) -> Vec<GameEvent> {
    session
        .tick(&TickInput {
            now_ms: now,
            ..TickInput::default()
        })
        .events
        .to_vec()
}

#[test]
fn fresh_session_defaults() {
    let session = GameSession::new(99, 0);
    assert_eq!(session.score(), 0);
    assert_eq!(session.lines(), 0);
    assert_eq!(session.level(), 1);
    assert_eq!(session.drop_interval_ms(), 1000);
    assert!(!session.is_over());
    let active = session.active();
    assert_eq!((active.x, active.y), (3, -1));
    assert_eq!(active.rotation, Rotation::North);
}

#[test]
fn same_seed_same_pieces() {
    let a = GameSession::new(123, 0);
    let b = GameSession::new(123, 0);
    assert_eq!(a.active().kind, b.active().kind);
    assert_eq!(a.next_kind(), b.next_kind());
}

#[test]
fn i_piece_falls_nineteen_rows_then_locks_on_the_floor() {
    let mut session = session_with_i();
    let mut now = 0;
    let mut moves = 0;
    for _ in 0..19 {
        now += 1001;
        let events = gravity_tick(&mut session, now);
        assert_eq!(events, vec![GameEvent::Moved]);
        moves += 1;
    }
    assert_eq!(moves, 19);

    now += 1001;
    let events = gravity_tick(&mut session, now);
    assert_eq!(events, vec![GameEvent::Locked]);

    let board = session.board();
    for x in 0..BOARD_WIDTH as i8 {
        let filled = (3..=6).contains(&x);
        assert_eq!(board.is_occupied(x, 19), filled, "column {x}");
    }
    assert!(!session.is_over());
    assert_eq!(session.active().y, -1);
}

#[test]
fn twentieth_drop_is_rejected_by_the_floor() {
    let mut session = session_with_i();
    for _ in 0..19 {
        assert!(session.try_drop());
    }
    assert!(!session.try_drop());
    assert_eq!(session.active().y, 18);
    assert_eq!(session.ghost_y(), 18);
}

#[test]
fn gravity_waits_for_strictly_more_than_the_interval() {
    let mut session = session_with_i();
    assert!(gravity_tick(&mut session, 1000).is_empty());
    assert_eq!(gravity_tick(&mut session, 1001), vec![GameEvent::Moved]);
}

#[test]
fn completing_a_row_scores_by_level() {
    let mut session = session_with_i();
    {
        let board = session.board_mut();
        for x in 0..BOARD_WIDTH as i8 {
            if !(3..=6).contains(&x) {
                board.set(x, 19, Some(PieceKind::O));
            }
        }
    }
    let level = session.level();

    let mut now = 0;
    let mut cleared = None;
    for _ in 0..20 {
        now += 1001;
        let report = session.tick(&TickInput {
            now_ms: now,
            ..TickInput::default()
        });
        if let Some(&GameEvent::LinesCleared(n)) = report
            .events
            .iter()
            .find(|e| matches!(e, GameEvent::LinesCleared(_)))
        {
            cleared = Some(n);
            break;
        }
    }

    assert_eq!(cleared, Some(1));
    assert_eq!(session.score(), 100 * level);
    assert_eq!(session.lines(), 1);
    for x in 0..BOARD_WIDTH as i8 {
        assert!(!session.board().is_occupied(x, 19));
    }
}

/// Fill `rows` except the columns in `gap`
fn fill_rows_except(session: &mut GameSession, rows: &[i8], gap: std::ops::RangeInclusive<i8>) {
    let board = session.board_mut();
    for &y in rows {
        for x in 0..BOARD_WIDTH as i8 {
            if !gap.contains(&x) {
                board.set(x, y, Some(PieceKind::O));
            }
        }
    }
}

fn hard_drop_and_lock(session: &mut GameSession, piece: ActivePiece) -> TickReport {
    assert!(session.set_active(piece));
    while session.try_drop() {}
    let mut report = TickReport::default();
    session.lock_active(&mut report);
    report
}

#[test]
fn crossing_ten_lines_scores_at_old_level_then_speeds_up() {
    let mut session = GameSession::new(7, 0);
    for _ in 0..9 {
        fill_rows_except(&mut session, &[19], 3..=6);
        let report = hard_drop_and_lock(&mut session, ActivePiece::spawn(PieceKind::I));
        assert!(report.contains(GameEvent::LinesCleared(1)));
    }
    assert_eq!(session.lines(), 9);
    assert_eq!(session.level(), 1);
    assert_eq!(session.score(), 900);
    assert_eq!(session.drop_interval_ms(), 1000);

    // Vertical I down column 0 completes rows 18 and 19
    fill_rows_except(&mut session, &[18, 19], 0..=0);
    let vertical = ActivePiece {
        rotation: Rotation::East,
        x: -2,
        ..ActivePiece::spawn(PieceKind::I)
    };
    let report = hard_drop_and_lock(&mut session, vertical);
    assert!(report.contains(GameEvent::LinesCleared(2)));

    // 2 lines at the pre-clear level: 2 * 2 * 100 * 1
    assert_eq!(session.score(), 900 + 400);
    assert_eq!(session.lines(), 11);
    assert_eq!(session.level(), 2);
    assert_eq!(session.drop_interval_ms(), 900);
    assert_eq!(session.gravity_interval_ms(false), 900);

    // No tick has run yet, so gravity still counts from t=0
    let y0 = session.active().y;
    assert!(gravity_tick(&mut session, 900).is_empty());
    assert_eq!(session.active().y, y0);
    assert_eq!(gravity_tick(&mut session, 901), vec![GameEvent::Moved]);
    assert_eq!(session.active().y, y0 + 1);
}

#[test]
fn blocked_rotation_leaves_piece_unchanged() {
    let mut session = session_with_i();
    // East rotation of the I occupies column x+2 from row y to y+3.
    session.board_mut().set(5, 1, Some(PieceKind::T));
    let before = session.active();

    let report = session.tick(&TickInput {
        now_ms: 1,
        short_press: true,
        ..TickInput::default()
    });
    assert!(!report.contains(GameEvent::Rotated));
    assert_eq!(session.active(), before);
}

#[test]
fn rotation_then_shift_in_one_tick() {
    let mut session = GameSession::new(5, 0);
    assert!(session.set_active(ActivePiece::spawn(PieceKind::T)));
    let report = session.tick(&TickInput {
        now_ms: 1,
        dx: -2,
        short_press: true,
        held: false,
    });
    assert_eq!(
        report.events.as_slice(),
        &[GameEvent::Rotated, GameEvent::Moved]
    );
    let active = session.active();
    assert_eq!(active.rotation, Rotation::East);
    assert_eq!(active.x, 1);
}

#[test]
fn shift_into_wall_is_all_or_nothing() {
    let mut session = session_with_i();
    let report = session.tick(&TickInput {
        now_ms: 1,
        dx: -5,
        ..TickInput::default()
    });
    assert!(report.events.is_empty());
    assert_eq!(session.active().x, 3);

    assert!(session.try_shift(-3));
    assert_eq!(session.active().x, 0);
}

#[test]
fn holding_switches_to_fast_interval_and_back() {
    let mut session = session_with_i();
    assert_eq!(session.gravity_interval_ms(true), 50);

    let held = |now| TickInput {
        now_ms: now,
        held: true,
        ..TickInput::default()
    };
    assert!(session.tick(&held(50)).events.is_empty());
    assert_eq!(session.tick(&held(51)).events.as_slice(), &[GameEvent::Moved]);
    assert_eq!(session.active_interval_ms(), 50);

    let report = session.tick(&TickInput {
        now_ms: 60,
        ..TickInput::default()
    });
    assert!(report.redraw);
    assert_eq!(session.active_interval_ms(), 1000);
    assert!(gravity_tick(&mut session, 1051).is_empty());
    assert_eq!(gravity_tick(&mut session, 1052), vec![GameEvent::Moved]);
}

#[test]
fn top_out_ends_game_and_freezes_ticks() {
    let mut session = session_with_i();
    {
        let board = session.board_mut();
        for y in 0..20 {
            board.set(0, y, Some(PieceKind::S));
            board.set(9, y, Some(PieceKind::S));
            for x in 3..7 {
                if y >= 1 {
                    board.set(x, y, Some(PieceKind::S));
                }
            }
        }
    }
    // The I sits on row 0 and cannot fall; the next spawn collides with it.
    let events = gravity_tick(&mut session, 1001);
    assert_eq!(events, vec![GameEvent::Locked, GameEvent::GameOver]);
    assert!(session.is_over());

    let report = session.tick(&TickInput {
        now_ms: 5000,
        dx: 1,
        short_press: true,
        held: true,
    });
    assert!(report.events.is_empty());
    assert!(!report.redraw);
}

#[test]
fn restart_only_after_game_over() {
    let mut session = session_with_i();
    assert!(!session.request_restart(10));
    assert_eq!(session.restarts(), 0);

    for y in 1..20 {
        for x in 0..BOARD_WIDTH as i8 {
            if x != 1 {
                session.board_mut().set(x, y, Some(PieceKind::Z));
            }
        }
    }
    gravity_tick(&mut session, 1001);
    assert!(session.is_over());

    assert!(session.request_restart(2000));
    assert!(!session.is_over());
    assert_eq!(session.restarts(), 1);
    assert_eq!(session.score(), 0);
    assert_eq!(session.board().cells().iter().filter(|c| c.is_some()).count(), 0);
}
