//! Session module - one game from first spawn to game over
//!
//! [`GameSession`] owns the board, the falling piece, the next-piece preview,
//! score/lines/level and the gravity clock. The control loop drives it with
//! one [`GameSession::tick`] per period; every mutation of the active piece is
//! collision-checked before it is committed, so the piece never overlaps the
//! stack or leaves the grid sideways or downwards.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::pieces::{get_shape, PieceShape};
use crate::rng::SimpleRng;
use crate::scoring::{drop_interval_ms, level_for_lines, line_clear_score};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{GameEvent, Millis, PieceKind, Rotation, FAST_DROP_MS, SPAWN_X, SPAWN_Y};

/// Falling piece: shape, rotation and the top-left of its 4x4 box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Fresh piece at the spawn column with rotation 0
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Occupied cells as offsets from the box origin
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    fn collides(&self, board: &Board) -> bool {
        board.collides(self.kind, self.rotation, self.x, self.y)
    }
}

/// Place a fresh piece of `kind` at the spawn position
pub fn spawn(kind: PieceKind) -> ActivePiece {
    ActivePiece::spawn(kind)
}

/// Controller state. `GameOver` is left only through a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// Everything the controller consumes in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    /// Monotonic timestamp of this tick
    pub now_ms: Millis,
    /// Detents turned since the previous tick (positive = clockwise = right)
    pub dx: i32,
    /// A short press was classified since the previous tick
    pub short_press: bool,
    /// The button is currently in the held state
    pub held: bool,
}

/// Room for one tick's events plus a restart notice
pub const TICK_EVENT_CAPACITY: usize = 8;

/// Events emitted by one tick, in the order they happened
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: ArrayVec<GameEvent, TICK_EVENT_CAPACITY>,
    /// Some state visible to the renderer changed
    pub redraw: bool,
}

impl TickReport {
    /// Report that only asks for a redraw
    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    /// Record an event; implies a redraw. A tick emits at most
    /// [`TICK_EVENT_CAPACITY`] events; overflow is a logic error.
    pub fn push(&mut self, event: GameEvent) {
        self.redraw = true;
        let pushed = self.events.try_push(event);
        debug_assert!(pushed.is_ok(), "tick report overflow at {event:?}");
    }

    pub fn contains(&self, event: GameEvent) -> bool {
        self.events.contains(&event)
    }
}

/// A single game
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    active: ActivePiece,
    next: PieceKind,
    rng: SimpleRng,
    seed: u32,
    score: u32,
    lines: u32,
    level: u32,
    drop_interval_ms: u32,
    fast_drop: bool,
    last_drop_ms: Millis,
    is_over: bool,
    restarts: u32,
}

impl GameSession {
    /// Start a game: empty board, score/lines reset, level 1, a next shape
    /// chosen and the first piece spawned.
    pub fn new(seed: u32, now_ms: Millis) -> Self {
        let mut rng = SimpleRng::new(seed);
        let first = rng.next_piece();
        let next = rng.next_piece();
        let mut session = Self {
            board: Board::new(),
            active: ActivePiece::spawn(first),
            next,
            rng,
            seed,
            score: 0,
            lines: 0,
            level: 1,
            drop_interval_ms: drop_interval_ms(1),
            fast_drop: false,
            last_drop_ms: now_ms,
            is_over: false,
            restarts: 0,
        };
        session.is_over = session.active.collides(&session.board);
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for setting up positions
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> ActivePiece {
        self.active
    }

    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Level-derived gravity interval
    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    /// Gravity interval in effect for the given hold state
    pub fn gravity_interval_ms(&self, held: bool) -> u32 {
        if held {
            FAST_DROP_MS
        } else {
            self.drop_interval_ms
        }
    }

    /// Gravity interval used by the most recent tick
    pub fn active_interval_ms(&self) -> u32 {
        self.gravity_interval_ms(self.fast_drop)
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    pub fn phase(&self) -> Phase {
        if self.is_over {
            Phase::GameOver
        } else {
            Phase::Playing
        }
    }

    /// Number of restarts since the first game
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Replace the active piece, only if it fits where it is placed
    pub fn set_active(&mut self, piece: ActivePiece) -> bool {
        self.try_place(piece)
    }

    fn try_place(&mut self, candidate: ActivePiece) -> bool {
        if self.is_over || candidate.collides(&self.board) {
            return false;
        }
        self.active = candidate;
        true
    }

    /// Rotate to `(rotation + 1) mod 4` in place. No wall kick: a blocked
    /// rotation is rejected and the piece stays as it was.
    pub fn try_rotate(&mut self) -> bool {
        let candidate = ActivePiece {
            rotation: self.active.rotation.rotate_cw(),
            ..self.active
        };
        self.try_place(candidate)
    }

    /// Translate by `dx` columns in one step; the whole shift applies or
    /// nothing does.
    pub fn try_shift(&mut self, dx: i32) -> bool {
        if dx == 0 {
            return false;
        }
        let Some(x) = (self.active.x as i32)
            .checked_add(dx)
            .and_then(|x| i8::try_from(x).ok())
        else {
            return false;
        };
        let candidate = ActivePiece { x, ..self.active };
        self.try_place(candidate)
    }

    /// Move down one row. Returns false when blocked (the piece is not locked).
    pub fn try_drop(&mut self) -> bool {
        let candidate = ActivePiece {
            y: self.active.y + 1,
            ..self.active
        };
        self.try_place(candidate)
    }

    /// Lowest row the active piece could fall to (rendering preview only)
    pub fn ghost_y(&self) -> i8 {
        let mut y = self.active.y;
        while !self
            .board
            .collides(self.active.kind, self.active.rotation, self.active.x, y + 1)
        {
            y += 1;
        }
        y
    }

    /// Lock the active piece, clear rows, score, and spawn the next piece.
    ///
    /// Returns the number of rows cleared. Events are appended to `report`.
    pub fn lock_active(&mut self, report: &mut TickReport) -> usize {
        if self.is_over {
            return 0;
        }
        self.board.lock(&self.active);
        report.push(GameEvent::Locked);

        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            let cleared_u32 = cleared as u32;
            self.score = self
                .score
                .saturating_add(line_clear_score(cleared_u32, self.level));
            self.lines = self.lines.saturating_add(cleared_u32);
            self.level = level_for_lines(self.lines);
            self.drop_interval_ms = drop_interval_ms(self.level);
            report.push(GameEvent::LinesCleared(cleared as u8));
        }

        if !self.spawn_next() {
            report.push(GameEvent::GameOver);
        }
        cleared
    }

    /// Promote the preview piece and draw a new one. Returns false (and ends
    /// the game) when the fresh piece collides at spawn.
    fn spawn_next(&mut self) -> bool {
        self.active = spawn(self.next);
        self.next = self.rng.next_piece();
        if self.active.collides(&self.board) {
            self.is_over = true;
            return false;
        }
        true
    }

    /// Advance one control-loop tick: rotation, then horizontal shift, then
    /// gravity. No-op once the game is over.
    pub fn tick(&mut self, input: &TickInput) -> TickReport {
        let mut report = TickReport::default();
        if self.is_over {
            return report;
        }

        if input.short_press && self.try_rotate() {
            report.push(GameEvent::Rotated);
        }

        if input.dx != 0 && self.try_shift(input.dx) {
            report.push(GameEvent::Moved);
        }

        if input.held != self.fast_drop {
            self.fast_drop = input.held;
            report.redraw = true;
        }
        let interval = self.gravity_interval_ms(input.held) as Millis;
        if input.now_ms.saturating_sub(self.last_drop_ms) > interval {
            self.last_drop_ms = input.now_ms;
            if self.try_drop() {
                report.push(GameEvent::Moved);
            } else {
                self.lock_active(&mut report);
            }
        }

        report
    }

    /// Start over with a fresh session. Honored only once the game is over;
    /// returns false (and changes nothing) while playing.
    pub fn request_restart(&mut self, now_ms: Millis) -> bool {
        if !self.is_over {
            return false;
        }
        let seed = self.rng.next_u32();
        let restarts = self.restarts.wrapping_add(1);
        *self = Self::new(seed, now_ms);
        self.restarts = restarts;
        true
    }

    /// Fill a render snapshot without allocating
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.board);
        out.active = Some(ActiveSnapshot::from(self.active));
        out.ghost_y = if self.is_over {
            None
        } else {
            Some(self.ghost_y())
        };
        out.next = self.next;
        out.score = self.score;
        out.lines = self.lines;
        out.level = self.level;
        out.drop_interval_ms = self.active_interval_ms();
        out.game_over = self.is_over;
        out.restarts = self.restarts;
        out.seed = self.seed;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snap = GameSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }
}
