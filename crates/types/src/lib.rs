//! Shared data types and constants for the rotary-dial controller.
//!
//! Everything in this crate is plain data with no dependencies, so it can be
//! used from the interrupt-side decoder, the control loop, the terminal
//! simulator and the TCP adapter alike.
//!
//! # Board
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19)
//! - **Spawn origin**: column 3, row -1 (the 4x4 box starts one row above the grid)
//!
//! # Timing
//!
//! All durations are milliseconds on a monotonic clock:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Control loop period while a game is running |
//! | `GAME_OVER_TICK_MS` | 50 | Control loop period on the game-over screen |
//! | `LIGHTS_TICK_MS` | 20 | Control loop period of the LED demo |
//! | `BASE_DROP_MS` | 1000 | Gravity interval at level 1 |
//! | `DROP_STEP_MS` | 100 | Gravity speed-up per level |
//! | `DROP_INTERVAL_MIN_MS` | 100 | Gravity floor |
//! | `FAST_DROP_MS` | 50 | Gravity while the button is held |
//! | `LONG_PRESS_MS` | 150 | Hold threshold for the puzzle game |
//! | `LIGHTS_LONG_PRESS_MS` | 300 | Hold threshold for the LED and counter demos |
//!
//! # Examples
//!
//! ```
//! use rotary_dial_types::{Direction, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.color_index(), 3);
//!
//! assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
//! assert_eq!(Direction::CounterClockwise.sign(), -1);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Column of the 4x4 box origin for a freshly spawned piece
pub const SPAWN_X: i8 = 3;

/// Row of the 4x4 box origin for a freshly spawned piece.
///
/// Negative: every rotation-0 mask has an empty top row, so the first
/// occupied row enters the grid at row 0.
pub const SPAWN_Y: i8 = -1;

/// Control loop period while playing (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Control loop period on the game-over screen
pub const GAME_OVER_TICK_MS: u32 = 50;

/// Control loop period of the LED demo
pub const LIGHTS_TICK_MS: u32 = 20;

/// Gravity interval at level 1 (one row per second)
pub const BASE_DROP_MS: u32 = 1000;

/// Gravity interval decrement per level above 1
pub const DROP_STEP_MS: u32 = 100;

/// Gravity interval floor
pub const DROP_INTERVAL_MIN_MS: u32 = 100;

/// Gravity interval while the button is held, regardless of level
pub const FAST_DROP_MS: u32 = 50;

/// Base line-clear reward, multiplied by `cleared² × level`
pub const LINE_CLEAR_BASE: u32 = 100;

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Hold threshold used by the puzzle game
pub const LONG_PRESS_MS: u32 = 150;

/// Hold threshold used by the LED and counter demos
pub const LIGHTS_LONG_PRESS_MS: u32 = 300;

/// Physical LED strip length
pub const LED_STRIP_MAX_LEDS: usize = 60;

/// Raw quadrature transitions per detent
pub const EDGES_PER_DETENT: i32 = 4;

/// Milliseconds on the monotonic clock
pub type Millis = u64;

/// The seven tetromino shapes
///
/// Discriminants are the shape ids used by the geometry table, and each kind
/// has a fixed display color:
/// - **I**: Cyan
/// - **O**: Yellow
/// - **T**: Purple
/// - **S**: Green
/// - **Z**: Red
/// - **J**: Blue
/// - **L**: Orange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in shape-id order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Shape id in `0..7`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`PieceKind::index`]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Board color index (1-7); 0 is reserved for an empty cell
    pub fn color_index(self) -> u8 {
        self as u8 + 1
    }

    /// Inverse of [`PieceKind::color_index`]
    pub fn from_color_index(color: u8) -> Option<Self> {
        match color {
            0 => None,
            c => Self::from_index(c as usize - 1),
        }
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// ```
    /// use rotary_dial_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("I"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("x"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }
}

/// Piece rotation, stepped clockwise on every short press
///
/// The cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotation index in `0..4`, used to address the geometry table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Rotation::index`], taken modulo 4
    pub fn from_index(index: usize) -> Self {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    /// `(rotation + 1) mod 4`
    pub fn rotate_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Direction of one encoder detent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// +1 for clockwise, -1 for counter-clockwise
    pub fn sign(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Edge-triggered output of the gesture classifier
///
/// Each variant other than `None` is produced exactly once per physical press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureEvent {
    #[default]
    None,
    /// Released before the hold threshold
    ShortPress,
    /// Crossed the hold threshold (fires once; release is silent)
    HoldStarted,
}

/// Discrete game signal for the audio and observation consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The active piece shifted sideways or fell one row
    Moved,
    Rotated,
    Locked,
    /// Rows removed by the last lock (1-4)
    LinesCleared(u8),
    GameOver,
    Restarted,
}

impl GameEvent {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            GameEvent::Moved => "moved",
            GameEvent::Rotated => "rotated",
            GameEvent::Locked => "locked",
            GameEvent::LinesCleared(_) => "lines_cleared",
            GameEvent::GameOver => "game_over",
            GameEvent::Restarted => "restarted",
        }
    }
}

/// A board cell: `None` when empty, otherwise the kind that was locked there
pub type Cell = Option<PieceKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firmware_timing_defaults() {
        assert_eq!(TICK_MS, 16);
        assert_eq!(GAME_OVER_TICK_MS, 50);
        assert_eq!(LIGHTS_TICK_MS, 20);
        assert_eq!(BASE_DROP_MS, 1000);
        assert_eq!(FAST_DROP_MS, 50);
        assert!(LONG_PRESS_MS >= 150 && LIGHTS_LONG_PRESS_MS <= 300);
    }

    #[test]
    fn color_index_round_trips_for_every_kind() {
        for kind in PieceKind::ALL {
            let color = kind.color_index();
            assert!((1..=7).contains(&color));
            assert_eq!(PieceKind::from_color_index(color), Some(kind));
        }
        assert_eq!(PieceKind::from_color_index(0), None);
        assert_eq!(PieceKind::from_color_index(8), None);
    }

    #[test]
    fn rotation_cycles_back_to_north() {
        let mut r = Rotation::North;
        for _ in 0..4 {
            r = r.rotate_cw();
        }
        assert_eq!(r, Rotation::North);
        assert_eq!(Rotation::from_index(6), Rotation::South);
    }

    #[test]
    fn event_names() {
        assert_eq!(GameEvent::LinesCleared(2).as_str(), "lines_cleared");
        assert_eq!(GameEvent::GameOver.as_str(), "game_over");
    }
}
