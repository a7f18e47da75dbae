//! Falling-block puzzle engine - pure, deterministic, and testable
//!
//! This crate holds the board/piece model and the per-tick game controller.
//! It has **no** dependencies on hardware, terminals or networking:
//!
//! - **Deterministic**: the same seed and inputs produce the same game
//! - **Allocation-free**: ticks, moves and snapshots never touch the heap
//! - **Checked**: every piece mutation is collision-tested before it commits
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid with collision, locking and row clearing
//! - [`pieces`]: static 4x4 bitmask geometry for the seven shapes
//! - [`session`]: [`GameSession`], the tick state machine
//! - [`scoring`]: line-clear reward, leveling and gravity schedule
//! - [`rng`]: seeded uniform piece selection
//! - [`snapshot`]: copyable render/observation view
//!
//! # Rules
//!
//! - A short press rotates clockwise in place; a blocked rotation is dropped (no wall kick)
//! - Encoder detents shift the piece sideways, all or nothing
//! - Gravity speeds up with level; holding the button uses a fixed fast interval
//! - A piece that cannot fall locks immediately (no lock delay)
//! - Clearing `n` rows scores `n² × 100 × level`
//! - The game ends when a fresh piece collides at spawn
//!
//! # Example
//!
//! ```
//! use rotary_dial_core::{GameSession, TickInput};
//!
//! let mut game = GameSession::new(12345, 0);
//! let report = game.tick(&TickInput { now_ms: 16, dx: 1, short_press: true, held: false });
//! assert!(report.redraw);
//! assert_eq!(game.level(), 1);
//! ```

pub mod board;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use rotary_dial_types as types;

pub use board::Board;
pub use pieces::{get_shape, occupies};
pub use rng::SimpleRng;
pub use scoring::{drop_interval_ms, level_for_lines, line_clear_score};
pub use session::{
    spawn, ActivePiece, GameSession, Phase, TickInput, TickReport, TICK_EVENT_CAPACITY,
};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
