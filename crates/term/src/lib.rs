//! Terminal display for the dial simulator.
//!
//! The round panel is drawn into a plain framebuffer and flushed with a
//! diffing crossterm renderer; no widget toolkit is involved.

pub mod dial_view;
pub mod fb;
pub mod renderer;

pub use rotary_dial_core as core;
pub use rotary_dial_types as types;

pub use dial_view::{on_panel, piece_color, AdapterStatusView, DialView, Screen, Viewport};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
