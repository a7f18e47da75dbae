//! Rotary dial controller (workspace facade crate).
//!
//! Re-exports the workspace crates as `rotary_dial::{types, core, input,
//! engine, term, adapter}` and adds the simulator's runtime configuration.

pub mod config;

pub use rotary_dial_adapter as adapter;
pub use rotary_dial_core as core;
pub use rotary_dial_engine as engine;
pub use rotary_dial_input as input;
pub use rotary_dial_term as term;
pub use rotary_dial_types as types;
