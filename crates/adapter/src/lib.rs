//! Dial adapter: line-delimited JSON over TCP.
//!
//! External programs (a sound player, a test harness, a remote control) can
//! watch the puzzle and drive the dial without touching the hardware.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7878`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome`; the
//!    protocol major version must be `1`, otherwise the server replies with a
//!    `protocol_mismatch` error and closes the connection
//! 3. **Commands**: `command` messages carry remote dial input
//!    (`turn`, `click`, `hold`, `release`, `restart`); the control loop
//!    answers each applied command with an `ack`
//! 4. **Streaming**: clients that asked for it receive an `observation`
//!    after every redraw and one `event` per game event
//!
//! Per client, `seq` must strictly increase. Errors carry one of
//! `handshake_required`, `protocol_mismatch`, `invalid_command` or
//! `backpressure`.
//!
//! # Environment Variables
//!
//! - `DIAL_ADAPTER_HOST`: bind address (default `127.0.0.1`)
//! - `DIAL_ADAPTER_PORT`: port (default `7878`, `0` picks a free one)
//! - `DIAL_ADAPTER_MAX_PENDING`: inbound queue depth (default `16`)
//! - `DIAL_ADAPTER_DISABLED`: `1` or `true` disables the adapter
//!
//! # Example
//!
//! ```text
//! -> {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0","stream_observations":true}
//! <- {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"demo":"tetris"}
//! -> {"type":"command","seq":2,"ts":0,"input":"turn","detents":-1}
//! <- {"type":"event","seq":7,"ts":...,"event":"moved"}
//! <- {"type":"ack","seq":2,"ts":...,"status":"ok"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use rotary_dial_core as core;
pub use rotary_dial_types as types;

pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, OutboundMessage};
pub use server::{
    check_tcp_listen_available, is_disabled, run_server, ServerConfig, ServerReady, ServerStats,
};
