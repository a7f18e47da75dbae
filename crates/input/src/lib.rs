//! Dial input: encoder decoding, button gestures and host simulation.
//!
//! [`encoder`] and [`gesture`] are the device-side logic and have no
//! terminal dependency; [`sim`] and [`map`] stand in for the hardware when
//! running on a desktop.

pub mod clock;
pub mod encoder;
pub mod gesture;
pub mod map;
pub mod sim;

pub use rotary_dial_types as types;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use encoder::{phase_of, DetentCounter, QuadratureDecoder, SharedEncoder};
pub use gesture::GestureClassifier;
pub use map::{handle_key_event, should_quit, DialInput};
pub use sim::{EncoderSim, QuadratureSim, SimButton};
