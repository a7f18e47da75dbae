//! Quadrature encoder decoding.
//!
//! The two encoder lines are folded into a 2-bit Gray-coded phase
//! `p = (a << 1) | (a ^ b)`, which walks 0,1,2,3 clockwise and 0,3,2,1
//! counter-clockwise. One physical detent is one full cycle that starts and
//! ends at the rest phase (both lines released, phase 0).
//!
//! A detent is counted only when the decoder arrives back at rest after a
//! complete cycle of valid single steps. Bounce inside a cycle cancels out,
//! a turn that reverses before reaching the next rest position nets zero,
//! and a cycle containing an illegal jump (two missed transitions) is
//! discarded instead of guessed.
//!
//! The interrupt-safe wrapper [`SharedEncoder`] keeps the decoder in a
//! critical-section cell and publishes the detent count through an atomic,
//! which the control loop diffs once per tick with a [`DetentCounter`].

use core::cell::Cell;
use core::sync::atomic::{AtomicI32, Ordering};

use critical_section::Mutex;

use crate::types::{Direction, EDGES_PER_DETENT};

/// Phase of the encoder's mechanical rest position
pub const REST_PHASE: u8 = 0;

/// Signed step for each `(last_phase, new_phase)` pair.
///
/// Only the four single-step Gray transitions carry a direction; holds and
/// opposite-corner skips are 0.
pub const TRANSITIONS: [[i8; 4]; 4] = [
    [0, 1, 0, -1],
    [-1, 0, 1, 0],
    [0, -1, 0, 1],
    [1, 0, -1, 0],
];

/// Gray-coded phase of the two encoder lines
#[inline]
pub const fn phase_of(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | ((a ^ b) as u8)
}

/// Pin levels that produce `phase`
#[inline]
pub const fn levels_of(phase: u8) -> (bool, bool) {
    let a = phase & 0b10 != 0;
    let b = a ^ (phase & 0b01 != 0);
    (a, b)
}

/// Debounced return-to-rest quadrature decoder.
///
/// Plain `Copy` data with no allocation, so it can live in a static and be
/// stepped from an interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadratureDecoder {
    last_phase: u8,
    /// ±1 per valid transition since creation
    raw_accumulator: i32,
    /// Sum of valid steps since the decoder last left rest
    cycle: i8,
    /// The current cycle began at rest and has seen no illegal jump
    armed: bool,
    detents: i32,
}

impl QuadratureDecoder {
    /// Create a decoder whose phase is taken from the current pin levels
    pub const fn new(a: bool, b: bool) -> Self {
        let last_phase = phase_of(a, b);
        Self {
            last_phase,
            raw_accumulator: 0,
            cycle: 0,
            armed: last_phase == REST_PHASE,
            detents: 0,
        }
    }

    /// Decoder that starts at the rest phase
    pub const fn at_rest() -> Self {
        Self::new(false, false)
    }

    /// Feed the pin levels sampled on an edge.
    ///
    /// Returns the direction of a completed detent, if this sample finished one.
    pub fn on_phase_sample(&mut self, a: bool, b: bool) -> Option<Direction> {
        let phase = phase_of(a, b);
        if phase == self.last_phase {
            return None;
        }
        let step = TRANSITIONS[self.last_phase as usize][phase as usize];
        self.last_phase = phase;

        if step == 0 {
            // Illegal jump: direction unknown, drop the whole cycle
            self.cycle = 0;
            self.armed = phase == REST_PHASE;
            return None;
        }

        self.raw_accumulator = self.raw_accumulator.wrapping_add(step as i32);
        self.cycle = self.cycle.saturating_add(step);

        if phase != REST_PHASE {
            return None;
        }

        let completed = if !self.armed {
            None
        } else if self.cycle as i32 == EDGES_PER_DETENT {
            Some(Direction::Clockwise)
        } else if self.cycle as i32 == -EDGES_PER_DETENT {
            Some(Direction::CounterClockwise)
        } else {
            None
        };
        self.cycle = 0;
        self.armed = true;

        if let Some(direction) = completed {
            self.detents = self.detents.wrapping_add(direction.sign());
        }
        completed
    }

    /// Net detents completed since creation
    pub fn detents(&self) -> i32 {
        self.detents
    }

    /// Net valid transitions since creation (diagnostic)
    pub fn raw_count(&self) -> i32 {
        self.raw_accumulator
    }

    /// Legacy detent estimate by dividing the raw count by four.
    ///
    /// Known to double-count on contact bounce across a rest boundary and to
    /// report partial turns; kept only for comparison in diagnostics.
    pub fn legacy_raw_detents(&self) -> i32 {
        self.raw_accumulator / EDGES_PER_DETENT
    }

    pub fn last_phase(&self) -> u8 {
        self.last_phase
    }
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self::at_rest()
    }
}

/// Decoder state shared between the edge interrupt and the control loop.
///
/// The critical section covers only the decoder step; the detent count is
/// published through an atomic so the control loop never has to lock.
pub struct SharedEncoder {
    decoder: Mutex<Cell<QuadratureDecoder>>,
    detents: AtomicI32,
}

impl SharedEncoder {
    /// Usable in a `static`
    pub const fn new(a: bool, b: bool) -> Self {
        Self {
            decoder: Mutex::new(Cell::new(QuadratureDecoder::new(a, b))),
            detents: AtomicI32::new(0),
        }
    }

    pub const fn at_rest() -> Self {
        Self::new(false, false)
    }

    /// Edge handler: sample both lines and step the decoder.
    ///
    /// Never blocks beyond the critical section and never allocates.
    pub fn on_edge(&self, a: bool, b: bool) -> Option<Direction> {
        let completed = critical_section::with(|cs| {
            let cell = self.decoder.borrow(cs);
            let mut decoder = cell.get();
            let completed = decoder.on_phase_sample(a, b);
            cell.set(decoder);
            completed
        });
        if let Some(direction) = completed {
            self.detents.fetch_add(direction.sign(), Ordering::Release);
        }
        completed
    }

    /// Running detent count; wraps on overflow
    pub fn detents(&self) -> i32 {
        self.detents.load(Ordering::Acquire)
    }

    /// Copy of the decoder state (diagnostics)
    pub fn decoder(&self) -> QuadratureDecoder {
        critical_section::with(|cs| self.decoder.borrow(cs).get())
    }
}

impl Default for SharedEncoder {
    fn default() -> Self {
        Self::at_rest()
    }
}

/// Control-loop side of the detent count.
///
/// Holds the last value seen; [`DetentCounter::take_delta`] reads the shared
/// counter exactly once and returns the change since the previous call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetentCounter {
    last_seen: i32,
}

impl DetentCounter {
    /// Start diffing from the encoder's current count
    pub fn new(encoder: &SharedEncoder) -> Self {
        Self {
            last_seen: encoder.detents(),
        }
    }

    pub fn take_delta(&mut self, encoder: &SharedEncoder) -> i32 {
        self.delta_from(encoder.detents())
    }

    /// Same as [`DetentCounter::take_delta`] for an already-read count
    pub fn delta_from(&mut self, current: i32) -> i32 {
        let delta = current.wrapping_sub(self.last_seen);
        self.last_seen = current;
        delta
    }

    /// Forget pending detents (e.g. on demo switch)
    pub fn rebaseline(&mut self, encoder: &SharedEncoder) {
        self.last_seen = encoder.detents();
    }
}
