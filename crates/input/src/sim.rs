//! Host stand-ins for the dial hardware.
//!
//! [`EncoderSim`] plays the role of the pin-change interrupt: a background
//! thread that turns requested detents into quadrature edges and feeds them
//! to a [`SharedEncoder`], concurrently with the control loop reading it.
//! [`SimButton`] models the push-button level from keyboard activity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::encoder::{levels_of, SharedEncoder, REST_PHASE};
use crate::types::{Direction, Millis};

/// How long a click keeps the simulated button down
pub const CLICK_MS: Millis = 40;

/// Auto-release for a hold when the terminal reports no key-release events.
/// Must outlast the keyboard's initial repeat delay.
pub const HOLD_RELEASE_TIMEOUT_MS: Millis = 600;

/// Gap between simulated edges
const EDGE_GAP: Duration = Duration::from_micros(250);

/// Pin-level generator for a quadrature encoder
#[derive(Debug, Clone, Copy)]
pub struct QuadratureSim {
    phase: u8,
}

impl QuadratureSim {
    pub fn new() -> Self {
        Self { phase: REST_PHASE }
    }

    /// Pin levels after one Gray step in `direction`
    pub fn step(&mut self, direction: Direction) -> (bool, bool) {
        self.phase = match direction {
            Direction::Clockwise => (self.phase + 1) % 4,
            Direction::CounterClockwise => (self.phase + 3) % 4,
        };
        levels_of(self.phase)
    }

    /// The four edges of one detent
    pub fn detent_edges(&mut self, direction: Direction) -> [(bool, bool); 4] {
        [
            self.step(direction),
            self.step(direction),
            self.step(direction),
            self.step(direction),
        ]
    }

    /// One detent with contact chatter on the first edge
    pub fn bouncy_detent_edges(&mut self, direction: Direction) -> [(bool, bool); 6] {
        let reverse = match direction {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        };
        [
            self.step(direction),
            self.step(reverse),
            self.step(direction),
            self.step(direction),
            self.step(direction),
            self.step(direction),
        ]
    }
}

impl Default for QuadratureSim {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn request sent to the edge thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub direction: Direction,
    pub detents: u32,
    pub bounce: bool,
}

/// Background edge injector standing in for the encoder interrupt
pub struct EncoderSim {
    tx: Option<Sender<Turn>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EncoderSim {
    pub fn spawn(encoder: Arc<SharedEncoder>) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Turn>();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("encoder-isr".into())
            .spawn(move || edge_loop(&encoder, rx, &thread_stop))?;
        Ok(Self {
            tx: Some(tx),
            stop,
            handle: Some(handle),
        })
    }

    /// Queue `detents` clicks in `direction`. Returns false if the thread is gone.
    pub fn turn(&self, direction: Direction, detents: u32, bounce: bool) -> bool {
        match &self.tx {
            Some(tx) => tx
                .send(Turn {
                    direction,
                    detents,
                    bounce,
                })
                .is_ok(),
            None => false,
        }
    }

    /// Signed convenience form: positive is clockwise
    pub fn turn_by(&self, detents: i32, bounce: bool) -> bool {
        let direction = if detents >= 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        self.turn(direction, detents.unsigned_abs(), bounce)
    }
}

impl Drop for EncoderSim {
    fn drop(&mut self) {
        // Pending turns are abandoned; the loop exits at the next detent
        self.stop.store(true, Ordering::Relaxed);
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("encoder edge thread panicked");
            }
        }
    }
}

fn edge_loop(encoder: &SharedEncoder, rx: Receiver<Turn>, stop: &AtomicBool) {
    log::debug!("encoder edge thread started");
    let mut sim = QuadratureSim::new();
    'turns: while let Ok(turn) = rx.recv() {
        for _ in 0..turn.detents {
            if stop.load(Ordering::Relaxed) {
                break 'turns;
            }
            if turn.bounce {
                for (a, b) in sim.bouncy_detent_edges(turn.direction) {
                    encoder.on_edge(a, b);
                    thread::sleep(EDGE_GAP);
                }
            } else {
                for (a, b) in sim.detent_edges(turn.direction) {
                    encoder.on_edge(a, b);
                    thread::sleep(EDGE_GAP);
                }
            }
        }
    }
    log::debug!("encoder edge thread stopped");
}

/// Simulated push button level.
///
/// A click holds the level down for [`CLICK_MS`]. A hold stays down until
/// released; without key-release events it auto-releases
/// [`HOLD_RELEASE_TIMEOUT_MS`] after the last key repeat.
#[derive(Debug, Clone)]
pub struct SimButton {
    down_until: Option<Millis>,
    latched: bool,
    release_timeout_ms: Millis,
}

impl SimButton {
    pub fn new() -> Self {
        Self {
            down_until: None,
            latched: false,
            release_timeout_ms: HOLD_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_release_timeout_ms(mut self, timeout_ms: Millis) -> Self {
        self.release_timeout_ms = timeout_ms;
        self
    }

    pub fn click(&mut self, now: Millis) {
        self.latched = false;
        self.down_until = Some(now.saturating_add(CLICK_MS));
    }

    /// Start or refresh a hold (key press or key repeat)
    pub fn hold(&mut self, now: Millis) {
        self.latched = true;
        self.down_until = Some(now.saturating_add(self.release_timeout_ms));
    }

    /// Press and keep the button down until [`SimButton::release`]
    pub fn latch(&mut self) {
        self.latched = true;
        self.down_until = Some(Millis::MAX);
    }

    pub fn release(&mut self) {
        self.latched = false;
        self.down_until = None;
    }

    /// Button level at `now` (true = pressed)
    pub fn level(&self, now: Millis) -> bool {
        self.down_until.is_some_and(|until| now < until)
    }

    pub fn is_holding(&self, now: Millis) -> bool {
        self.latched && self.level(now)
    }
}

impl Default for SimButton {
    fn default() -> Self {
        Self::new()
    }
}
