//! Dial applications.
//!
//! Each demo consumes one [`DialFrame`] per control-loop tick (the detent
//! delta and gesture already decoded by the input layer) and reports what
//! changed through a [`TickReport`].

pub mod counter;
pub mod lights;
pub mod tetris;

pub use rotary_dial_core as core;
pub use rotary_dial_types as types;

pub use counter::CounterApp;
pub use lights::{hsv_to_rgb, Effect, LightsApp, LightsMode, Rgb};
pub use tetris::TetrisApp;

use rotary_dial_core::TickReport;
use types::{GestureEvent, Millis, LIGHTS_LONG_PRESS_MS, LIGHTS_TICK_MS, LONG_PRESS_MS, TICK_MS};

/// Decoded dial input for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DialFrame {
    pub now_ms: Millis,
    /// Net detents since the previous tick
    pub detent_delta: i32,
    pub gesture: GestureEvent,
    /// Button is past the hold threshold and still down
    pub held: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoKind {
    Tetris,
    Counter,
    Lights,
}

impl DemoKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tetris" | "game" => Some(DemoKind::Tetris),
            "counter" | "hello" => Some(DemoKind::Counter),
            "lights" | "led" => Some(DemoKind::Lights),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DemoKind::Tetris => "tetris",
            DemoKind::Counter => "counter",
            DemoKind::Lights => "lights",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DemoKind::Tetris => DemoKind::Counter,
            DemoKind::Counter => DemoKind::Lights,
            DemoKind::Lights => DemoKind::Tetris,
        }
    }

    /// Hold threshold each demo was tuned with
    pub fn long_press_ms(self) -> u32 {
        match self {
            DemoKind::Tetris => LONG_PRESS_MS,
            DemoKind::Counter | DemoKind::Lights => LIGHTS_LONG_PRESS_MS,
        }
    }
}

/// The running demo
#[derive(Debug, Clone)]
pub enum Demo {
    Tetris(TetrisApp),
    Counter(CounterApp),
    Lights(LightsApp),
}

impl Demo {
    pub fn new(kind: DemoKind, seed: u32, now_ms: Millis) -> Self {
        match kind {
            DemoKind::Tetris => Demo::Tetris(TetrisApp::new(seed, now_ms)),
            DemoKind::Counter => Demo::Counter(CounterApp::new()),
            DemoKind::Lights => Demo::Lights(LightsApp::new(seed)),
        }
    }

    pub fn kind(&self) -> DemoKind {
        match self {
            Demo::Tetris(_) => DemoKind::Tetris,
            Demo::Counter(_) => DemoKind::Counter,
            Demo::Lights(_) => DemoKind::Lights,
        }
    }

    pub fn update(&mut self, frame: &DialFrame) -> TickReport {
        match self {
            Demo::Tetris(app) => app.update(frame),
            Demo::Counter(app) => app.update(frame),
            Demo::Lights(app) => app.update(frame),
        }
    }

    /// Control loop period for the demo's current state
    pub fn tick_ms(&self) -> u32 {
        match self {
            Demo::Tetris(app) => app.tick_ms(),
            Demo::Counter(_) => TICK_MS,
            Demo::Lights(_) => LIGHTS_TICK_MS,
        }
    }

    /// Restart request from outside the dial; only the puzzle honors it,
    /// and only on its game-over screen
    pub fn restart(&mut self, now_ms: Millis) -> bool {
        match self {
            Demo::Tetris(app) => app.restart(now_ms),
            _ => false,
        }
    }
}
