//! Counter demo: the dial turns a number, a press zeroes it.

use rotary_dial_core::TickReport;

use crate::types::GestureEvent;
use crate::DialFrame;

#[derive(Debug, Clone, Default)]
pub struct CounterApp {
    value: i64,
    resets: u32,
}

impl CounterApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn update(&mut self, frame: &DialFrame) -> TickReport {
        let mut changed = false;
        if frame.detent_delta != 0 {
            self.value = self.value.saturating_add(frame.detent_delta as i64);
            changed = true;
        }
        if frame.gesture == GestureEvent::ShortPress {
            self.value = 0;
            self.resets = self.resets.wrapping_add(1);
            log::debug!("counter reset");
            changed = true;
        }
        if changed {
            TickReport::redraw()
        } else {
            TickReport::default()
        }
    }
}
