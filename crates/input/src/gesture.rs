//! Button gesture classification.
//!
//! Polled from the control loop with the current button level. A release
//! before the hold threshold is a short press; a press that stays down past
//! the threshold becomes a hold and is silent on release.

use crate::types::{GestureEvent, Millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonState {
    Idle,
    Pressed { started_at: Millis },
    Held,
}

/// Short-press / hold state machine
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    state: ButtonState,
    threshold_ms: u32,
}

impl GestureClassifier {
    pub fn new(threshold_ms: u32) -> Self {
        Self {
            state: ButtonState::Idle,
            threshold_ms,
        }
    }

    pub fn threshold_ms(&self) -> u32 {
        self.threshold_ms
    }

    /// Feed one level sample taken at monotonic time `now`.
    ///
    /// Returned events are edges: each fires on exactly one poll.
    pub fn poll(&mut self, is_down: bool, now: Millis) -> GestureEvent {
        match (self.state, is_down) {
            (ButtonState::Idle, true) => {
                self.state = ButtonState::Pressed { started_at: now };
                GestureEvent::None
            }
            (ButtonState::Pressed { started_at }, true) => {
                if now.saturating_sub(started_at) >= self.threshold_ms as Millis {
                    self.state = ButtonState::Held;
                    GestureEvent::HoldStarted
                } else {
                    GestureEvent::None
                }
            }
            (ButtonState::Pressed { .. }, false) => {
                self.state = ButtonState::Idle;
                GestureEvent::ShortPress
            }
            (ButtonState::Held, false) => {
                self.state = ButtonState::Idle;
                GestureEvent::None
            }
            (ButtonState::Idle, false) | (ButtonState::Held, true) => GestureEvent::None,
        }
    }

    /// True only while a press has crossed the hold threshold and is still down
    pub fn is_button_held(&self) -> bool {
        self.state == ButtonState::Held
    }

    pub fn is_down(&self) -> bool {
        self.state != ButtonState::Idle
    }

    /// Drop any press in progress (e.g. on demo switch)
    pub fn reset(&mut self) {
        self.state = ButtonState::Idle;
    }
}
