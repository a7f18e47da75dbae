//! Puzzle demo: a [`GameSession`] driven by the dial.

use rotary_dial_core::{GameSession, GameSnapshot, TickInput, TickReport};

use crate::types::{GameEvent, GestureEvent, Millis, GAME_OVER_TICK_MS, TICK_MS};
use crate::DialFrame;

/// Dial mapping: turn to shift, short press to rotate, hold to drop fast.
/// On the game-over screen a short press starts a new game.
#[derive(Debug, Clone)]
pub struct TetrisApp {
    session: GameSession,
}

impl TetrisApp {
    pub fn new(seed: u32, now_ms: Millis) -> Self {
        Self {
            session: GameSession::new(seed, now_ms),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn update(&mut self, frame: &DialFrame) -> TickReport {
        let short_press = frame.gesture == GestureEvent::ShortPress;
        if self.session.is_over() {
            let mut report = TickReport::default();
            if short_press && self.restart(frame.now_ms) {
                report.push(GameEvent::Restarted);
            }
            return report;
        }

        let report = self.session.tick(&TickInput {
            now_ms: frame.now_ms,
            dx: frame.detent_delta,
            short_press,
            held: frame.held,
        });
        if report.contains(GameEvent::GameOver) {
            log::info!(
                "game over: score={} lines={} level={}",
                self.session.score(),
                self.session.lines(),
                self.session.level()
            );
        }
        report
    }

    /// External restart request; ignored while a game is running
    pub fn restart(&mut self, now_ms: Millis) -> bool {
        let restarted = self.session.request_restart(now_ms);
        if restarted {
            log::info!("new game (seed {})", self.session.seed());
        }
        restarted
    }

    /// Loop period: slower on the game-over screen
    pub fn tick_ms(&self) -> u32 {
        if self.session.is_over() {
            GAME_OVER_TICK_MS
        } else {
            TICK_MS
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.session.snapshot_into(out);
    }
}
