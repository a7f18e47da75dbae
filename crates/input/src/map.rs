//! Key mapping from terminal events to simulated dial input.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::types::Direction;

/// One piece of physical dial activity, as simulated from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialInput {
    Turn(Direction),
    /// Quick press and release of the dial button
    Click,
    /// Press (or key-repeat) of the hold key
    Hold,
    /// Key-release of the hold key
    Release,
    /// Cycle to the next demo
    SwitchDemo,
}

/// Map keyboard input to dial input.
pub fn handle_key_event(key: KeyEvent) -> Option<DialInput> {
    if key.kind == KeyEventKind::Release {
        return match key.code {
            KeyCode::Down | KeyCode::Char('j' | 'J' | 's' | 'S') => Some(DialInput::Release),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('h' | 'H' | 'a' | 'A') => {
            Some(DialInput::Turn(Direction::CounterClockwise))
        }
        KeyCode::Right | KeyCode::Char('l' | 'L' | 'd' | 'D') => {
            Some(DialInput::Turn(Direction::Clockwise))
        }
        KeyCode::Char(' ') | KeyCode::Enter => Some(DialInput::Click),
        KeyCode::Down | KeyCode::Char('j' | 'J' | 's' | 'S') => Some(DialInput::Hold),
        KeyCode::Tab => Some(DialInput::SwitchDemo),
        _ => None,
    }
}

/// Check if key should quit the simulator.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
