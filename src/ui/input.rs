/// Input state tracker.
///
/// The game is turn-based, so every key press (or auto-repeat) is one
/// discrete intent; there is no held-key state. Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use zombie_escape::Direction;

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A'), KeyCode::Char('h')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D'), KeyCode::Char('l')];
pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char('k')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S'), KeyCode::Char('j')];
pub const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' '), KeyCode::Char('n'), KeyCode::Char('N')];
pub const KEYS_TIER: &[KeyCode] = &[KeyCode::Char('t'), KeyCode::Char('T')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Key presses collected by the most recent `drain_events()`, in order.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8) }
    }

    /// Wait up to `timeout` for input, then drain everything pending.
    pub fn drain_events(&mut self, timeout: Duration) -> std::io::Result<()> {
        self.presses.clear();

        if !event::poll(timeout)? {
            return Ok(());
        }
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    self.presses.push(key);
                }
            }
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }
        Ok(())
    }

    /// Was any of these keys pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|k| codes.contains(&k.code))
    }

    /// Directional intents in press order. Several presses in one frame
    /// each become their own turn.
    pub fn directions(&self) -> Vec<Direction> {
        self.presses.iter().filter_map(|k| direction_for(k.code)).collect()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

pub fn direction_for(code: KeyCode) -> Option<Direction> {
    if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        assert_eq!(direction_for(KeyCode::Up), Some(Direction::Up));
        assert_eq!(direction_for(KeyCode::Char('a')), Some(Direction::Left));
        assert_eq!(direction_for(KeyCode::Char('S')), Some(Direction::Down));
        assert_eq!(direction_for(KeyCode::Char('l')), Some(Direction::Right));
        assert_eq!(direction_for(KeyCode::Char('r')), None);
    }

    #[test]
    fn presses_keep_order() {
        let mut kb = InputState::new();
        kb.presses = vec![press(KeyCode::Right), press(KeyCode::Char('x')), press(KeyCode::Up)];
        assert_eq!(kb.directions(), vec![Direction::Right, Direction::Up]);
        assert!(!kb.any_pressed(KEYS_QUIT));
    }

    #[test]
    fn ctrl_c_is_detected() {
        let mut kb = InputState::new();
        kb.presses = vec![KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)];
        assert!(kb.ctrl_c_pressed());
    }
}
