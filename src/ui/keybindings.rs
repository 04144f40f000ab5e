// src/ui/keybindings.rs
//! Keyboard input handling and key mappings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map digit/shifted-digit keys to section number (1..3).
pub fn map_key_to_digit(k: &KeyEvent) -> Option<usize> {
    if let KeyCode::Char(c) = k.code {
        match c {
            '1' | '!' => Some(1),
            '2' | '@' => Some(2),
            '3' | '#' => Some(3),
            _ => None,
        }
    } else {
        None
    }
}

/// Check if the key event is a shifted symbol (!, @, #).
fn is_shifted_symbol(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Char('!') | KeyCode::Char('@') | KeyCode::Char('#')
    )
}

/// Actions derived from key events in normal mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationAction {
    Up,
    Down,
    Enter,
    TogglePause,
    Stop,
    NextTrack,
    PreviousTrack,
    ToggleShuffle,
    CycleRepeat,
    ToggleMute,
    VolumeUp,
    VolumeDown,
    SeekForward,
    SeekBackward,
    CycleVisualizer,
    ToggleFavorite,
    CycleSort,
    CycleGenreFilter,
    StartSearch,
    ToggleSection(usize),
    Quit,
    None,
}

/// Convert a key event to a navigation action.
pub fn key_to_action(key: &KeyEvent) -> NavigationAction {
    // Section toggles take priority (Shift+number).
    if let Some(d) = map_key_to_digit(key) {
        if key.modifiers.contains(KeyModifiers::SHIFT) || is_shifted_symbol(key) {
            return NavigationAction::ToggleSection(d);
        }
    }

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => NavigationAction::Down,
        KeyCode::Up | KeyCode::Char('k') => NavigationAction::Up,
        KeyCode::Enter => NavigationAction::Enter,
        KeyCode::Char(' ') => NavigationAction::TogglePause,
        KeyCode::Char('x') => NavigationAction::Stop,
        KeyCode::Char('n') | KeyCode::Char('>') => NavigationAction::NextTrack,
        KeyCode::Char('p') | KeyCode::Char('<') => NavigationAction::PreviousTrack,
        KeyCode::Char('s') => NavigationAction::ToggleShuffle,
        KeyCode::Char('r') => NavigationAction::CycleRepeat,
        KeyCode::Char('m') => NavigationAction::ToggleMute,
        KeyCode::Char('+') | KeyCode::Char('=') => NavigationAction::VolumeUp,
        KeyCode::Char('-') => NavigationAction::VolumeDown,
        KeyCode::Right | KeyCode::Char('.') => NavigationAction::SeekForward,
        KeyCode::Left | KeyCode::Char(',') => NavigationAction::SeekBackward,
        KeyCode::Char('v') => NavigationAction::CycleVisualizer,
        KeyCode::Char('f') => NavigationAction::ToggleFavorite,
        KeyCode::Char('o') => NavigationAction::CycleSort,
        KeyCode::Char('g') => NavigationAction::CycleGenreFilter,
        KeyCode::Char('/') => NavigationAction::StartSearch,
        KeyCode::Char('q') | KeyCode::Esc => NavigationAction::Quit,
        _ => NavigationAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_transport_keys() {
        assert_eq!(
            key_to_action(&key(KeyCode::Char(' '))),
            NavigationAction::TogglePause
        );
        assert_eq!(
            key_to_action(&key(KeyCode::Char('n'))),
            NavigationAction::NextTrack
        );
        assert_eq!(
            key_to_action(&key(KeyCode::Char('p'))),
            NavigationAction::PreviousTrack
        );
    }

    #[test]
    fn test_shifted_digit_toggles_section() {
        let shifted = KeyEvent::new(KeyCode::Char('2'), KeyModifiers::SHIFT);
        assert_eq!(
            key_to_action(&shifted),
            NavigationAction::ToggleSection(2)
        );
        // Terminals that deliver the symbol instead of the digit.
        assert_eq!(
            key_to_action(&key(KeyCode::Char('#'))),
            NavigationAction::ToggleSection(3)
        );
    }

    #[test]
    fn test_plain_digit_is_not_a_toggle() {
        assert_eq!(key_to_action(&key(KeyCode::Char('1'))), NavigationAction::None);
    }
}
