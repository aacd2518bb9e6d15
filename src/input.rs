use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::runtime::GameEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum ControlSignal {
    Quit,
    Interrupt,
    Resize,
}

/// What a single keystroke means for the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeystrokeOutcome {
    Match,
    Mismatch(char),
    Control(ControlSignal),
    /// Releases, navigation keys and stray chords. Dropped by the loop.
    Ignored,
}

/// Classifies a key against the next expected character. `expected` is `None`
/// once the text is fully typed, in which case content keys are ignored.
pub fn classify(key: &KeyEvent, expected: Option<char>) -> KeystrokeOutcome {
    if key.kind != KeyEventKind::Press {
        return KeystrokeOutcome::Ignored;
    }

    if let Some(signal) = control_signal(key) {
        return KeystrokeOutcome::Control(signal);
    }

    match (key.code, expected) {
        (KeyCode::Char(c), Some(expected)) if is_content_chord(key.modifiers) => {
            if c == expected {
                KeystrokeOutcome::Match
            } else {
                KeystrokeOutcome::Mismatch(c)
            }
        }
        _ => KeystrokeOutcome::Ignored,
    }
}

/// Classifies an input event from the runtime. Resizes become a control
/// signal; ticks carry no input and are ignored.
pub fn classify_event(event: &GameEvent, expected: Option<char>) -> KeystrokeOutcome {
    match event {
        GameEvent::Key(key) => classify(key, expected),
        GameEvent::Resize => KeystrokeOutcome::Control(ControlSignal::Resize),
        GameEvent::Tick => KeystrokeOutcome::Ignored,
    }
}

pub fn control_signal(key: &KeyEvent) -> Option<ControlSignal> {
    match key.code {
        KeyCode::Esc => Some(ControlSignal::Quit),
        KeyCode::Char('c') | KeyCode::Char('d')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(ControlSignal::Interrupt)
        }
        _ => None,
    }
}

fn is_content_chord(modifiers: KeyModifiers) -> bool {
    modifiers.difference(KeyModifiers::SHIFT).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_match_and_mismatch() {
        assert_eq!(
            classify(&key(KeyCode::Char('a')), Some('a')),
            KeystrokeOutcome::Match
        );
        assert_eq!(
            classify(&key(KeyCode::Char('b')), Some('a')),
            KeystrokeOutcome::Mismatch('b')
        );
    }

    #[test]
    fn test_shifted_chars_are_content() {
        let upper = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(classify(&upper, Some('A')), KeystrokeOutcome::Match);
    }

    #[test]
    fn test_space_is_content() {
        assert_eq!(
            classify(&key(KeyCode::Char(' ')), Some(' ')),
            KeystrokeOutcome::Match
        );
    }

    #[test]
    fn test_escape_quits() {
        assert_eq!(
            classify(&key(KeyCode::Esc), Some('a')),
            KeystrokeOutcome::Control(ControlSignal::Quit)
        );
    }

    #[test]
    fn test_ctrl_c_interrupts_even_when_complete() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(
            classify(&ctrl_c, None),
            KeystrokeOutcome::Control(ControlSignal::Interrupt)
        );
        assert_eq!(
            classify(&ctrl_c, Some('c')),
            KeystrokeOutcome::Control(ControlSignal::Interrupt)
        );
    }

    #[test]
    fn test_other_chords_are_ignored() {
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        let alt_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT);
        assert_eq!(classify(&ctrl_a, Some('a')), KeystrokeOutcome::Ignored);
        assert_eq!(classify(&alt_a, Some('a')), KeystrokeOutcome::Ignored);
    }

    #[test]
    fn test_navigation_keys_are_ignored() {
        for code in [
            KeyCode::Left,
            KeyCode::Enter,
            KeyCode::Tab,
            KeyCode::Backspace,
            KeyCode::F(1),
        ] {
            assert_eq!(classify(&key(code), Some('a')), KeystrokeOutcome::Ignored);
        }
    }

    #[test]
    fn test_release_events_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(classify(&release, Some('a')), KeystrokeOutcome::Ignored);
    }

    #[test]
    fn test_runtime_events() {
        assert_eq!(
            classify_event(&GameEvent::Resize, Some('a')),
            KeystrokeOutcome::Control(ControlSignal::Resize)
        );
        assert_eq!(
            classify_event(&GameEvent::Key(key(KeyCode::Char('a'))), Some('a')),
            KeystrokeOutcome::Match
        );
        assert_eq!(
            classify_event(&GameEvent::Tick, Some('a')),
            KeystrokeOutcome::Ignored
        );
    }

    #[test]
    fn test_content_after_completion_is_ignored() {
        assert_eq!(
            classify(&key(KeyCode::Char('a')), None),
            KeystrokeOutcome::Ignored
        );
    }
}
