//! Keybinding definitions

use crossterm::event::{KeyCode, KeyModifiers};

/// Keybinding action while no edit is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Move focus between the tag list and the library table
    SwitchFocus,
    Refresh,
    ToggleRead,
    EditTags,
    EditMetadata,
    OpenDocument,
    OpenNotes,
    OpenBibliography,
    /// Write the current view's bibliography records
    Export,
    MoveUp,
    MoveDown,
    ToggleHelp,
}

/// Get the action for a key when idle
pub fn idle_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::SwitchFocus),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('m') => Some(Action::ToggleRead),
        KeyCode::Char('t') => Some(Action::EditTags),
        KeyCode::Char('M') | KeyCode::Char('E') => Some(Action::EditMetadata),
        KeyCode::Enter => Some(Action::OpenDocument),
        KeyCode::Char('n') => Some(Action::OpenNotes),
        KeyCode::Char('b') => Some(Action::OpenBibliography),
        KeyCode::Char('e') => Some(Action::Export),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveUp),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveDown),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        _ => None,
    }
}

/// Ctrl-C quits from any state.
pub fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL)
}

/// Hotkey hints shown under the panels.
pub const HOTKEYS: &str =
    "Tab focus | Enter open | n notes | b bib | m read | t tags | M meta | r refresh | e export | ? help | q quit";

/// Hotkey hints while an edit is open.
pub const EDIT_HOTKEYS: &str = "Enter save | Esc cancel | Tab/Up/Down field | Ctrl-U clear";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_bindings() {
        assert_eq!(idle_action(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(idle_action(KeyCode::Tab), Some(Action::SwitchFocus));
        assert_eq!(idle_action(KeyCode::Char('m')), Some(Action::ToggleRead));
        assert_eq!(idle_action(KeyCode::Char('M')), Some(Action::EditMetadata));
        assert_eq!(idle_action(KeyCode::Enter), Some(Action::OpenDocument));
        assert_eq!(idle_action(KeyCode::Down), Some(Action::MoveDown));
        assert_eq!(idle_action(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_interrupt() {
        assert!(is_interrupt(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!is_interrupt(KeyCode::Char('c'), KeyModifiers::NONE));
    }
}
