use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions that the app can perform in response to input.
#[derive(Debug, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    /// Re-fetch the current features.
    Refresh,

    // Feature input bar
    TypeChar(char),
    Backspace,
    Delete,
    Submit,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    HistoryUp,
    HistoryDown,
    ClearInput,

    Noop,
}

/// Route a key event to an action.
pub fn route(key: KeyEvent) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => AppAction::Quit,
            KeyCode::Char('r') => AppAction::Refresh,
            KeyCode::Char('u') => AppAction::ClearInput,
            _ => AppAction::Noop,
        };
    }

    match key.code {
        KeyCode::Esc => AppAction::Quit,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Delete => AppAction::Delete,
        KeyCode::Left => AppAction::CursorLeft,
        KeyCode::Right => AppAction::CursorRight,
        KeyCode::Home => AppAction::CursorHome,
        KeyCode::End => AppAction::CursorEnd,
        KeyCode::Up => AppAction::HistoryUp,
        KeyCode::Down => AppAction::HistoryDown,
        KeyCode::Char(c) => AppAction::TypeChar(c),
        _ => AppAction::Noop,
    }
}

/// Split the input bar into feature names. Commas and whitespace both
/// separate; order and duplicates are kept.
pub fn parse_features(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
