//! Keybinding definitions

use crossterm::event::KeyCode;

/// Keybinding action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application
    Quit,
    /// Move up in list
    MoveUp,
    /// Move down in list
    MoveDown,
    /// Open the new-todo form
    NewTodo,
    /// Edit the selected item
    Edit,
    /// Flip completion of the selected item
    Toggle,
    /// Delete the selected item (asks first)
    Delete,
    /// Delete all completed items (asks first)
    ClearCompleted,
    /// Switch between light and dark
    ToggleTheme,
    /// Reload from the server
    Reload,
    /// Toggle help
    ToggleHelp,
    /// Cancel/escape
    Cancel,
}

/// Get the action for a key in normal mode
pub fn normal_mode_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveUp),
        KeyCode::Char('a') | KeyCode::Char('i') => Some(Action::NewTodo),
        KeyCode::Char('e') | KeyCode::Enter => Some(Action::Edit),
        KeyCode::Char(' ') | KeyCode::Char('x') => Some(Action::Toggle),
        KeyCode::Char('d') | KeyCode::Delete => Some(Action::Delete),
        KeyCode::Char('C') => Some(Action::ClearCompleted),
        KeyCode::Char('t') => Some(Action::ToggleTheme),
        KeyCode::Char('r') => Some(Action::Reload),
        KeyCode::Esc => Some(Action::Cancel),
        _ => None,
    }
}
