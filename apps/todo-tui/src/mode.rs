//! TUI interaction modes

/// The current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// List navigation (default)
    #[default]
    Normal,
    /// Filling in the new-todo form (activated with a)
    Insert,
    /// Inline edit of the selected item (activated with e)
    Edit,
    /// Waiting for y/n before a destructive action
    Confirm,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Normal => write!(f, "NORMAL"),
            Mode::Insert => write!(f, "INSERT"),
            Mode::Edit => write!(f, "EDIT"),
            Mode::Confirm => write!(f, "CONFIRM"),
        }
    }
}

impl Mode {
    /// Returns a short code for compact display.
    pub fn short_code(&self) -> &'static str {
        match self {
            Mode::Normal => "NOR",
            Mode::Insert => "INS",
            Mode::Edit => "EDT",
            Mode::Confirm => "Y/N",
        }
    }

    /// Whether key presses are text input rather than commands
    pub fn takes_text(&self) -> bool {
        matches!(self, Mode::Insert | Mode::Edit)
    }
}

/// Field of the new-todo form that receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Text,
    Date,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Text => Field::Date,
            Field::Date => Field::Text,
        }
    }
}
