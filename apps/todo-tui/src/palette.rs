//! Colors for the light and dark themes

use ratatui::style::{Color, Modifier, Style};

use todo_core::Theme;

use crate::mode::Mode;

/// Resolved colors for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub selection: Color,
    pub warning: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::White,
                foreground: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                selection: Color::LightBlue,
                warning: Color::Red,
            },
            Theme::Dark => Self {
                background: Color::Black,
                foreground: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                selection: Color::Blue,
                warning: Color::LightRed,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    /// Style for a list row
    pub fn row(&self, completed: bool, selected: bool) -> Style {
        let mut style = self.base();
        if completed {
            style = style.fg(self.muted).add_modifier(Modifier::CROSSED_OUT);
        }
        if selected {
            style = style.bg(self.selection).add_modifier(Modifier::BOLD);
        }
        style
    }

    /// Mode indicator color
    pub fn mode_color(mode: Mode) -> Color {
        match mode {
            Mode::Normal => Color::Blue,
            Mode::Insert => Color::Green,
            Mode::Edit => Color::Yellow,
            Mode::Confirm => Color::Magenta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_themes_differ() {
        let light = Palette::for_theme(Theme::Light);
        let dark = Palette::for_theme(Theme::Dark);
        assert_ne!(light.background, dark.background);
        assert_eq!(dark.base().bg, Some(Color::Black));
    }

    #[test]
    fn test_completed_rows_are_crossed_out() {
        let palette = Palette::for_theme(Theme::Light);
        let style = palette.row(true, false);
        assert!(style.add_modifier.contains(Modifier::CROSSED_OUT));
        assert_eq!(style.fg, Some(Color::Gray));
    }
}
