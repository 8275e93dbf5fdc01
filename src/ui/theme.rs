//! # Theme
//!
//! Colors used throughout the passdeck TUI, grouped by semantic role.
//! Rendering code references theme fields instead of hardcoding
//! `ratatui::style::Color` values.
//!
//! Two palettes ship: a Catppuccin Mocha based default and a monochrome one
//! picked when the `NO_COLOR` environment variable is set.

use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,

    /// Main background color for panels and modals.
    pub bg: Color,
    /// Primary text color.
    pub fg: Color,
    /// Muted text (hints, footer, unfocused borders).
    pub fg_dim: Color,
    /// Focused borders, header, selected-item background.
    pub accent: Color,
    /// Directory names and dialog labels.
    pub secondary: Color,
    /// Status messages.
    pub success: Color,
    /// Output of failed runs and stderr.
    pub error: Color,
    /// Selected row background.
    pub selection_bg: Color,
}

impl Theme {
    pub fn default_theme() -> &'static Theme {
        &MOCHA
    }

    pub fn monochrome() -> &'static Theme {
        &MONOCHROME
    }

    /// Pick a palette for the current environment.
    pub fn detect() -> &'static Theme {
        if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            Self::monochrome()
        } else {
            Self::default_theme()
        }
    }
}

static MOCHA: Theme = Theme {
    name: "Catppuccin Mocha",
    bg: Color::Rgb(30, 30, 46),            // base
    fg: Color::Rgb(205, 214, 244),         // text
    fg_dim: Color::Rgb(108, 112, 134),     // overlay0
    accent: Color::Rgb(137, 180, 250),     // blue
    secondary: Color::Rgb(249, 226, 175),  // yellow
    success: Color::Rgb(166, 227, 161),    // green
    error: Color::Rgb(243, 139, 168),      // red
    selection_bg: Color::Rgb(69, 71, 90),  // surface1
};

static MONOCHROME: Theme = Theme {
    name: "Monochrome",
    bg: Color::Reset,
    fg: Color::Reset,
    fg_dim: Color::Gray,
    accent: Color::White,
    secondary: Color::White,
    success: Color::White,
    error: Color::White,
    selection_bg: Color::DarkGray,
};
