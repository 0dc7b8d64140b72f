//! Prompt theme
//!
//! Runs that may delete packages are drawn in yellow; read-only commands
//! and dry runs keep a calm cyan.

use cliclack::ThemeState;
use console::Style;

/// Whether the current command can remove anything from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accent {
    #[default]
    ReadOnly,
    Destructive,
}

#[derive(Debug, Clone, Default)]
pub struct CleanupTheme {
    accent: Accent,
}

impl CleanupTheme {
    pub fn new(accent: Accent) -> Self {
        Self { accent }
    }

    fn accent(&self) -> Style {
        match self.accent {
            Accent::ReadOnly => Style::new().cyan(),
            Accent::Destructive => Style::new().yellow(),
        }
    }
}

impl cliclack::Theme for CleanupTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => self.accent(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => self.accent().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => self.accent(),
            ThemeState::Error(_) => Style::new().red(),
            // Aborting a removal prompt keeps every remaining orphan
            ThemeState::Cancel if self.accent == Accent::Destructive => Style::new().yellow(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme for this run
pub fn init_theme(accent: Accent) {
    cliclack::set_theme(CleanupTheme::new(accent));
}
