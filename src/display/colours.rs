//! Colour management honouring --no-color and NO_COLOR

use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourManager {
    enabled: bool,
}

impl ColourManager {
    pub fn with_colours(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Resolve colour use from the CLI flag and the environment
    pub fn from_flags(no_color_flag: bool) -> Self {
        let env_disabled = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::with_colours(!no_color_flag && !env_disabled)
    }

    pub fn colours_enabled(&self) -> bool {
        self.enabled
    }

    pub fn success(&self, text: &str) -> ColoredString {
        if self.enabled { text.green() } else { text.normal() }
    }

    pub fn error(&self, text: &str) -> ColoredString {
        if self.enabled { text.red().bold() } else { text.normal() }
    }

    pub fn highlight(&self, text: &str) -> ColoredString {
        if self.enabled { text.cyan().bold() } else { text.normal() }
    }
}

impl Default for ColourManager {
    fn default() -> Self {
        Self::with_colours(true)
    }
}
