//! The effective light/dark color mode.

use serde::{Deserialize, Serialize};

/// The color mode actually displayed.
///
/// Also used to carry the operating system's dark-mode signal, where
/// `Dark` means "the OS is currently in dark mode".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    /// Maps an "is dark" flag to a color mode.
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            ColorMode::Dark
        } else {
            ColorMode::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == ColorMode::Dark
    }

    /// The lowercase literal, suitable for a `data-theme` style attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }

    /// The opposite mode.
    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Light => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
        }
    }
}

impl From<bool> for ColorMode {
    fn from(is_dark: bool) -> Self {
        ColorMode::from_dark(is_dark)
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
