//! The user's three-way theme preference.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::mode::ColorMode;

/// The user's theme choice.
///
/// `System` defers to the operating system's color mode. It is also what an
/// absent persisted value means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Light,
    Dark,
    #[default]
    System,
}

impl Preference {
    /// All choices, in the order a toggle control presents them.
    pub const ALL: [Preference; 3] = [Preference::Light, Preference::Dark, Preference::System];

    /// The lowercase literal (`"light"`, `"dark"` or `"system"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Preference::Light => "light",
            Preference::Dark => "dark",
            Preference::System => "system",
        }
    }

    /// A capitalized label for toggle controls.
    pub fn label(self) -> &'static str {
        match self {
            Preference::Light => "Light",
            Preference::Dark => "Dark",
            Preference::System => "System",
        }
    }

    /// The fixed color mode this preference forces, if any.
    pub fn explicit_mode(self) -> Option<ColorMode> {
        match self {
            Preference::Light => Some(ColorMode::Light),
            Preference::Dark => Some(ColorMode::Dark),
            Preference::System => None,
        }
    }

    pub fn follows_system(self) -> bool {
        self == Preference::System
    }

    /// Reads a persisted literal, treating anything unrecognized as `System`.
    ///
    /// Only the exact lowercase literals count; case and whitespace variants
    /// are foreign data. Use [`FromStr`] for user input.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Preference::Light,
            Some("dark") => Preference::Dark,
            _ => Preference::System,
        }
    }
}

impl From<ColorMode> for Preference {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => Preference::Light,
            ColorMode::Dark => Preference::Dark,
        }
    }
}

impl std::fmt::Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown preference literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePreferenceError {
    input: String,
}

impl std::fmt::Display for ParsePreferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown theme preference '{}' (expected light, dark or system)",
            self.input
        )
    }
}

impl std::error::Error for ParsePreferenceError {}

impl FromStr for Preference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Preference::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParsePreferenceError {
                input: s.to_string(),
            })
    }
}

/// Derives the effective color mode.
///
/// Explicit preferences win; `System` takes whatever the OS reports.
///
/// # Example
///
/// ```rust
/// use colormode::{resolve, ColorMode, Preference};
///
/// assert_eq!(resolve(Preference::Light, ColorMode::Dark), ColorMode::Light);
/// assert_eq!(resolve(Preference::System, ColorMode::Dark), ColorMode::Dark);
/// ```
pub fn resolve(preference: Preference, system: ColorMode) -> ColorMode {
    preference.explicit_mode().unwrap_or(system)
}
