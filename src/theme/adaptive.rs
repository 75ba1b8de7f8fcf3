//! Values that come in a light and a dark variant.

use super::mode::ColorMode;

/// A pair of values, one per color mode.
///
/// The view layer keeps one of these for anything that differs between light
/// and dark display (palettes, icon sets, stylesheet names) and picks the
/// variant matching the effective mode.
///
/// # Example
///
/// ```rust
/// use colormode::{Adaptive, ColorMode};
///
/// let background = Adaptive::new("#ffffff", "#000000");
/// assert_eq!(*background.pick(ColorMode::Dark), "#000000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adaptive<T> {
    light: T,
    dark: T,
}

impl<T> Adaptive<T> {
    /// Creates a pair with separate light and dark variants.
    pub fn new(light: T, dark: T) -> Self {
        Self { light, dark }
    }

    /// Returns the variant for `mode`.
    pub fn pick(&self, mode: ColorMode) -> &T {
        match mode {
            ColorMode::Light => &self.light,
            ColorMode::Dark => &self.dark,
        }
    }

    /// Consumes the pair, keeping only the variant for `mode`.
    pub fn into_picked(self, mode: ColorMode) -> T {
        match mode {
            ColorMode::Light => self.light,
            ColorMode::Dark => self.dark,
        }
    }

    pub fn light(&self) -> &T {
        &self.light
    }

    pub fn dark(&self) -> &T {
        &self.dark
    }

    /// Applies `f` to both variants.
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Adaptive<U> {
        Adaptive {
            light: f(self.light),
            dark: f(self.dark),
        }
    }
}
