//! Theme values and their resolution.
//!
//! This module provides:
//!
//! - [`Preference`]: The user's choice of light, dark, or follow-the-system
//! - [`ColorMode`]: The effective light or dark mode actually displayed
//! - [`resolve`]: Derives the effective mode from a preference and the OS mode
//! - [`Adaptive`]: A light/dark pair of values selected by color mode
//!
//! Nothing here stores the effective mode. It is always derived on demand
//! from the current preference and system signal.

mod adaptive;
mod mode;
mod preference;

pub use adaptive::Adaptive;
pub use mode::ColorMode;
pub use preference::{resolve, ParsePreferenceError, Preference};
