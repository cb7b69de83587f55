//! Internal utilities.

pub mod validation;

pub use validation::{ChatLimits, Validator};
