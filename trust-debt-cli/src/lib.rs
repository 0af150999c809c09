//! Command line driver for Trust Debt grading and permission checks.

pub mod args;
pub mod commands;
pub mod settings;

pub use args::{Args, Command};
pub use settings::Settings;
