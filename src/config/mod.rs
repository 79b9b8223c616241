//! Configuration — optional TOML settings file.

pub mod settings;

pub use settings::{expand_home, Settings};
