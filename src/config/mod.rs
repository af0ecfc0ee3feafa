//! Config module
//!
//! Settings save/load using serde and JSON.

pub mod settings;

pub use settings::{load_from_file, save_to_file, ConfigError, Settings, SETTINGS_VERSION};
