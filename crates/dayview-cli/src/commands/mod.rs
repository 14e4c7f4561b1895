pub mod config;
pub mod layout;

use std::path::Path;

use dayview_core::{Config, ConfigError};

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
