//! Configuration loading and saving.
//!
//! Two entry points with different strictness: [`try_load_config`] surfaces
//! read/parse failures as [`ConfigError`] (used by `init`, where clobbering
//! a broken file with defaults would hide the breakage), while
//! [`load_config`] is the lenient wrapper for `run` and `aggregate` that
//! warns and falls back to the built-in catalog.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::schema::Config;
use crate::errors::ConfigError;

/// Default configuration file path (`~/.modelbench/config.json`).
pub fn get_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".modelbench").join("config.json")
}

fn resolve(config_path: Option<&Path>) -> PathBuf {
    config_path.map(Path::to_path_buf).unwrap_or_else(get_config_path)
}

/// Load the config file at `path`, strictly. A missing file is `Ok(None)`;
/// an unreadable or unparsable file is an error.
pub fn try_load_config(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Some(config))
}

/// Load configuration leniently: a missing, unreadable or unparsable file
/// yields the default [`Config`] with a warning, so benchmark commands keep
/// working against the built-in catalog.
///
/// `None` resolves to the default path (`~/.modelbench/config.json`).
pub fn load_config(config_path: Option<&Path>) -> Config {
    let path = resolve(config_path);
    match try_load_config(&path) {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            warn!("{}. Using default configuration.", e);
            Config::default()
        }
    }
}

/// Write the config as pretty JSON, creating parent directories.
///
/// `None` resolves to the default path.
pub fn save_config(config: &Config, config_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = resolve(config_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
            path: path.clone(),
            source: e,
        })?;
    }
    // Config is serde-derived all the way down; serializing it cannot fail.
    let json = serde_json::to_string_pretty(config).map_err(|e| ConfigError::Parse {
        path: path.clone(),
        source: e,
    })?;
    fs::write(&path, json).map_err(|e| ConfigError::Write {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}
