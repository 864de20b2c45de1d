//! Generic configuration I/O utilities
//!
//! YAML loading and saving for any serializable configuration type.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Load configuration from a YAML file, falling back to defaults
///
/// A missing file yields the default config silently; an unreadable or
/// invalid file logs a warning and yields the default config.
///
/// # Example
///
/// ```ignore
/// let settings: EngineSettings = load_config(Path::new("engine.yaml"));
/// ```
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::info!("load_config: {:?} doesn't exist, using defaults", path);
        return T::default();
    }
    match read_config(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("load_config: {:#}, using defaults", e);
            T::default()
        }
    }
}

/// Load configuration from a YAML file that must exist and parse
///
/// Used when the user names a config file explicitly.
pub fn read_config<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config = serde_yaml::from_str::<T>(&contents)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    log::info!("read_config: Loaded config from {:?}", path);
    Ok(config)
}

/// Save configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    log::info!("save_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("save_config: Config saved");
    Ok(())
}
