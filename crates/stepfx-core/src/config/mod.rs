//! Configuration for StepFX hosts
//!
//! - Generic YAML config loading/saving
//! - Standard config file locations
//! - Engine settings shared by every host
//!
//! # Usage
//!
//! ```ignore
//! use stepfx_core::config::{default_config_path, load_config, save_config, EngineSettings};
//!
//! let path = default_config_path("engine.yaml");
//! let settings: EngineSettings = load_config(&path);
//! save_config(&settings, &path)?;
//! ```

mod engine;
mod io;
mod paths;

pub use engine::EngineSettings;
pub use io::{load_config, read_config, save_config};
pub use paths::{default_config_dir, default_config_path};
