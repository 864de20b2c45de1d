//! Standard locations for StepFX configuration files

use std::path::PathBuf;

/// Get the directory holding StepFX configuration
///
/// Returns: `<platform config dir>/stepfx` (e.g. `~/.config/stepfx`),
/// or `./stepfx` when the platform has no config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stepfx")
}

/// Get the default path for a config file
///
/// # Arguments
/// * `filename` - Config file name (e.g., "session.yaml")
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_stepfx() {
        assert!(default_config_dir().ends_with("stepfx"));
    }

    #[test]
    fn test_config_path_includes_filename() {
        let path = default_config_path("session.yaml");
        assert!(path.ends_with("stepfx/session.yaml"));
    }
}
