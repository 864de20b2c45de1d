//! Render session configuration
//!
//! Configuration is stored as YAML.
//! Default location: ~/.config/stepfx/session.yaml

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stepfx_core::config::EngineSettings;
use stepfx_core::engine::{StepFxEngine, DEFAULT_MIX, DEFAULT_OUTPUT_GAIN_DB};
use stepfx_core::{Lane, DEFAULT_BLOCK_SIZE};

/// File name of the session config inside the config directory
pub const SESSION_FILE: &str = "session.yaml";

/// Root session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Simulated host transport
    pub transport: TransportConfig,
    /// Wet/dry mix (0.0-1.0)
    /// Default: 0.5
    pub mix: f32,
    /// Output gain in dB (-24 to +24)
    /// Default: 0.0
    pub output_gain_db: f32,
    /// Engine behaviour settings
    pub engine: EngineSettings,
    /// Lane name -> 16-step pattern (`x` on, `.` off)
    /// Lanes not listed stay off.
    pub patterns: BTreeMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let patterns = [
            (Lane::Gate, "....x.......x..."),
            (Lane::Stutter, "..............xx"),
            (Lane::Filter, "xxxxxxxx........"),
            (Lane::Bitcrush, "........xxxx...."),
            (Lane::Delay, "x...x...x...x..."),
            (Lane::Reverb, "............xxxx"),
        ]
        .into_iter()
        .map(|(lane, pattern)| (lane.name().to_lowercase(), pattern.to_string()))
        .collect();

        Self {
            transport: TransportConfig::default(),
            mix: DEFAULT_MIX,
            output_gain_db: DEFAULT_OUTPUT_GAIN_DB,
            engine: EngineSettings::default(),
            patterns,
        }
    }
}

impl SessionConfig {
    /// Push mix, gain and lane patterns into an engine
    ///
    /// The grid is cleared first, so lanes without a pattern are off.
    pub fn apply(&self, engine: &StepFxEngine) -> Result<()> {
        let params = engine.params();
        params.set_mix(self.mix);
        params.set_output_gain_db(self.output_gain_db);

        let grid = engine.grid();
        grid.clear();
        for (name, pattern) in &self.patterns {
            let lane = Lane::from_name(name)
                .with_context(|| format!("Unknown lane {:?} in session patterns", name))?;
            grid.set_lane_pattern(lane, pattern)
                .with_context(|| format!("Invalid pattern for lane {}", lane.name()))?;
            log::debug!("Session: {:>8} {}", lane.name(), grid.lane_pattern(lane));
        }
        Ok(())
    }
}

/// Simulated host transport for an offline render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Tempo reported to the engine; `null` simulates a host without tempo
    /// Default: 120.0
    pub bpm: Option<f64>,
    /// Sample position of the first input frame; `null` simulates a host
    /// without a position, so the engine counts from zero itself
    /// Default: 0
    pub start_position: Option<i64>,
    /// Frames per processed block
    /// Default: 512
    pub block_size: usize,
    /// Append silence so delay and reverb tails ring out
    /// Default: true
    pub render_tail: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bpm: Some(120.0),
            start_position: Some(0),
            block_size: DEFAULT_BLOCK_SIZE,
            render_tail: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_applies() {
        let engine = StepFxEngine::default();
        SessionConfig::default().apply(&engine).unwrap();

        let grid = engine.grid();
        assert_eq!(grid.lane_pattern(Lane::Delay), "x...x...x...x...");
        assert_eq!(grid.lane_pattern(Lane::Filter), "xxxxxxxx........");
        assert_eq!(engine.params().mix(), DEFAULT_MIX);
    }

    #[test]
    fn test_yaml_session() {
        let yaml = r#"
transport:
  bpm: 140
  start_position: null
  block_size: 256
mix: 1.0
output_gain_db: -3
engine:
  bitcrush_persist_phase: true
patterns:
  Gate: "x.x. x.x. x.x. x.x."
  reverb: "...............x"
"#;
        let session: SessionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(session.transport.bpm, Some(140.0));
        assert_eq!(session.transport.start_position, None);
        assert!(session.transport.render_tail);
        assert!(session.engine.bitcrush_persist_phase);

        let engine = StepFxEngine::new(session.engine.clone());
        session.apply(&engine).unwrap();
        let grid = engine.grid();
        assert_eq!(grid.lane_pattern(Lane::Gate), "x.x.x.x.x.x.x.x.");
        assert_eq!(grid.lane_pattern(Lane::Reverb), "...............x");
        assert_eq!(grid.active_count(), 9);
        assert_eq!(engine.params().output_gain_db(), -3.0);
    }

    #[test]
    fn test_bad_patterns_are_reported() {
        let engine = StepFxEngine::default();

        let mut session = SessionConfig::default();
        session.patterns.insert("chorus".into(), "x...............".into());
        let err = session.apply(&engine).unwrap_err();
        assert!(err.to_string().contains("chorus"));

        let mut session = SessionConfig::default();
        session.patterns.insert("delay".into(), "x..".into());
        let err = session.apply(&engine).unwrap_err();
        assert!(format!("{:#}", err).contains("16 steps"));
    }
}
