//! Engine behaviour settings

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_BPM;

/// Settings fixed when the engine is built
///
/// Unlike the wet/dry mix and output gain, these are not automatable and
/// are not part of the persisted engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Carry the bitcrusher's hold value and decimation phase across
    /// sub-ranges and blocks instead of restarting it on every step.
    /// Default: false
    pub bitcrush_persist_phase: bool,

    /// Tempo used when the host does not report one.
    /// Default: 120.0 BPM
    pub fallback_bpm: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            bitcrush_persist_phase: false,
            fallback_bpm: DEFAULT_BPM,
        }
    }
}
