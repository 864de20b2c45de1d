//! Gate effect - mutes the sub-range

use crate::effect::{clip_range, Effect, EffectInfo};
use crate::types::{AudioBuffer, ProcessSpec};

/// Writes silence over the processed range on every channel
pub struct GateEffect {
    info: EffectInfo,
}

impl GateEffect {
    pub fn new() -> Self {
        Self {
            info: EffectInfo::new("Gate", "Dynamics"),
        }
    }
}

impl Default for GateEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for GateEffect {
    fn prepare(&mut self, _spec: &ProcessSpec) {}

    fn process(&mut self, buffer: &mut AudioBuffer, start: usize, len: usize) {
        let range = clip_range(buffer, start, len);
        for channel in buffer.channels_mut() {
            channel[range.clone()].fill(0.0);
        }
    }

    fn reset(&mut self) {}

    fn info(&self) -> &EffectInfo {
        &self.info
    }
}
