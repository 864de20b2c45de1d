//! Reverse effect - plays the sub-range backwards

use crate::effect::{clip_range, Effect, EffectInfo};
use crate::types::{AudioBuffer, ProcessSpec};

/// Mirrors the processed range in place on every channel
pub struct ReverseEffect {
    info: EffectInfo,
}

impl ReverseEffect {
    pub fn new() -> Self {
        Self {
            info: EffectInfo::new("Reverse", "Rhythm"),
        }
    }
}

impl Default for ReverseEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for ReverseEffect {
    fn prepare(&mut self, _spec: &ProcessSpec) {}

    fn process(&mut self, buffer: &mut AudioBuffer, start: usize, len: usize) {
        let range = clip_range(buffer, start, len);
        for channel in buffer.channels_mut() {
            channel[range.clone()].reverse();
        }
    }

    fn reset(&mut self) {}

    fn info(&self) -> &EffectInfo {
        &self.info
    }
}
