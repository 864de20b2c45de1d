//! Stutter effect - retriggers the first half of the sub-range

use crate::effect::{clip_range, Effect, EffectInfo};
use crate::types::{AudioBuffer, ProcessSpec};

/// Repeats the first half of the processed range across the whole range
///
/// With `half = max(1, len / 2)`, sample `i` of the range becomes sample
/// `i % half`. Stateless: each call only sees its own range.
pub struct StutterEffect {
    info: EffectInfo,
}

impl StutterEffect {
    pub fn new() -> Self {
        Self {
            info: EffectInfo::new("Stutter", "Rhythm"),
        }
    }
}

impl Default for StutterEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for StutterEffect {
    fn prepare(&mut self, _spec: &ProcessSpec) {}

    fn process(&mut self, buffer: &mut AudioBuffer, start: usize, len: usize) {
        let range = clip_range(buffer, start, len);
        if range.is_empty() {
            return;
        }
        let half = (range.len() / 2).max(1);
        for channel in buffer.channels_mut() {
            let segment = &mut channel[range.clone()];
            // Reads only come from the first half, which is never written
            for i in half..segment.len() {
                segment[i] = segment[i % half];
            }
        }
    }

    fn reset(&mut self) {}

    fn info(&self) -> &EffectInfo {
        &self.info
    }
}
