//! Effect system - the unit trait and the fixed lane chain
//!
//! Every lane of the step grid owns exactly one effect unit. Units process
//! arbitrary sub-ranges of a block in place, so a block that spans several
//! steps is handed to a unit in several pieces. Stateful units (delay,
//! filter, reverb) carry their state across those pieces as if the signal
//! had been processed in one call.

pub mod chain;
pub mod native;

pub use chain::LaneChain;

use std::ops::Range;

use crate::types::{AudioBuffer, ProcessSpec};

/// Information about an effect
#[derive(Debug, Clone)]
pub struct EffectInfo {
    /// Effect name for display
    pub name: String,
    /// Effect category (e.g., "Filter", "Delay", "Reverb")
    pub category: String,
}

impl EffectInfo {
    /// Create a new effect info
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// The core effect trait - implemented by every lane unit
///
/// All methods are called from the audio thread, one at a time. `process`
/// must not allocate and must not touch samples outside the requested range.
pub trait Effect: Send {
    /// Size internal state for the given spec and clear it
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Process `[start, start + len)` of every channel in place
    ///
    /// Ranges extending past the buffer are clipped; a zero-length range is
    /// a no-op.
    fn process(&mut self, buffer: &mut AudioBuffer, start: usize, len: usize);

    /// React to a tempo change (called once per block before processing)
    fn set_tempo(&mut self, _bpm: f64) {}

    /// Clear internal state (delay lines, filter memory)
    fn reset(&mut self);

    /// Get information about this effect (name, category)
    fn info(&self) -> &EffectInfo;
}

/// Clip a requested sub-range to the buffer's frame count
#[inline]
pub(crate) fn clip_range(buffer: &AudioBuffer, start: usize, len: usize) -> Range<usize> {
    let frames = buffer.len();
    let start = start.min(frames);
    let end = start.saturating_add(len).min(frames);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_info() {
        let info = EffectInfo::new("Test Effect", "Filter");
        assert_eq!(info.name, "Test Effect");
        assert_eq!(info.category, "Filter");
    }

    #[test]
    fn test_clip_range() {
        let buffer = AudioBuffer::silence(2, 10);
        assert_eq!(clip_range(&buffer, 2, 3), 2..5);
        assert_eq!(clip_range(&buffer, 8, 5), 8..10);
        assert_eq!(clip_range(&buffer, 12, 1), 10..10);
        assert_eq!(clip_range(&buffer, 4, 0), 4..4);
        assert_eq!(clip_range(&buffer, 3, usize::MAX), 3..10);
    }
}
