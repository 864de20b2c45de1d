//! Bitcrush effect - 2x decimation with 7-bit quantization
//!
//! Every second input sample is held for one extra sample and the held value
//! is quantized to 127 levels per polarity.
//!
//! By default the hold state restarts on every call, so the decimation
//! pattern is aligned to each sub-range. With `persist_phase` the held value
//! and decimation phase are kept per channel, which makes the output
//! independent of how a block is split into steps.

use crate::effect::{clip_range, Effect, EffectInfo};
use crate::types::{AudioBuffer, ProcessSpec, Sample};

/// Decimation factor (input samples per held value)
const DECIMATION: usize = 2;

/// Quantization levels per polarity
const LEVELS: Sample = 127.0;

#[derive(Debug, Clone, Copy, Default)]
struct HoldState {
    value: Sample,
    phase: usize,
}

/// Sample-and-hold decimator with amplitude quantization
pub struct BitcrushEffect {
    info: EffectInfo,
    persist_phase: bool,
    /// Per-channel hold state, only used with `persist_phase`
    holds: Vec<HoldState>,
}

impl BitcrushEffect {
    /// Create a bitcrusher that restarts its hold state on every call
    pub fn new() -> Self {
        Self::with_persist_phase(false)
    }

    /// Create a bitcrusher, optionally carrying hold state across calls
    pub fn with_persist_phase(persist_phase: bool) -> Self {
        Self {
            info: EffectInfo::new("Bitcrush", "Distortion"),
            persist_phase,
            holds: Vec::new(),
        }
    }

    pub fn persist_phase(&self) -> bool {
        self.persist_phase
    }
}

impl Default for BitcrushEffect {
    fn default() -> Self {
        Self::new()
    }
}

/// Quantize a sample to `LEVELS` steps per polarity after clamping to [-1, 1]
#[inline]
fn quantize(sample: Sample) -> Sample {
    (sample.clamp(-1.0, 1.0) * LEVELS).round() / LEVELS
}

impl Effect for BitcrushEffect {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.holds = vec![HoldState::default(); spec.num_channels];
    }

    fn process(&mut self, buffer: &mut AudioBuffer, start: usize, len: usize) {
        let range = clip_range(buffer, start, len);
        if range.is_empty() {
            return;
        }
        if self.persist_phase && self.holds.len() < buffer.num_channels() {
            self.holds.resize(buffer.num_channels(), HoldState::default());
        }

        for (ch, channel) in buffer.channels_mut().enumerate() {
            let mut hold = if self.persist_phase {
                self.holds[ch]
            } else {
                HoldState::default()
            };

            for sample in &mut channel[range.clone()] {
                if hold.phase == 0 {
                    hold.value = *sample;
                }
                *sample = quantize(hold.value);
                hold.phase = (hold.phase + 1) % DECIMATION;
            }

            if self.persist_phase {
                self.holds[ch] = hold;
            }
        }
    }

    fn reset(&mut self) {
        self.holds.fill(HoldState::default());
    }

    fn info(&self) -> &EffectInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(len: usize) -> AudioBuffer {
        AudioBuffer::from_channels(vec![
            (0..len).map(|i| ((i as f32) * 0.37).sin() * 0.9).collect(),
            (0..len).map(|i| ((i as f32) * 0.11).cos() * 1.4).collect(),
        ])
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0.0), 0.0);
        assert_eq!(quantize(1.0), 1.0);
        assert_eq!(quantize(2.5), 1.0);
        assert_eq!(quantize(-3.0), -1.0);
        assert_eq!(quantize(0.5), 64.0 / 127.0);
    }

    #[test]
    fn test_bitcrush_holds_every_second_sample() {
        let mut crush = BitcrushEffect::new();
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.1, 0.9, -0.5, 0.3, 0.7]]);
        crush.process(&mut buffer, 0, 5);
        let expected = [quantize(0.1), quantize(0.1), quantize(-0.5), quantize(-0.5), quantize(0.7)];
        assert_eq!(buffer[0], expected);
    }

    #[test]
    fn test_bitcrush_output_is_quantized_and_bounded() {
        let mut crush = BitcrushEffect::new();
        let mut buffer = signal(256);
        crush.process(&mut buffer, 0, 256);
        for channel in buffer.channels() {
            for &s in channel {
                assert!((-1.0..=1.0).contains(&s));
                let steps = s * LEVELS;
                assert!((steps - steps.round()).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_bitcrush_resets_phase_per_call_by_default() {
        let mut crush = BitcrushEffect::new();
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.1, 0.2, 0.3, 0.4]]);
        crush.process(&mut buffer, 0, 1);
        crush.process(&mut buffer, 1, 3);
        // Second call starts a fresh hold at sample 1
        assert_eq!(buffer[0], [quantize(0.1), quantize(0.2), quantize(0.2), quantize(0.4)]);
    }

    #[test]
    fn test_bitcrush_persistent_phase_is_split_invariant() {
        let whole_input = signal(300);

        let mut whole = whole_input.clone();
        let mut crush = BitcrushEffect::with_persist_phase(true);
        crush.prepare(&ProcessSpec::default());
        crush.process(&mut whole, 0, 300);

        let mut split = whole_input.clone();
        let mut crush = BitcrushEffect::with_persist_phase(true);
        crush.prepare(&ProcessSpec::default());
        let mut start = 0;
        for len in [1usize, 7, 64, 3, 125, 100] {
            crush.process(&mut split, start, len);
            start += len;
        }
        assert_eq!(start, 300);

        assert_eq!(whole[0], split[0]);
        assert_eq!(whole[1], split[1]);
    }

    #[test]
    fn test_bitcrush_persistent_phase_spans_calls() {
        let mut crush = BitcrushEffect::with_persist_phase(true);
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.1, 0.2, 0.3, 0.4]]);
        crush.process(&mut buffer, 0, 1);
        crush.process(&mut buffer, 1, 3);
        assert_eq!(buffer[0], [quantize(0.1), quantize(0.1), quantize(0.3), quantize(0.3)]);

        crush.reset();
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.5, 0.6]]);
        crush.process(&mut buffer, 0, 2);
        assert_eq!(buffer[0], [quantize(0.5), quantize(0.5)]);
    }

    #[test]
    fn test_bitcrush_untouched_outside_range() {
        let mut crush = BitcrushEffect::new();
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.123, 0.456, 0.789, 0.321]]);
        crush.process(&mut buffer, 1, 2);
        assert_eq!(buffer[0][0], 0.123);
        assert_eq!(buffer[0][3], 0.321);
    }
}
