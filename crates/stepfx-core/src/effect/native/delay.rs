//! Tempo-synced feedback delay
//!
//! An eighth-note delay with:
//! - One circular buffer and write cursor per channel
//! - Fixed feedback and dry/wet mix (0.35 each by default)
//! - Delay time recomputed whenever the tempo changes
//!
//! The buffers hold `MAX_DELAY_SECONDS` at the prepared sample rate, so very
//! slow tempos clamp the delay to the buffer capacity.

use crate::effect::{clip_range, Effect, EffectInfo};
use crate::ring_buffer::CircularBuffer;
use crate::sequencer::sanitize_bpm;
use crate::types::{AudioBuffer, ProcessSpec, Sample, DEFAULT_BPM, TAIL_SECONDS};

/// Maximum delay time in seconds
const MAX_DELAY_SECONDS: f64 = TAIL_SECONDS;

/// Default feedback amount
pub const DEFAULT_FEEDBACK: Sample = 0.35;

/// Default wet amount
pub const DEFAULT_MIX: Sample = 0.35;

/// Delay time as a fraction of one beat (an eighth note)
const BEAT_FRACTION: f64 = 0.5;

/// Per-channel feedback delay synced to the host tempo
pub struct DelayEffect {
    info: EffectInfo,
    lines: Vec<CircularBuffer>,
    sample_rate: f64,
    bpm: f64,
    delay_samples: usize,
    feedback: Sample,
    mix: Sample,
}

impl DelayEffect {
    /// Create a delay with the default feedback and mix
    pub fn new() -> Self {
        Self::with_levels(DEFAULT_FEEDBACK, DEFAULT_MIX)
    }

    /// Create a delay with explicit feedback and wet amounts (both clamped to [0, 1])
    pub fn with_levels(feedback: Sample, mix: Sample) -> Self {
        let mut effect = Self {
            info: EffectInfo::new("Delay", "Delay"),
            lines: Vec::new(),
            sample_rate: 0.0,
            bpm: DEFAULT_BPM,
            delay_samples: 1,
            feedback: feedback.clamp(0.0, 1.0),
            mix: mix.clamp(0.0, 1.0),
        };
        effect.prepare(&ProcessSpec::default());
        effect
    }

    /// Capacity of each channel's buffer in samples
    pub fn capacity(&self) -> usize {
        ((MAX_DELAY_SECONDS * self.sample_rate) as usize).max(1)
    }

    /// Current delay time in samples
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    fn update_delay_time(&mut self) {
        let seconds_per_beat = 60.0 / self.bpm;
        let samples = (BEAT_FRACTION * seconds_per_beat * self.sample_rate) as usize;
        self.delay_samples = samples.clamp(1, self.capacity());
    }
}

impl Default for DelayEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for DelayEffect {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.effective_sample_rate();
        let capacity = self.capacity();
        let channels = spec.num_channels.max(1);
        self.lines = (0..channels).map(|_| CircularBuffer::new(capacity)).collect();
        self.update_delay_time();
        log::debug!(
            "DelayEffect: prepared {} lines of {} samples, delay {} samples",
            channels,
            capacity,
            self.delay_samples
        );
    }

    fn set_tempo(&mut self, bpm: f64) {
        let bpm = sanitize_bpm(bpm);
        if bpm != self.bpm {
            self.bpm = bpm;
            self.update_delay_time();
        }
    }

    fn process(&mut self, buffer: &mut AudioBuffer, start: usize, len: usize) {
        let range = clip_range(buffer, start, len);
        if range.is_empty() {
            return;
        }
        if self.lines.len() < buffer.num_channels() {
            log::debug!(
                "DelayEffect: growing from {} to {} channels",
                self.lines.len(),
                buffer.num_channels()
            );
            let capacity = self.capacity();
            self.lines
                .resize_with(buffer.num_channels(), || CircularBuffer::new(capacity));
        }

        let delay = self.delay_samples;
        let feedback = self.feedback;
        let mix = self.mix;
        let dry = 1.0 - mix;

        for (channel, line) in buffer.channels_mut().zip(self.lines.iter_mut()) {
            for sample in &mut channel[range.clone()] {
                let input = *sample;
                let delayed = line.read_delayed(delay);
                *sample = input * dry + delayed * mix;
                line.write(input + delayed * feedback);
            }
        }
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    fn info(&self) -> &EffectInfo {
        &self.info
    }
}
