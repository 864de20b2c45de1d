//! Resonant ladder low-pass filter
//!
//! A 4-pole (24 dB/octave) ladder: four cascaded one-pole low-pass stages
//! with resonance feedback from the last stage and a tanh-saturated input.
//! Each channel keeps its own stage memory, so processing a signal in
//! several sub-ranges gives exactly the same output as one call.

use std::f64::consts::PI;

use crate::effect::{clip_range, Effect, EffectInfo};
use crate::types::{AudioBuffer, ProcessSpec, Sample};

/// Default cutoff frequency in Hz
pub const DEFAULT_CUTOFF_HZ: f32 = 1200.0;

/// Default resonance (0.0-1.0)
pub const DEFAULT_RESONANCE: f32 = 0.5;

/// Default input drive (linear gain into the saturator)
pub const DEFAULT_DRIVE: f32 = 1.0;

/// Resonance 1.0 maps to this feedback amount (self-oscillation threshold)
const MAX_FEEDBACK: f32 = 4.0;

/// Share of the input added back to the feedback path to restore passband gain
const PASSBAND_COMPENSATION: f32 = 0.5;

/// Stage memory for one channel
#[derive(Debug, Clone, Copy, Default)]
struct LadderState {
    stages: [f32; 4],
}

impl LadderState {
    #[inline]
    fn process(&mut self, input: Sample, g: f32, feedback: f32, drive: f32) -> Sample {
        let driven = drive * (input - feedback * (self.stages[3] - PASSBAND_COMPENSATION * input));
        let mut x = driven.tanh();
        for stage in &mut self.stages {
            *stage += g * (x - *stage);
            x = *stage;
        }
        x
    }
}

/// Four-pole resonant low-pass with per-channel state
pub struct LadderFilterEffect {
    info: EffectInfo,
    sample_rate: f64,
    cutoff_hz: f32,
    resonance: f32,
    drive: f32,
    /// One-pole coefficient derived from cutoff and sample rate
    g: f32,
    states: Vec<LadderState>,
}

impl LadderFilterEffect {
    /// Create a filter with the default settings (1200 Hz, resonance 0.5, drive 1.0)
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_CUTOFF_HZ, DEFAULT_RESONANCE, DEFAULT_DRIVE)
    }

    /// Create a filter with explicit cutoff (Hz), resonance (0-1) and drive
    pub fn with_settings(cutoff_hz: f32, resonance: f32, drive: f32) -> Self {
        let mut effect = Self {
            info: EffectInfo::new("Ladder Filter", "Filter"),
            sample_rate: 0.0,
            cutoff_hz: cutoff_hz.max(20.0),
            resonance: resonance.clamp(0.0, 1.0),
            drive: drive.max(0.0),
            g: 0.0,
            states: Vec::new(),
        };
        effect.prepare(&ProcessSpec::default());
        effect
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    fn update_coefficients(&mut self) {
        // Keep the cutoff below Nyquist so the one-pole stages stay stable
        let cutoff = (self.cutoff_hz as f64).min(0.45 * self.sample_rate);
        self.g = (1.0 - (-2.0 * PI * cutoff / self.sample_rate).exp()) as f32;
    }
}

impl Default for LadderFilterEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for LadderFilterEffect {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.effective_sample_rate();
        self.states = vec![LadderState::default(); spec.num_channels];
        self.update_coefficients();
    }

    fn process(&mut self, buffer: &mut AudioBuffer, start: usize, len: usize) {
        let range = clip_range(buffer, start, len);
        if range.is_empty() {
            return;
        }
        if self.states.len() < buffer.num_channels() {
            self.states.resize(buffer.num_channels(), LadderState::default());
        }

        let g = self.g;
        let feedback = self.resonance * MAX_FEEDBACK;
        let drive = self.drive;

        for (channel, state) in buffer.channels_mut().zip(self.states.iter_mut()) {
            for sample in &mut channel[range.clone()] {
                *sample = state.process(*sample, g, feedback, drive);
            }
        }
    }

    fn reset(&mut self) {
        self.states.fill(LadderState::default());
    }

    fn info(&self) -> &EffectInfo {
        &self.info
    }
}
