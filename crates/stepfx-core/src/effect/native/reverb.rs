//! Freeverb-style reverb
//!
//! Each pair of channels is processed by one stereo tank:
//! - 8 parallel damped comb filters per side
//! - 4 series all-pass filters per side for diffusion
//! - Right side delay lines offset by a fixed stereo spread
//!
//! An odd trailing channel gets its own tank and is processed mono. Tank
//! state is carried across calls, so sub-range splits do not change the
//! output.

use crate::effect::{clip_range, Effect, EffectInfo};
use crate::types::{AudioBuffer, ProcessSpec};

/// Comb filter delay line lengths (in samples at 44.1kHz)
const COMB_LENGTHS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass filter delay line lengths (in samples at 44.1kHz)
const ALLPASS_LENGTHS: [usize; 4] = [556, 441, 341, 225];

/// Right channel offset (in samples at 44.1kHz)
const STEREO_SPREAD: usize = 23;

/// Rate the delay line lengths are tuned for
const REFERENCE_RATE: f64 = 44100.0;

/// Input attenuation before the comb bank
const FIXED_GAIN: f32 = 0.015;
const SCALE_WET: f32 = 3.0;
const SCALE_DRY: f32 = 2.0;
const SCALE_DAMP: f32 = 0.4;
const SCALE_ROOM: f32 = 0.28;
const OFFSET_ROOM: f32 = 0.7;
const ALLPASS_FEEDBACK: f32 = 0.5;

/// User-facing reverb settings, all in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbSettings {
    pub room_size: f32,
    pub damping: f32,
    pub wet_level: f32,
    pub dry_level: f32,
    pub width: f32,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            room_size: 0.35,
            damping: 0.3,
            wet_level: 0.25,
            dry_level: 0.75,
            width: 0.9,
        }
    }
}

/// Gains derived from `ReverbSettings`
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    feedback: f32,
    damp: f32,
    wet1: f32,
    wet2: f32,
    dry: f32,
}

impl Coefficients {
    fn from_settings(settings: &ReverbSettings) -> Self {
        let wet = settings.wet_level.clamp(0.0, 1.0) * SCALE_WET;
        let width = settings.width.clamp(0.0, 1.0);
        Self {
            feedback: settings.room_size.clamp(0.0, 1.0) * SCALE_ROOM + OFFSET_ROOM,
            damp: settings.damping.clamp(0.0, 1.0) * SCALE_DAMP,
            wet1: 0.5 * wet * (1.0 + width),
            wet2: 0.5 * wet * (1.0 - width),
            dry: settings.dry_level.clamp(0.0, 1.0) * SCALE_DRY,
        }
    }
}

fn scaled_length(length: usize, sample_rate: f64) -> usize {
    ((length as f64 * sample_rate / REFERENCE_RATE) as usize).max(1)
}

/// Comb filter with a one-pole low-pass in the feedback path
struct CombFilter {
    buffer: Vec<f32>,
    pos: usize,
    filter_state: f32,
}

impl CombFilter {
    fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length],
            pos: 0,
            filter_state: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let output = self.buffer[self.pos];
        self.filter_state = output * (1.0 - damp) + self.filter_state * damp;
        self.buffer[self.pos] = input + self.filter_state * feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
        self.filter_state = 0.0;
    }
}

/// Schroeder all-pass for diffusion
struct AllpassFilter {
    buffer: Vec<f32>,
    pos: usize,
}

impl AllpassFilter {
    fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length],
            pos: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.buffer[self.pos];
        self.buffer[self.pos] = input + buffered * ALLPASS_FEEDBACK;
        self.pos = (self.pos + 1) % self.buffer.len();
        buffered - input
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

/// One side of a tank: comb bank followed by the all-pass chain
struct ReverbSide {
    combs: Vec<CombFilter>,
    allpasses: Vec<AllpassFilter>,
}

impl ReverbSide {
    fn new(sample_rate: f64, spread: usize) -> Self {
        Self {
            combs: COMB_LENGTHS
                .iter()
                .map(|&len| CombFilter::new(scaled_length(len + spread, sample_rate)))
                .collect(),
            allpasses: ALLPASS_LENGTHS
                .iter()
                .map(|&len| AllpassFilter::new(scaled_length(len + spread, sample_rate)))
                .collect(),
        }
    }

    #[inline]
    fn process(&mut self, input: f32, coeffs: &Coefficients) -> f32 {
        let mut out = 0.0;
        for comb in &mut self.combs {
            out += comb.process(input, coeffs.feedback, coeffs.damp);
        }
        for allpass in &mut self.allpasses {
            out = allpass.process(out);
        }
        out
    }

    fn reset(&mut self) {
        self.combs.iter_mut().for_each(CombFilter::reset);
        self.allpasses.iter_mut().for_each(AllpassFilter::reset);
    }
}

/// Stereo reverb network for one channel pair
struct Tank {
    left: ReverbSide,
    right: ReverbSide,
}

impl Tank {
    fn new(sample_rate: f64) -> Self {
        Self {
            left: ReverbSide::new(sample_rate, 0),
            right: ReverbSide::new(sample_rate, STEREO_SPREAD),
        }
    }

    #[inline]
    fn process_stereo(&mut self, l: f32, r: f32, coeffs: &Coefficients) -> (f32, f32) {
        let input = (l + r) * FIXED_GAIN;
        let out_l = self.left.process(input, coeffs);
        let out_r = self.right.process(input, coeffs);
        (
            out_l * coeffs.wet1 + out_r * coeffs.wet2 + l * coeffs.dry,
            out_r * coeffs.wet1 + out_l * coeffs.wet2 + r * coeffs.dry,
        )
    }

    #[inline]
    fn process_mono(&mut self, x: f32, coeffs: &Coefficients) -> f32 {
        let out = self.left.process(x * FIXED_GAIN, coeffs);
        out * coeffs.wet1 + x * coeffs.dry
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

/// Freeverb-style reverb with fixed settings
pub struct ReverbEffect {
    info: EffectInfo,
    settings: ReverbSettings,
    coeffs: Coefficients,
    sample_rate: f64,
    /// One tank per channel pair (plus one for an odd trailing channel)
    tanks: Vec<Tank>,
}

impl ReverbEffect {
    /// Create a reverb with the default settings
    pub fn new() -> Self {
        Self::with_settings(ReverbSettings::default())
    }

    pub fn with_settings(settings: ReverbSettings) -> Self {
        let mut effect = Self {
            info: EffectInfo::new("Reverb", "Reverb"),
            settings,
            coeffs: Coefficients::from_settings(&settings),
            sample_rate: 0.0,
            tanks: Vec::new(),
        };
        effect.prepare(&ProcessSpec::default());
        effect
    }

    pub fn settings(&self) -> &ReverbSettings {
        &self.settings
    }

    fn tanks_for(num_channels: usize) -> usize {
        num_channels.div_ceil(2)
    }
}

impl Default for ReverbEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for ReverbEffect {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.effective_sample_rate();
        let sample_rate = self.sample_rate;
        self.tanks = (0..Self::tanks_for(spec.num_channels))
            .map(|_| Tank::new(sample_rate))
            .collect();
        log::debug!(
            "ReverbEffect: prepared {} tanks at {} Hz",
            self.tanks.len(),
            sample_rate
        );
    }

    fn process(&mut self, buffer: &mut AudioBuffer, start: usize, len: usize) {
        let range = clip_range(buffer, start, len);
        if range.is_empty() {
            return;
        }
        let num_channels = buffer.num_channels();
        let needed = Self::tanks_for(num_channels);
        if self.tanks.len() < needed {
            log::debug!("ReverbEffect: growing from {} to {} tanks", self.tanks.len(), needed);
            let sample_rate = self.sample_rate;
            self.tanks.resize_with(needed, || Tank::new(sample_rate));
        }

        let coeffs = self.coeffs;
        for pair in 0..num_channels / 2 {
            let tank = &mut self.tanks[pair];
            let (left, right) = buffer.channel_pair_mut(2 * pair, 2 * pair + 1);
            for i in range.clone() {
                let (l, r) = tank.process_stereo(left[i], right[i], &coeffs);
                left[i] = l;
                right[i] = r;
            }
        }

        if num_channels % 2 == 1 {
            let tank = &mut self.tanks[num_channels / 2];
            for sample in &mut buffer.channel_mut(num_channels - 1)[range] {
                *sample = tank.process_mono(*sample, &coeffs);
            }
        }
    }

    fn reset(&mut self) {
        self.tanks.iter_mut().for_each(Tank::reset);
    }

    fn info(&self) -> &EffectInfo {
        &self.info
    }
}
