//! Dry/wet mix and output gain stage

use crate::types::{AudioBuffer, Sample};

/// Convert decibels to a linear gain factor
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Blends the dry input with the processed signal and applies output gain
///
/// `out = (dry * (1 - wet) + processed * wet) * gain`. Range checks on the
/// parameters are left to `EngineParams`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixStage {
    wet: Sample,
    gain: Sample,
}

impl MixStage {
    /// Create a stage from a wet ratio and an output gain in dB
    pub fn new(wet: f32, gain_db: f32) -> Self {
        Self {
            wet,
            gain: db_to_gain(gain_db),
        }
    }

    pub fn wet(&self) -> Sample {
        self.wet
    }

    /// Linear output gain
    pub fn gain(&self) -> Sample {
        self.gain
    }

    /// Mix `processed` into `dry`, which becomes the output
    ///
    /// Both buffers must share the same layout.
    pub fn apply(&self, dry: &mut AudioBuffer, processed: &AudioBuffer) {
        debug_assert_eq!(dry.num_channels(), processed.num_channels());
        debug_assert_eq!(dry.len(), processed.len());
        let dry_amount = 1.0 - self.wet;
        for (out, wet) in dry.channels_mut().zip(processed.channels()) {
            for (sample, &wet_sample) in out.iter_mut().zip(wet.iter()) {
                *sample = (*sample * dry_amount + wet_sample * self.wet) * self.gain;
            }
        }
    }
}
