//! Lock-free engine parameters
//!
//! The two automatable parameters are stored as `f32` bit patterns in
//! `AtomicU32` so a control thread can write them while the audio thread
//! reads them once per block. Values are clamped on write.

use std::sync::atomic::{AtomicU32, Ordering};

/// Wet/dry mix range and default
pub const MIN_MIX: f32 = 0.0;
pub const MAX_MIX: f32 = 1.0;
pub const DEFAULT_MIX: f32 = 0.5;

/// Output gain range and default, in dB
pub const MIN_OUTPUT_GAIN_DB: f32 = -24.0;
pub const MAX_OUTPUT_GAIN_DB: f32 = 24.0;
pub const DEFAULT_OUTPUT_GAIN_DB: f32 = 0.0;

/// Clamp to a range, replacing NaN with `default`
#[inline]
fn clamp_or(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_nan() {
        default
    } else {
        value.clamp(min, max)
    }
}

/// Shared wet/dry mix and output gain
///
/// All operations use `Ordering::Relaxed`; the two values are independent.
#[derive(Debug)]
pub struct EngineParams {
    mix: AtomicU32,
    output_gain_db: AtomicU32,
}

impl EngineParams {
    pub fn new() -> Self {
        Self {
            mix: AtomicU32::new(DEFAULT_MIX.to_bits()),
            output_gain_db: AtomicU32::new(DEFAULT_OUTPUT_GAIN_DB.to_bits()),
        }
    }

    /// Wet amount, 0.0 (dry) to 1.0 (wet)
    #[inline]
    pub fn mix(&self) -> f32 {
        f32::from_bits(self.mix.load(Ordering::Relaxed))
    }

    /// Set the wet amount (clamped to 0.0-1.0)
    pub fn set_mix(&self, mix: f32) {
        let mix = clamp_or(mix, MIN_MIX, MAX_MIX, DEFAULT_MIX);
        self.mix.store(mix.to_bits(), Ordering::Relaxed);
    }

    /// Output gain in dB
    #[inline]
    pub fn output_gain_db(&self) -> f32 {
        f32::from_bits(self.output_gain_db.load(Ordering::Relaxed))
    }

    /// Set the output gain (clamped to -24..+24 dB)
    pub fn set_output_gain_db(&self, db: f32) {
        let db = clamp_or(db, MIN_OUTPUT_GAIN_DB, MAX_OUTPUT_GAIN_DB, DEFAULT_OUTPUT_GAIN_DB);
        self.output_gain_db.store(db.to_bits(), Ordering::Relaxed);
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::new()
    }
}
