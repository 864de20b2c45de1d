//! Transport scheduler
//!
//! Converts the host's tempo and absolute sample position into a position
//! inside the 16-step cycle. The computation is a pure function of its
//! inputs: the host may jump, loop or run backwards between blocks and the
//! slice is still exact for every block.

use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

use crate::types::{sanitize_sample_rate, DEFAULT_BPM, NUM_STEPS};

/// Upper bound on the step length in samples
///
/// Only reached for tempos far below anything musical; keeps cycle
/// arithmetic inside `i64`.
pub const MAX_STEP_LENGTH: usize = 1 << 40;

/// Steps per beat (1/16 notes in a quarter note)
const STEPS_PER_BEAT: f64 = 4.0;

/// Replace a non-finite or non-positive tempo with the default 120 BPM
#[inline]
pub fn sanitize_bpm(bpm: f64) -> f64 {
    if bpm.is_finite() && bpm > 0.0 {
        bpm
    } else {
        DEFAULT_BPM
    }
}

/// Length of one 1/16 step in samples, rounded to the nearest sample
///
/// Always at least 1 and at most `MAX_STEP_LENGTH`.
pub fn step_length_samples(bpm: f64, sample_rate: f64) -> usize {
    let bpm = sanitize_bpm(bpm);
    let sample_rate = sanitize_sample_rate(sample_rate);
    let step_seconds = (60.0 / bpm) / STEPS_PER_BEAT;
    // Float to int casts saturate, so huge values land on the upper clamp
    ((step_seconds * sample_rate).round() as usize).clamp(1, MAX_STEP_LENGTH)
}

/// Position of one block inside the step cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSlice {
    /// Tempo the slice was computed with (after sanitizing)
    pub bpm: f64,
    /// Sample rate the slice was computed with (after sanitizing)
    pub sample_rate: f64,
    /// Length of one step in samples (>= 1)
    pub step_length: usize,
    /// Step the block starts in, 0-15
    pub current_step: usize,
    /// Samples already elapsed in `current_step`, `< step_length`
    pub offset_in_step: usize,
}

impl TransportSlice {
    /// Compute the slice for an absolute sample position (may be negative)
    pub fn compute(bpm: f64, sample_rate: f64, position: i64) -> Self {
        let bpm = sanitize_bpm(bpm);
        let sample_rate = sanitize_sample_rate(sample_rate);
        let step_length = step_length_samples(bpm, sample_rate);
        let step_length_i = step_length as i64;

        // Euclidean division keeps step and offset non-negative before zero
        let step_count = position.div_euclid(step_length_i);
        let current_step = step_count.rem_euclid(NUM_STEPS as i64) as usize;
        let offset_in_step = position.rem_euclid(step_length_i) as usize;

        Self {
            bpm,
            sample_rate,
            step_length,
            current_step,
            offset_in_step,
        }
    }

    /// Length of the full 16-step cycle in samples
    pub fn cycle_length(&self) -> usize {
        self.step_length * NUM_STEPS
    }

    /// Position of the block start inside the cycle, in `[0, cycle_length)`
    pub fn cycle_position(&self) -> usize {
        self.current_step * self.step_length + self.offset_in_step
    }

    /// Step playing `frames` samples after the block start
    pub fn step_at(&self, frames: usize) -> usize {
        (self.current_step + (self.offset_in_step + frames) / self.step_length) % NUM_STEPS
    }
}

/// Compute the transport slice for one block
///
/// See `TransportSlice::compute`.
#[inline]
pub fn compute_slice(bpm: f64, sample_rate: f64, position: i64) -> TransportSlice {
    TransportSlice::compute(bpm, sample_rate, position)
}

/// Transport snapshot reported by the host for one block
///
/// `None` means the host could not report the value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostTransport {
    pub bpm: Option<f64>,
    pub position_samples: Option<i64>,
}

impl HostTransport {
    pub fn new(bpm: f64, position_samples: i64) -> Self {
        Self {
            bpm: Some(bpm),
            position_samples: Some(position_samples),
        }
    }

    /// A host that reports neither tempo nor position
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Reported tempo if usable, otherwise `fallback`
    pub fn resolved_bpm(&self, fallback: f64) -> f64 {
        match self.bpm {
            Some(bpm) if bpm.is_finite() && bpm > 0.0 => bpm,
            _ => sanitize_bpm(fallback),
        }
    }
}

/// Atomic transport state for control surface display
///
/// Written once per block by the audio thread, read by any thread.
/// All operations use `Ordering::Relaxed`: readers only need the latest
/// values, not consistency between fields.
#[derive(Debug)]
pub struct TransportAtomics {
    bpm_bits: AtomicU64,
    current_step: AtomicUsize,
    step_length: AtomicUsize,
    position: AtomicI64,
}

impl TransportAtomics {
    pub fn new() -> Self {
        Self {
            bpm_bits: AtomicU64::new(DEFAULT_BPM.to_bits()),
            current_step: AtomicUsize::new(0),
            step_length: AtomicUsize::new(1),
            position: AtomicI64::new(0),
        }
    }

    /// Publish the slice of the block that just started at `position`
    #[inline]
    pub fn publish(&self, slice: &TransportSlice, position: i64) {
        self.bpm_bits.store(slice.bpm.to_bits(), Ordering::Relaxed);
        self.current_step.store(slice.current_step, Ordering::Relaxed);
        self.step_length.store(slice.step_length, Ordering::Relaxed);
        self.position.store(position, Ordering::Relaxed);
    }

    /// Tempo of the last processed block
    pub fn bpm(&self) -> f64 {
        f64::from_bits(self.bpm_bits.load(Ordering::Relaxed))
    }

    /// Step the last processed block started in
    pub fn current_step(&self) -> usize {
        self.current_step.load(Ordering::Relaxed)
    }

    pub fn step_length(&self) -> usize {
        self.step_length.load(Ordering::Relaxed)
    }

    /// Sample position of the last processed block
    pub fn position(&self) -> i64 {
        self.position.load(Ordering::Relaxed)
    }
}

impl Default for TransportAtomics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_length_common_rates() {
        // 120 BPM: one step = 0.125 s
        assert_eq!(step_length_samples(120.0, 48000.0), 6000);
        assert_eq!(step_length_samples(120.0, 44100.0), 5513); // 5512.5 rounds up
        assert_eq!(step_length_samples(174.0, 44100.0), 3802); // 3801.72
        assert_eq!(step_length_samples(90.0, 96000.0), 16000);
    }

    #[test]
    fn test_step_length_is_rounded_and_positive() {
        for &bpm in &[1.0, 33.3, 60.0, 127.9, 200.0, 999.0, 1.0e7] {
            for &rate in &[8000.0, 22050.0, 44100.0, 48000.0, 192000.0] {
                let len = step_length_samples(bpm, rate);
                let expected = ((60.0 / bpm / 4.0) * rate).round().max(1.0) as usize;
                assert_eq!(len, expected, "bpm {} rate {}", bpm, rate);
                assert!(len >= 1);
            }
        }
    }

    #[test]
    fn test_degenerate_tempo_and_rate() {
        assert_eq!(sanitize_bpm(0.0), DEFAULT_BPM);
        assert_eq!(sanitize_bpm(-120.0), DEFAULT_BPM);
        assert_eq!(sanitize_bpm(f64::INFINITY), DEFAULT_BPM);
        assert_eq!(sanitize_bpm(f64::NAN), DEFAULT_BPM);

        let slice = compute_slice(f64::NAN, -1.0, 0);
        assert_eq!(slice.bpm, DEFAULT_BPM);
        assert_eq!(slice.step_length, step_length_samples(120.0, 44100.0));

        // Vanishing tempo clamps instead of overflowing
        assert_eq!(step_length_samples(1.0e-300, 48000.0), MAX_STEP_LENGTH);
        let slice = compute_slice(1.0e-300, 48000.0, -5);
        assert_eq!(slice.current_step, NUM_STEPS - 1);
        assert_eq!(slice.offset_in_step, MAX_STEP_LENGTH - 5);
    }

    #[test]
    fn test_slice_positions() {
        let slice = compute_slice(120.0, 48000.0, 0);
        assert_eq!((slice.current_step, slice.offset_in_step), (0, 0));

        let slice = compute_slice(120.0, 48000.0, 6000 * 3 + 17);
        assert_eq!((slice.current_step, slice.offset_in_step), (3, 17));

        // Wraps every 16 steps
        let slice = compute_slice(120.0, 48000.0, 6000 * 16 * 5 + 6000 * 15 + 5999);
        assert_eq!((slice.current_step, slice.offset_in_step), (15, 5999));
    }

    #[test]
    fn test_negative_positions() {
        let slice = compute_slice(120.0, 48000.0, -1);
        assert_eq!((slice.current_step, slice.offset_in_step), (15, 5999));

        let slice = compute_slice(120.0, 48000.0, -6000);
        assert_eq!((slice.current_step, slice.offset_in_step), (15, 0));

        let slice = compute_slice(120.0, 48000.0, -6001);
        assert_eq!((slice.current_step, slice.offset_in_step), (14, 5999));
    }

    #[test]
    fn test_slice_reconstructs_position() {
        let positions = [
            -10_000_000_007i64,
            -96_001,
            -96_000,
            -5_999,
            -1,
            0,
            1,
            5_999,
            96_000,
            123_456_789,
            i64::MAX / 2,
            i64::MIN / 2,
        ];
        for &(bpm, rate) in &[(120.0, 48000.0), (133.0, 44100.0), (87.5, 96000.0)] {
            for &position in &positions {
                let slice = compute_slice(bpm, rate, position);
                assert!(slice.current_step < NUM_STEPS);
                assert!(slice.offset_in_step < slice.step_length);

                let cycle = slice.cycle_length() as i128;
                let reconstructed = slice.cycle_position() as i128;
                assert_eq!(
                    (reconstructed - position as i128).rem_euclid(cycle),
                    0,
                    "bpm {} rate {} position {}",
                    bpm,
                    rate,
                    position
                );
            }
        }
    }

    #[test]
    fn test_step_at() {
        let slice = compute_slice(120.0, 48000.0, 6000 * 15 + 5990);
        assert_eq!(slice.step_at(0), 15);
        assert_eq!(slice.step_at(9), 15);
        assert_eq!(slice.step_at(10), 0);
        assert_eq!(slice.step_at(6010), 1);
    }

    #[test]
    fn test_host_transport_fallbacks() {
        assert_eq!(HostTransport::unavailable().resolved_bpm(120.0), 120.0);
        assert_eq!(HostTransport::new(140.0, 0).resolved_bpm(120.0), 140.0);
        let bad = HostTransport {
            bpm: Some(-3.0),
            position_samples: None,
        };
        assert_eq!(bad.resolved_bpm(95.0), 95.0);
        assert_eq!(bad.resolved_bpm(f64::NAN), DEFAULT_BPM);
    }

    #[test]
    fn test_transport_atomics_publish() {
        let atomics = TransportAtomics::new();
        assert_eq!(atomics.bpm(), DEFAULT_BPM);

        let slice = compute_slice(128.0, 48000.0, 50_000);
        atomics.publish(&slice, 50_000);
        assert_eq!(atomics.bpm(), 128.0);
        assert_eq!(atomics.current_step(), slice.current_step);
        assert_eq!(atomics.step_length(), slice.step_length);
        assert_eq!(atomics.position(), 50_000);
    }
}
