//! Common types for StepFX
//!
//! This module contains the fundamental audio types used throughout the
//! engine: the planar multi-channel buffer, the effect lane identifiers and
//! the processing spec handed to every unit on `prepare`.

use std::ops::{Index, IndexMut};

/// Sample rate assumed until the host prepares the engine
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Tempo used when the host cannot report one
pub const DEFAULT_BPM: f64 = 120.0;

/// Number of effect lanes (Gate, Stutter, Filter, Bitcrush, Delay, Reverb)
pub const NUM_LANES: usize = 6;

/// Number of steps in one sequencer cycle (one bar of 1/16 notes)
pub const NUM_STEPS: usize = 16;

/// Total number of cells in the step grid
pub const NUM_CELLS: usize = NUM_LANES * NUM_STEPS;

/// Block size used to pre-allocate working buffers before `prepare`
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Audio tail reported to hosts, in seconds (matches the delay capacity)
pub const TAIL_SECONDS: f64 = 2.0;

/// Audio sample type
pub type Sample = f32;

/// Effect lane identifiers, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Lane {
    Gate = 0,
    Stutter = 1,
    Filter = 2,
    Bitcrush = 3,
    Delay = 4,
    Reverb = 5,
}

impl Lane {
    /// All lanes in the order they are applied within a step
    pub const ALL: [Lane; NUM_LANES] = [
        Lane::Gate,
        Lane::Stutter,
        Lane::Filter,
        Lane::Bitcrush,
        Lane::Delay,
        Lane::Reverb,
    ];

    /// Convert from index (0-5) to Lane
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Row index of this lane in the step grid
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the name of this lane
    pub fn name(&self) -> &'static str {
        match self {
            Lane::Gate => "Gate",
            Lane::Stutter => "Stutter",
            Lane::Filter => "Filter",
            Lane::Bitcrush => "Bitcrush",
            Lane::Delay => "Delay",
            Lane::Reverb => "Reverb",
        }
    }

    /// Look up a lane by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|lane| lane.name().eq_ignore_ascii_case(name))
    }
}

/// Replace a non-finite or non-positive sample rate with the default
#[inline]
pub fn sanitize_sample_rate(sample_rate: f64) -> f64 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        DEFAULT_SAMPLE_RATE
    }
}

/// Processing parameters handed to the engine and every effect unit
///
/// Only the sample rate affects DSP; block size and channel count are
/// pre-allocation hints. Hosts may still deliver larger blocks or more
/// channels later, in which case working buffers grow once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f64,
    pub max_block_size: usize,
    pub num_channels: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f64, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }

    /// Sample rate with degenerate values replaced by the default
    #[inline]
    pub fn effective_sample_rate(&self) -> f64 {
        sanitize_sample_rate(self.sample_rate)
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_BLOCK_SIZE, 2)
    }
}

/// A planar multi-channel audio buffer
///
/// Each channel owns its own storage. The buffer exposes a working layout
/// (channel count and frame count) that can be changed without allocating
/// as long as it stays within the allocated storage, which lets the engine
/// keep one pre-allocated working copy for blocks of varying size.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    /// Channel storage; only the first `num_channels` are active
    channels: Vec<Vec<Sample>>,
    num_channels: usize,
    len: usize,
}

impl AudioBuffer {
    /// Create an empty buffer with storage for `num_channels` x `capacity` frames
    pub fn with_capacity(num_channels: usize, capacity: usize) -> Self {
        Self {
            channels: (0..num_channels).map(|_| vec![0.0; capacity]).collect(),
            num_channels,
            len: 0,
        }
    }

    /// Create a buffer filled with silence
    pub fn silence(num_channels: usize, len: usize) -> Self {
        Self {
            channels: vec![vec![0.0; len]; num_channels],
            num_channels,
            len,
        }
    }

    /// Create a buffer from separate channel vectors
    pub fn from_channels(channels: Vec<Vec<Sample>>) -> Self {
        let len = channels.first().map_or(0, Vec::len);
        assert!(
            channels.iter().all(|c| c.len() == len),
            "Channel lengths must match"
        );
        Self {
            num_channels: channels.len(),
            channels,
            len,
        }
    }

    /// Create a buffer from interleaved samples [c0, c1, ..., c0, c1, ...]
    pub fn from_interleaved(interleaved: &[Sample], num_channels: usize) -> Self {
        assert!(num_channels > 0, "Interleaved buffer needs at least one channel");
        assert!(
            interleaved.len() % num_channels == 0,
            "Interleaved length must be a multiple of the channel count"
        );
        let len = interleaved.len() / num_channels;
        let mut buffer = Self::silence(num_channels, len);
        for (frame_idx, frame) in interleaved.chunks_exact(num_channels).enumerate() {
            for (ch, &sample) in frame.iter().enumerate() {
                buffer.channels[ch][frame_idx] = sample;
            }
        }
        buffer
    }

    /// Copy samples to an interleaved output buffer
    pub fn to_interleaved(&self, output: &mut [Sample]) {
        assert!(output.len() >= self.len * self.num_channels);
        for (ch, channel) in self.channels().enumerate() {
            for (i, &sample) in channel.iter().enumerate() {
                output[i * self.num_channels + ch] = sample;
            }
        }
    }

    /// Number of active channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of frames in the working layout
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Frames available in every allocated channel
    pub fn capacity(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Whether `set_layout` with these dimensions would have to allocate
    pub fn needs_allocation(&self, num_channels: usize, len: usize) -> bool {
        num_channels > self.channels.len() || len > self.capacity()
    }

    /// Change the working layout, filling newly exposed samples with silence
    ///
    /// Real-time safe while `needs_allocation` is false; otherwise the
    /// storage grows once.
    pub fn set_layout(&mut self, num_channels: usize, len: usize) {
        if num_channels > self.channels.len() {
            let frames = self.capacity().max(len);
            self.channels.resize_with(num_channels, || vec![0.0; frames]);
        }
        for channel in self.channels.iter_mut() {
            if channel.len() < len {
                channel.resize(len, 0.0);
            }
        }

        let old_channels = self.num_channels;
        let old_len = self.len;
        for (ch, channel) in self.channels[..num_channels].iter_mut().enumerate() {
            if ch >= old_channels {
                channel[..len].fill(0.0);
            } else if len > old_len {
                channel[old_len..len].fill(0.0);
            }
        }

        self.num_channels = num_channels;
        self.len = len;
    }

    /// Set the working length, keeping the channel count
    #[inline]
    pub fn set_len_from_capacity(&mut self, len: usize) {
        self.set_layout(self.num_channels, len);
    }

    /// Get one channel's working samples
    #[inline]
    pub fn channel(&self, ch: usize) -> &[Sample] {
        assert!(ch < self.num_channels, "Channel {} out of range", ch);
        &self.channels[ch][..self.len]
    }

    /// Get one channel's working samples mutably
    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [Sample] {
        assert!(ch < self.num_channels, "Channel {} out of range", ch);
        let len = self.len;
        &mut self.channels[ch][..len]
    }

    /// Get two distinct channels mutably at once (`first < second`)
    pub fn channel_pair_mut(&mut self, first: usize, second: usize) -> (&mut [Sample], &mut [Sample]) {
        assert!(
            first < second && second < self.num_channels,
            "Invalid channel pair ({}, {})",
            first,
            second
        );
        let len = self.len;
        let (head, tail) = self.channels.split_at_mut(second);
        (&mut head[first][..len], &mut tail[0][..len])
    }

    /// Iterate over the active channels
    pub fn channels(&self) -> impl Iterator<Item = &[Sample]> + '_ {
        let len = self.len;
        self.channels[..self.num_channels].iter().map(move |c| &c[..len])
    }

    /// Iterate mutably over the active channels
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [Sample]> + '_ {
        let len = self.len;
        self.channels[..self.num_channels]
            .iter_mut()
            .map(move |c| &mut c[..len])
    }

    /// Fill the working layout with silence
    pub fn fill_silence(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(0.0);
        }
    }

    /// Scale all samples by a factor
    pub fn scale(&mut self, factor: Sample) {
        for channel in self.channels_mut() {
            for sample in channel.iter_mut() {
                *sample *= factor;
            }
        }
    }

    /// Copy layout and content from another buffer
    ///
    /// Does not allocate when `self` already has storage for `other`'s layout.
    pub fn copy_from(&mut self, other: &AudioBuffer) {
        self.set_layout(other.num_channels, other.len);
        for (dst, src) in self.channels_mut().zip(other.channels()) {
            dst.copy_from_slice(src);
        }
    }

    /// Copy `len` frames from `src[src_start..]` into `self[dst_start..]`
    ///
    /// Channels missing from either side are skipped.
    pub fn copy_frames_from(&mut self, src: &AudioBuffer, src_start: usize, dst_start: usize, len: usize) {
        for (dst, src) in self.channels_mut().zip(src.channels()) {
            dst[dst_start..dst_start + len].copy_from_slice(&src[src_start..src_start + len]);
        }
    }

    /// Get the peak amplitude in the buffer
    pub fn peak(&self) -> Sample {
        self.channels()
            .flat_map(|c| c.iter())
            .map(|s| s.abs())
            .fold(0.0, Sample::max)
    }
}

impl Index<usize> for AudioBuffer {
    type Output = [Sample];

    #[inline]
    fn index(&self, ch: usize) -> &Self::Output {
        self.channel(ch)
    }
}

impl IndexMut<usize> for AudioBuffer {
    #[inline]
    fn index_mut(&mut self, ch: usize) -> &mut Self::Output {
        self.channel_mut(ch)
    }
}
