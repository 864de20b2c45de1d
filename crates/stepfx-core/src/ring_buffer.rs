//! Fixed-capacity circular sample buffer
//!
//! Write-then-delayed-read delay line storage. The buffer never reallocates
//! while processing; `resize` is only called from `prepare`.

use crate::types::Sample;

/// Single-channel circular buffer with one write cursor
#[derive(Debug, Clone)]
pub struct CircularBuffer {
    buffer: Vec<Sample>,
    write_pos: usize,
}

impl CircularBuffer {
    /// Create a zeroed buffer holding `capacity` samples (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    /// Number of samples the buffer holds
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Index the next `write` will store to
    #[inline]
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Read the sample written `delay` writes ago
    ///
    /// `delay` is clamped to `[1, capacity]`. A delay equal to the capacity
    /// returns the oldest sample, which the next write overwrites.
    #[inline]
    pub fn read_delayed(&self, delay: usize) -> Sample {
        let capacity = self.buffer.len();
        let delay = delay.clamp(1, capacity);
        let read_pos = if self.write_pos >= delay {
            self.write_pos - delay
        } else {
            capacity - (delay - self.write_pos)
        };
        self.buffer[read_pos]
    }

    /// Store a sample and advance the cursor
    #[inline]
    pub fn write(&mut self, sample: Sample) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Zero the contents and rewind the cursor
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Reallocate to a new capacity, discarding the contents
    pub fn resize(&mut self, capacity: usize) {
        self.buffer = vec![0.0; capacity.max(1)];
        self.write_pos = 0;
    }
}
