//! Block dispatcher
//!
//! Splits one block into contiguous sub-ranges that never cross a step
//! boundary and applies the lanes enabled for each sub-range's step.

use super::grid::StepGrid;
use super::transport::TransportSlice;
use crate::effect::LaneChain;
use crate::types::{AudioBuffer, NUM_STEPS};

/// A run of samples inside one block that belongs to a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRange {
    /// First frame, relative to the block start
    pub start: usize,
    /// Number of frames (always > 0 when produced by `StepSlices`)
    pub len: usize,
    /// Step the frames belong to, 0-15
    pub step: usize,
}

impl SubRange {
    /// One past the last frame
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Iterator over the step-bounded sub-ranges of a block
///
/// Sub-ranges are contiguous, non-overlapping and tile `[0, num_samples)`
/// exactly. Every boundary except the block edges lies on a step boundary.
#[derive(Debug, Clone)]
pub struct StepSlices {
    step_length: usize,
    current_step: usize,
    offset_in_step: usize,
    num_samples: usize,
    processed: usize,
}

impl StepSlices {
    pub fn new(slice: &TransportSlice, num_samples: usize) -> Self {
        Self {
            step_length: slice.step_length.max(1),
            current_step: slice.current_step,
            offset_in_step: slice.offset_in_step,
            num_samples,
            processed: 0,
        }
    }
}

impl Iterator for StepSlices {
    type Item = SubRange;

    fn next(&mut self) -> Option<SubRange> {
        if self.processed >= self.num_samples {
            return None;
        }
        let phase = self.offset_in_step + self.processed;
        let step_remaining = self.step_length - phase % self.step_length;
        let len = step_remaining.min(self.num_samples - self.processed);
        let step = (self.current_step + phase / self.step_length) % NUM_STEPS;

        let sub = SubRange {
            start: self.processed,
            len,
            step,
        };
        self.processed += len;
        Some(sub)
    }
}

/// Run the lane chain over one block according to the grid
///
/// Returns the number of sub-ranges the block was split into.
pub fn dispatch_block(
    buffer: &mut AudioBuffer,
    slice: &TransportSlice,
    grid: &StepGrid,
    chain: &mut LaneChain,
) -> usize {
    let mut sub_ranges = 0;
    for sub in StepSlices::new(slice, buffer.len()) {
        chain.process_sub_range(buffer, &sub, grid);
        sub_ranges += 1;
    }
    sub_ranges
}
