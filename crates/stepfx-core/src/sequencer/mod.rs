//! Step sequencer - grid, transport scheduler and block dispatcher
//!
//! The scheduler maps the host's sample position and tempo to a position in
//! the 16-step cycle (`TransportSlice`). The dispatcher then walks a block
//! in step-bounded sub-ranges and hands each one to the lanes enabled for
//! its step.

mod dispatch;
mod error;
mod grid;
mod transport;

pub use dispatch::{dispatch_block, StepSlices, SubRange};
pub use error::{PatternError, PatternResult};
pub use grid::{parse_pattern, StepGrid};
pub use transport::{
    compute_slice, sanitize_bpm, step_length_samples, HostTransport, TransportAtomics,
    TransportSlice, MAX_STEP_LENGTH,
};
