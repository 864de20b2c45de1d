//! StepFX Core - step-sequenced multi-effect engine
//!
//! A 16-step, 6-lane grid decides which effect units run on each 1/16 note
//! of the host's timeline. The engine slices every audio block at step
//! boundaries, runs the enabled lanes on a wet copy and mixes it back with
//! the dry signal.

pub mod config;
pub mod effect;
pub mod engine;
pub mod ring_buffer;
pub mod sequencer;
pub mod state;
pub mod types;

pub use types::*;
