//! Audio engine - parameters, mix stage and the step FX engine
//!
//! - EngineParams: lock-free wet/dry mix and output gain
//! - MixStage: dry/wet blend and output gain applied after the lanes
//! - StepFxEngine: scheduler, dispatcher, lane chain and mix per block

mod engine;
mod mix;
mod params;

pub use engine::*;
pub use mix::*;
pub use params::*;
