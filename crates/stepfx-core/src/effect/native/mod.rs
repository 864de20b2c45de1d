//! Native effect units
//!
//! One unit per lane, plus `ReverseEffect` which is available for lane
//! substitution but not wired into the default chain.

mod bitcrush;
mod delay;
mod filter;
mod gate;
mod reverb;
mod reverse;
mod stutter;

pub use bitcrush::BitcrushEffect;
pub use delay::DelayEffect;
pub use filter::LadderFilterEffect;
pub use gate::GateEffect;
pub use reverb::{ReverbEffect, ReverbSettings};
pub use reverse::ReverseEffect;
pub use stutter::StutterEffect;
