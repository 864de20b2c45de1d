//! Fixed-order lane chain
//!
//! Holds exactly one effect unit per lane and always walks them in
//! `Lane::ALL` order. The unit in a lane can be swapped (for example a
//! `ReverseEffect` in the Stutter lane) without affecting the order.

use crate::config::EngineSettings;
use crate::effect::native::{
    BitcrushEffect, DelayEffect, GateEffect, LadderFilterEffect, ReverbEffect, StutterEffect,
};
use crate::effect::Effect;
use crate::sequencer::{StepGrid, SubRange};
use crate::types::{AudioBuffer, Lane, ProcessSpec, NUM_LANES};

/// One effect unit per lane, applied in fixed lane order
pub struct LaneChain {
    units: [Box<dyn Effect>; NUM_LANES],
}

impl LaneChain {
    /// Build the default chain: Gate, Stutter, Filter, Bitcrush, Delay, Reverb
    pub fn new(settings: &EngineSettings) -> Self {
        Self::with_units([
            Box::new(GateEffect::new()),
            Box::new(StutterEffect::new()),
            Box::new(LadderFilterEffect::new()),
            Box::new(BitcrushEffect::with_persist_phase(settings.bitcrush_persist_phase)),
            Box::new(DelayEffect::new()),
            Box::new(ReverbEffect::new()),
        ])
    }

    /// Build a chain from explicit units, indexed by lane
    pub fn with_units(units: [Box<dyn Effect>; NUM_LANES]) -> Self {
        Self { units }
    }

    /// Swap the unit in a lane, returning the previous one
    ///
    /// The new unit is not prepared; call `prepare` on the chain (or the
    /// engine) before processing.
    pub fn replace(&mut self, lane: Lane, unit: Box<dyn Effect>) -> Box<dyn Effect> {
        log::info!(
            "LaneChain: {} lane now uses {}",
            lane.name(),
            unit.info().name
        );
        std::mem::replace(&mut self.units[lane.index()], unit)
    }

    /// Get the unit assigned to a lane
    pub fn unit(&self, lane: Lane) -> &dyn Effect {
        self.units[lane.index()].as_ref()
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        for unit in &mut self.units {
            unit.prepare(spec);
        }
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        for unit in &mut self.units {
            unit.set_tempo(bpm);
        }
    }

    pub fn reset(&mut self) {
        for unit in &mut self.units {
            unit.reset();
        }
    }

    /// Run one lane's unit on a range, regardless of the grid
    #[inline]
    pub fn process_lane(&mut self, lane: Lane, buffer: &mut AudioBuffer, start: usize, len: usize) {
        self.units[lane.index()].process(buffer, start, len);
    }

    /// Apply every lane enabled for the sub-range's step, in lane order
    ///
    /// Returns the number of lanes applied.
    pub fn process_sub_range(&mut self, buffer: &mut AudioBuffer, sub: &SubRange, grid: &StepGrid) -> usize {
        let mut applied = 0;
        for lane in Lane::ALL {
            if grid.is_on(lane, sub.step) {
                self.process_lane(lane, buffer, sub.start, sub.len);
                applied += 1;
            }
        }
        applied
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::effect::native::ReverseEffect;
    use crate::effect::EffectInfo;
    use std::sync::{Arc, Mutex};

    /// Effect that records every call instead of processing
    pub(crate) struct RecordingEffect {
        info: EffectInfo,
        lane: Lane,
        log: Arc<Mutex<Vec<(Lane, usize, usize)>>>,
    }

    impl RecordingEffect {
        pub(crate) fn new(lane: Lane, log: Arc<Mutex<Vec<(Lane, usize, usize)>>>) -> Self {
            Self {
                info: EffectInfo::new(lane.name(), "Test"),
                lane,
                log,
            }
        }
    }

    impl Effect for RecordingEffect {
        fn prepare(&mut self, _spec: &ProcessSpec) {}

        fn process(&mut self, _buffer: &mut AudioBuffer, start: usize, len: usize) {
            self.log.lock().unwrap().push((self.lane, start, len));
        }

        fn reset(&mut self) {}

        fn info(&self) -> &EffectInfo {
            &self.info
        }
    }

    /// Chain of recorders sharing one call log
    pub(crate) fn recording_chain() -> (LaneChain, Arc<Mutex<Vec<(Lane, usize, usize)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let units = Lane::ALL.map(|lane| Box::new(RecordingEffect::new(lane, log.clone())) as Box<dyn Effect>);
        (LaneChain::with_units(units), log)
    }

    #[test]
    fn test_default_chain_order() {
        let chain = LaneChain::new(&EngineSettings::default());
        let names: Vec<&str> = Lane::ALL.iter().map(|&lane| chain.unit(lane).info().name.as_str()).collect();
        assert_eq!(names, ["Gate", "Stutter", "Ladder Filter", "Bitcrush", "Delay", "Reverb"]);
    }

    #[test]
    fn test_enabled_lanes_run_in_lane_order() {
        let (mut chain, log) = recording_chain();
        let grid = StepGrid::new();
        grid.set(Lane::Reverb, 3, true);
        grid.set(Lane::Gate, 3, true);
        grid.set(Lane::Bitcrush, 3, true);
        grid.set(Lane::Delay, 4, true);

        let mut buffer = AudioBuffer::silence(2, 64);
        let applied = chain.process_sub_range(&mut buffer, &SubRange { start: 10, len: 20, step: 3 }, &grid);

        assert_eq!(applied, 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec![(Lane::Gate, 10, 20), (Lane::Bitcrush, 10, 20), (Lane::Reverb, 10, 20)]
        );
    }

    #[test]
    fn test_replace_keeps_lane_position() {
        let mut chain = LaneChain::new(&EngineSettings::default());
        let previous = chain.replace(Lane::Stutter, Box::new(ReverseEffect::new()));
        assert_eq!(previous.info().name, "Stutter");
        assert_eq!(chain.unit(Lane::Stutter).info().name, "Reverse");

        let grid = StepGrid::new();
        grid.set(Lane::Stutter, 0, true);
        let mut buffer = AudioBuffer::from_channels(vec![vec![1.0, 2.0, 3.0, 4.0]]);
        chain.process_sub_range(&mut buffer, &SubRange { start: 0, len: 4, step: 0 }, &grid);
        assert_eq!(buffer[0], [4.0, 3.0, 2.0, 1.0]);
    }
}
