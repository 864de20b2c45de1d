//! Main step FX engine - ties together scheduler, dispatcher, lanes and mix

use std::sync::Arc;

use crate::config::EngineSettings;
use crate::effect::{Effect, LaneChain};
use crate::sequencer::{compute_slice, dispatch_block, HostTransport, StepGrid, TransportAtomics, TransportSlice};
use crate::state::EngineState;
use crate::types::{AudioBuffer, Lane, ProcessSpec, TAIL_SECONDS};

use super::{EngineParams, MixStage};

/// The step-sequenced effects engine
///
/// Per block: resolve the host transport, compute the step slice, run the
/// enabled lanes over a wet copy of the input in step-bounded sub-ranges,
/// then blend dry and wet and apply the output gain in place.
///
/// The grid and parameters are shared with control threads through `Arc`
/// handles; everything else is owned by the audio thread.
pub struct StepFxEngine {
    spec: ProcessSpec,
    settings: EngineSettings,
    /// Lane x step on/off cells, written by the control surface
    grid: Arc<StepGrid>,
    /// Wet/dry mix and output gain
    params: Arc<EngineParams>,
    /// Last block's tempo and step, for display
    transport: Arc<TransportAtomics>,
    chain: LaneChain,
    /// Pre-allocated wet working copy
    wet: AudioBuffer,
    /// Position used when the host does not report one
    local_position: i64,
}

impl StepFxEngine {
    /// Create an engine with the default lane units
    pub fn new(settings: EngineSettings) -> Self {
        let chain = LaneChain::new(&settings);
        Self::with_chain(settings, chain)
    }

    /// Create an engine around an explicit lane chain
    pub fn with_chain(settings: EngineSettings, chain: LaneChain) -> Self {
        let mut engine = Self {
            spec: ProcessSpec::default(),
            settings,
            grid: Arc::new(StepGrid::new()),
            params: Arc::new(EngineParams::new()),
            transport: Arc::new(TransportAtomics::new()),
            chain,
            wet: AudioBuffer::default(),
            local_position: 0,
        };
        engine.prepare(ProcessSpec::default());
        engine
    }

    /// Prepare for processing at a sample rate and maximum block layout
    ///
    /// Resets every unit's state and restarts the local position counter.
    pub fn prepare(&mut self, spec: ProcessSpec) {
        let sample_rate = spec.effective_sample_rate();
        if sample_rate != spec.sample_rate {
            log::warn!(
                "StepFxEngine: invalid sample rate {}, using {}",
                spec.sample_rate,
                sample_rate
            );
        }
        self.spec = ProcessSpec {
            sample_rate,
            ..spec
        };
        self.chain.prepare(&self.spec);
        self.wet = AudioBuffer::with_capacity(self.spec.num_channels, self.spec.max_block_size);
        self.local_position = 0;

        log::info!(
            "StepFxEngine: prepared at {} Hz, {} channels, max block {}",
            self.spec.sample_rate,
            self.spec.num_channels,
            self.spec.max_block_size
        );
    }

    /// Process one block in place, returning the slice it was processed with
    ///
    /// Missing host tempo falls back to `EngineSettings::fallback_bpm`;
    /// missing host position falls back to a local counter that advances by
    /// each block's length.
    pub fn process(&mut self, buffer: &mut AudioBuffer, host: &HostTransport) -> TransportSlice {
        let num_samples = buffer.len();
        let bpm = host.resolved_bpm(self.settings.fallback_bpm);
        let position = host.position_samples.unwrap_or(self.local_position);
        self.local_position = position.wrapping_add(num_samples as i64);

        let slice = compute_slice(bpm, self.spec.sample_rate, position);
        self.transport.publish(&slice, position);
        self.chain.set_tempo(slice.bpm);

        if num_samples == 0 || buffer.num_channels() == 0 {
            return slice;
        }

        if self.wet.needs_allocation(buffer.num_channels(), num_samples) {
            log::warn!(
                "StepFxEngine: block of {} channels x {} frames exceeds prepared buffers, growing",
                buffer.num_channels(),
                num_samples
            );
        }
        self.wet.copy_from(buffer);
        dispatch_block(&mut self.wet, &slice, &self.grid, &mut self.chain);

        MixStage::new(self.params.mix(), self.params.output_gain_db()).apply(buffer, &self.wet);
        slice
    }

    /// Clear all unit state, keeping the prepared layout
    pub fn reset(&mut self) {
        self.chain.reset();
        self.local_position = 0;
    }

    /// Shared handle to the step grid
    pub fn grid(&self) -> Arc<StepGrid> {
        self.grid.clone()
    }

    /// Shared handle to the mix and gain parameters
    pub fn params(&self) -> Arc<EngineParams> {
        self.params.clone()
    }

    /// Shared handle to the last block's transport state
    pub fn transport(&self) -> Arc<TransportAtomics> {
        self.transport.clone()
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn chain(&self) -> &LaneChain {
        &self.chain
    }

    /// Swap the unit in a lane, preparing it with the current spec
    pub fn replace_unit(&mut self, lane: Lane, mut unit: Box<dyn Effect>) -> Box<dyn Effect> {
        unit.prepare(&self.spec);
        self.chain.replace(lane, unit)
    }

    /// Tail length to report to hosts, in seconds
    pub fn tail_seconds(&self) -> f64 {
        TAIL_SECONDS
    }

    /// Capture the grid and parameters for persistence
    pub fn save_state(&self) -> EngineState {
        EngineState::capture(&self.grid, &self.params)
    }

    /// Restore the grid and parameters from a saved state
    pub fn restore_state(&self, state: &EngineState) {
        state.apply(&self.grid, &self.params);
        log::info!(
            "StepFxEngine: restored state ({} active cells, mix {}, gain {} dB)",
            self.grid.active_count(),
            self.params.mix(),
            self.params.output_gain_db()
        );
    }
}

impl Default for StepFxEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
