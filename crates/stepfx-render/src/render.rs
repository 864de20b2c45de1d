//! Offline block-by-block render through the engine

use stepfx_core::engine::StepFxEngine;
use stepfx_core::sequencer::{HostTransport, StepSlices};
use stepfx_core::{AudioBuffer, ProcessSpec, Sample};

use crate::session::TransportConfig;

/// Summary of one render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    /// Frames written, including the tail
    pub frames: usize,
    pub blocks: usize,
    /// Number of step starts crossed (one per 1/16 note played)
    pub steps: usize,
    pub input_peak: Sample,
    pub output_peak: Sample,
}

/// Process `input` in blocks, simulating a host that reports `transport`
///
/// Prepares the engine for the input's layout first. With `render_tail`
/// the output is extended by the engine's tail length.
pub fn render(
    engine: &mut StepFxEngine,
    input: &AudioBuffer,
    sample_rate: u32,
    transport: &TransportConfig,
) -> (AudioBuffer, RenderReport) {
    let channels = input.num_channels();
    let block_size = transport.block_size.max(1);
    let tail = if transport.render_tail {
        (engine.tail_seconds() * sample_rate as f64).ceil() as usize
    } else {
        0
    };
    let total = input.len() + tail;

    engine.prepare(ProcessSpec::new(sample_rate as f64, block_size, channels));
    log::info!(
        "Rendering {} frames ({} tail) in blocks of {}",
        total,
        tail,
        block_size
    );

    let mut output = AudioBuffer::silence(channels, total);
    let mut block = AudioBuffer::with_capacity(channels, block_size);
    let mut offset = 0;
    let mut blocks = 0;
    let mut steps = 0;
    let mut last_step = None;

    while offset < total {
        let len = block_size.min(total - offset);
        let available = input.len().saturating_sub(offset).min(len);
        block.set_layout(channels, len);
        block.fill_silence();
        if available > 0 {
            block.copy_frames_from(input, offset, 0, available);
        }

        let host = HostTransport {
            bpm: transport.bpm,
            position_samples: transport.start_position.map(|p| p + offset as i64),
        };
        let slice = engine.process(&mut block, &host);

        for sub in StepSlices::new(&slice, len) {
            if last_step != Some(sub.step) {
                steps += 1;
                last_step = Some(sub.step);
            }
        }

        output.copy_frames_from(&block, 0, offset, len);
        offset += len;
        blocks += 1;
    }

    let report = RenderReport {
        frames: total,
        blocks,
        steps,
        input_peak: input.peak(),
        output_peak: output.peak(),
    };
    (output, report)
}
