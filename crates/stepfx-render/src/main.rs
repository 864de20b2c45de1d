//! StepFX Render - offline host for the step FX engine
//!
//! Reads a WAV file, runs it through the engine block by block with a
//! simulated host transport and writes the result as 32-bit float WAV.
//!
//! ## Command line
//!
//! - `stepfx-render <input.wav> <output.wav> [--config <session.yaml>]`
//! - `stepfx-render --write-default-config <session.yaml>`

mod cli;
mod render;
mod session;
mod wav;

use std::path::Path;

use anyhow::{Context, Result};
use stepfx_core::config::{default_config_path, load_config, read_config, save_config};
use stepfx_core::engine::StepFxEngine;

use cli::{parse_args, Command, USAGE};
use session::{SessionConfig, SESSION_FILE};

fn main() -> Result<()> {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::WriteDefaultConfig(path) => {
            save_config(&SessionConfig::default(), &path)?;
            println!("Wrote default session to {}", path.display());
            Ok(())
        }
        Command::Render {
            input,
            output,
            config,
        } => {
            // An explicit config must load; the default location may be absent
            let session: SessionConfig = match &config {
                Some(path) => read_config(path)?,
                None => load_config(&default_config_path(SESSION_FILE)),
            };
            run_render(&input, &output, &session)
        }
    }
}

fn run_render(input: &Path, output: &Path, session: &SessionConfig) -> Result<()> {
    log::info!("stepfx-render starting up");

    let mut engine = StepFxEngine::new(session.engine.clone());
    session.apply(&engine).context("Invalid session config")?;

    let audio = wav::read_wav(input)?;
    let (rendered, report) = render::render(
        &mut engine,
        &audio.buffer,
        audio.sample_rate,
        &session.transport,
    );
    wav::write_wav(output, &rendered, audio.sample_rate)?;

    log::info!(
        "Rendered {} frames in {} blocks over {} steps (peak in {:.3}, out {:.3})",
        report.frames,
        report.blocks,
        report.steps,
        report.input_peak,
        report.output_peak
    );
    Ok(())
}
