//! Command line parsing

use std::path::PathBuf;

pub const USAGE: &str = "\
Usage:
  stepfx-render <input.wav> <output.wav> [--config <session.yaml>]
  stepfx-render --write-default-config <session.yaml>

Without --config the session is loaded from the default config directory
(~/.config/stepfx/session.yaml); built-in defaults are used if it is missing.
Set RUST_LOG=debug for verbose output.";

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Render {
        input: PathBuf,
        output: PathBuf,
        config: Option<PathBuf>,
    },
    WriteDefaultConfig(PathBuf),
    Help,
}

/// Parse arguments (without the program name)
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--write-default-config" => {
                let path = iter.next().ok_or("--write-default-config needs a path")?;
                return Ok(Command::WriteDefaultConfig(PathBuf::from(path)));
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown flag: {}", flag)),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    match <[PathBuf; 2]>::try_from(positional) {
        Ok([input, output]) => Ok(Command::Render {
            input,
            output,
            config,
        }),
        Err(positional) => Err(format!(
            "Expected an input and an output file, got {} path(s)",
            positional.len()
        )),
    }
}
