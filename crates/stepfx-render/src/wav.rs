//! WAV file reading and writing

use std::path::Path;

use anyhow::{ensure, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use stepfx_core::AudioBuffer;

/// Decoded WAV contents
pub struct WavAudio {
    pub buffer: AudioBuffer,
    pub sample_rate: u32,
}

/// Read a WAV file (integer or float samples, any channel count)
///
/// Integer samples are scaled to [-1.0, 1.0). A trailing partial frame is
/// dropped.
pub fn read_wav(path: &Path) -> Result<WavAudio> {
    let mut reader =
        WavReader::open(path).with_context(|| format!("Failed to open WAV file: {:?}", path))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    ensure!(channels > 0, "WAV file {:?} has no channels", path);

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("Failed to decode float samples")?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .context("Failed to decode integer samples")?
        }
    };

    let frames = interleaved.len() / channels;
    log::info!(
        "Read {:?}: {} channels, {} Hz, {} frames ({}-bit {:?})",
        path,
        channels,
        spec.sample_rate,
        frames,
        spec.bits_per_sample,
        spec.sample_format
    );

    Ok(WavAudio {
        buffer: AudioBuffer::from_interleaved(&interleaved[..frames * channels], channels),
        sample_rate: spec.sample_rate,
    })
}

/// Write a buffer as a 32-bit float WAV file
pub fn write_wav(path: &Path, buffer: &AudioBuffer, sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: u16::try_from(buffer.num_channels()).context("Too many channels for WAV")?,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut interleaved = vec![0.0; buffer.len() * buffer.num_channels()];
    buffer.to_interleaved(&mut interleaved);

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;
    for sample in interleaved {
        writer.write_sample(sample).context("Failed to write WAV sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    log::info!("Wrote {:?}: {} frames", path, buffer.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.wav");
        let buffer = AudioBuffer::from_channels(vec![vec![0.5, -0.25, 0.0], vec![0.1, 0.2, -1.0]]);

        write_wav(&path, &buffer, 48000).unwrap();
        let audio = read_wav(&path).unwrap();

        assert_eq!(audio.sample_rate, 48000);
        assert_eq!(audio.buffer.num_channels(), 2);
        assert_eq!(audio.buffer[0], buffer[0]);
        assert_eq!(audio.buffer[1], buffer[1]);
    }

    #[test]
    fn test_reads_16_bit_integer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("int.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for v in [0i16, 16384, -32768] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let audio = read_wav(&path).unwrap();
        assert_eq!(audio.buffer[0], [0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_wav(Path::new("/nonexistent/input.wav")).is_err());
    }
}
