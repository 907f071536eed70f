//! File I/O for the CLI: JSON mel spectrograms and WAV audio

use anyhow::{bail, Context, Result};
use melvox_vocoder::Mel;
use serde::Deserialize;
use std::path::Path;

/// On-disk mel spectrogram layout
#[derive(Deserialize)]
struct MelFile {
    /// Number of mel channels
    num_mels: usize,
    /// Number of time frames
    frames: usize,
    /// Row-major `[num_mels, frames]` values
    data: Vec<f32>,
}

/// Read a mel spectrogram from a JSON file
pub fn read_mel(path: &Path) -> Result<Mel> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading mel from {}", path.display()))?;
    let file: MelFile = serde_json::from_str(&json).context("parsing mel JSON")?;

    if file.data.len() != file.num_mels * file.frames {
        bail!(
            "mel data length {} does not match {} x {}",
            file.data.len(),
            file.num_mels,
            file.frames
        );
    }

    Mel::from_shape_vec((file.num_mels, file.frames), file.data).context("building mel array")
}

/// Read a WAV file as mono f32 samples
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    // Downmix to mono
    let mono = if spec.channels > 1 {
        let channels = spec.channels as usize;
        samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

/// Write mono f32 samples as a 16-bit PCM WAV file
pub fn write_wav(path: &Path, wav: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;
    for &sample in wav {
        let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(clamped)?;
    }
    writer.finalize()?;
    Ok(())
}
