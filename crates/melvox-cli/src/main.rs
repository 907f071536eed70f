//! Melvox command-line front end
//!
//! `melvox synth` turns a saved mel spectrogram into a WAV file through a
//! pretrained ONNX vocoder, `melvox denoise` post-processes an existing
//! WAV, and `melvox analyze` reports what the denoising heuristic sees.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use melvox_core::VocoderParams;
use melvox_denoise::{denoise_waveform, dominant_frequency, select_strength};
use melvox_vocoder::{self as vocoder, Mel, SynthesisOptions};
use std::path::{Path, PathBuf};

mod io;

#[derive(Parser)]
#[command(name = "melvox", version, about = "Neural vocoder inference suite")]
struct Cli {
    /// Vocoder parameter overrides (JSON file)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a waveform from a mel spectrogram
    Synth {
        /// Pretrained vocoder graph (ONNX)
        #[arg(long)]
        model: PathBuf,

        /// Input mel spectrogram (JSON: num_mels, frames, row-major data)
        #[arg(long)]
        mel: PathBuf,

        /// Output WAV file
        #[arg(long, short)]
        out: PathBuf,

        /// Run the whole mel in one pass instead of folded batches
        #[arg(long)]
        unbatched: bool,

        /// Samples per fold in batched mode
        #[arg(long, default_value_t = 8_000)]
        target: usize,

        /// Crossfade overlap between folds in samples
        #[arg(long, default_value_t = 800)]
        overlap: usize,

        /// Skip mel normalization (mel is already in [-1, 1])
        #[arg(long)]
        no_normalize: bool,

        /// Skip the post-processing noise reduction
        #[arg(long)]
        no_denoise: bool,
    },

    /// Noise-reduce an existing WAV file
    Denoise {
        /// Input WAV file
        #[arg(long, short)]
        input: PathBuf,

        /// Output WAV file
        #[arg(long, short)]
        out: PathBuf,

        /// Override the frequency-selected strength (0.0 - 1.0)
        #[arg(long)]
        strength: Option<f32>,
    },

    /// Report the dominant frequency and selected denoising strength
    Analyze {
        /// Input WAV file
        #[arg(long, short)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let params = load_params(cli.params.as_deref())?;

    match cli.command {
        Commands::Synth {
            model,
            mel,
            out,
            unbatched,
            target,
            overlap,
            no_normalize,
            no_denoise,
        } => synth(
            &params, &model, &mel, &out, unbatched, target, overlap, no_normalize, no_denoise,
        ),
        Commands::Denoise { input, out, strength } => denoise(&params, &input, &out, strength),
        Commands::Analyze { input } => analyze(&params, &input),
    }
}

fn load_params(path: Option<&Path>) -> Result<VocoderParams> {
    let params = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading params from {}", path.display()))?;
            serde_json::from_str(&json).context("parsing vocoder params")?
        }
        None => VocoderParams::default(),
    };
    params.validate().context("validating vocoder params")?;
    Ok(params)
}

#[allow(clippy::too_many_arguments)]
fn synth(
    params: &VocoderParams,
    model: &Path,
    mel_path: &Path,
    out: &Path,
    unbatched: bool,
    target: usize,
    overlap: usize,
    no_normalize: bool,
    no_denoise: bool,
) -> Result<()> {
    let mel: Mel = io::read_mel(mel_path)?;
    log::info!(
        "Synthesizing {} frames ({:.2}s of audio)",
        mel.ncols(),
        mel.ncols() as f64 * params.frame_ms() / 1000.0
    );

    vocoder::load_model(model, params.clone())?;

    let opts = SynthesisOptions {
        normalize: !no_normalize,
        batched: !unbatched,
        target,
        overlap,
    };

    let wav = vocoder::infer_waveform_with(
        &mel,
        &opts,
        Some(&|done, total| log::debug!("fold {done}/{total}")),
    )?;

    let wav = if no_denoise {
        wav
    } else {
        denoise_waveform(&wav, params)?
    };

    io::write_wav(out, &wav, params.sample_rate)?;
    log::info!("Wrote {} samples to {}", wav.len(), out.display());
    Ok(())
}

fn denoise(
    params: &VocoderParams,
    input: &Path,
    out: &Path,
    strength: Option<f32>,
) -> Result<()> {
    let (wav, sample_rate) = io::read_wav(input)?;

    let clean = match strength {
        Some(strength) => {
            if !(0.0..=1.0).contains(&strength) {
                bail!("strength must be in [0.0, 1.0], got {strength}");
            }
            melvox_denoise::reduce_noise(&wav, sample_rate, strength)?
        }
        None => {
            let rated = VocoderParams { sample_rate, ..params.clone() };
            denoise_waveform(&wav, &rated)?
        }
    };

    io::write_wav(out, &clean, sample_rate)?;
    log::info!("Wrote {} samples to {}", clean.len(), out.display());
    Ok(())
}

fn analyze(params: &VocoderParams, input: &Path) -> Result<()> {
    let (wav, sample_rate) = io::read_wav(input)?;
    let dominant_hz = dominant_frequency(&wav, sample_rate, params.min_analysis_freq)?;

    let rated = VocoderParams { sample_rate, ..params.clone() };
    let strength = select_strength(dominant_hz, &rated);

    println!("dominant frequency: {dominant_hz:.1} Hz");
    println!(
        "denoising strength: {strength} ({})",
        if dominant_hz < rated.split_freq { "low-frequency" } else { "high-frequency" }
    );
    Ok(())
}
