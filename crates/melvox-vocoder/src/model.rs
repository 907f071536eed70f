//! Vocoder model wrapper
//!
//! Owns the loaded graph plus the inference-time parameters and implements
//! the mel → waveform pipeline: normalization, overlap folding, per-fold
//! network runs, crossfade unfolding, and mu-law expansion.

use crate::batch::{fold_with_overlap, xfade_and_unfold};
use crate::error::{VocoderError, VocoderResult};
use crate::inference::{InferenceConfig, InferenceEngine};
use crate::Mel;
use melvox_core::{decode_mu_law, VocoderMode, VocoderParams};
use ndarray::Array3;
use std::path::Path;

/// Progress callback: `(folds_done, folds_total)`
pub type ProgressFn = dyn Fn(usize, usize) + Sync;

/// Per-call synthesis options
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// Scale the mel by `1 / mel_max_abs_value` before inference
    pub normalize: bool,
    /// Fold long mels and run the network segment by segment
    pub batched: bool,
    /// Samples generated per fold (batched mode)
    pub target: usize,
    /// Crossfade overlap between folds, in samples (batched mode)
    pub overlap: usize,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            batched: true,
            target: 8_000,
            overlap: 800,
        }
    }
}

/// Check synthesis options against the model's frame size.
///
/// `target` and `overlap` must land on mel-frame boundaries since folding
/// happens on frames, and the two fade regions cannot meet in the middle of
/// a fold.
pub(crate) fn validate_options(opts: &SynthesisOptions, hop_length: usize) -> VocoderResult<()> {
    if !opts.batched {
        return Ok(());
    }
    if opts.target == 0 {
        return Err(VocoderError::InvalidOptions("target must be non-zero".into()));
    }
    if opts.target % hop_length != 0 {
        return Err(VocoderError::InvalidOptions(format!(
            "target ({}) must be a multiple of hop_length ({hop_length})",
            opts.target
        )));
    }
    if opts.overlap % hop_length != 0 {
        return Err(VocoderError::InvalidOptions(format!(
            "overlap ({}) must be a multiple of hop_length ({hop_length})",
            opts.overlap
        )));
    }
    if opts.overlap * 2 >= opts.target {
        return Err(VocoderError::InvalidOptions(format!(
            "overlap ({}) must be less than half of target ({})",
            opts.overlap, opts.target
        )));
    }
    Ok(())
}

/// A loaded vocoder model
pub struct Vocoder {
    /// Inference backend holding the graph
    engine: InferenceEngine,
    /// Inference-time parameters
    params: VocoderParams,
}

impl Vocoder {
    /// Load a pretrained vocoder graph from an ONNX file
    pub fn load<P: AsRef<Path>>(path: P, params: VocoderParams) -> VocoderResult<Self> {
        params.validate()?;
        let engine = InferenceEngine::new(path.as_ref(), InferenceConfig::default())?;
        log::info!(
            "Loaded vocoder model from {} ({} mels @ {} Hz, hop {})",
            path.as_ref().display(),
            params.num_mels,
            params.sample_rate,
            params.hop_length,
        );
        Ok(Self { engine, params })
    }

    /// Inference-time parameters this model was loaded with
    pub fn params(&self) -> &VocoderParams {
        &self.params
    }

    /// Inference backend
    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Synthesize a waveform from a mel spectrogram
    pub fn synthesize(&self, mel: &Mel, opts: &SynthesisOptions) -> VocoderResult<Vec<f32>> {
        self.synthesize_with(mel, opts, None)
    }

    /// Synthesize with an optional progress callback
    pub fn synthesize_with(
        &self,
        mel: &Mel,
        opts: &SynthesisOptions,
        progress: Option<&ProgressFn>,
    ) -> VocoderResult<Vec<f32>> {
        let hop = self.params.hop_length;
        validate_mel(mel, self.params.num_mels)?;
        validate_options(opts, hop)?;

        let mel = if opts.normalize {
            mel.mapv(|v| v / self.params.mel_max_abs_value)
        } else {
            mel.clone()
        };

        let frames = mel.ncols();
        let wave_len = frames * hop;

        let mut wav = if opts.batched {
            let target_frames = opts.target / hop;
            let overlap_frames = opts.overlap / hop;

            let folds = fold_with_overlap(&mel, target_frames, overlap_frames);
            let total_folds = folds.len();
            let seg_samples = (target_frames + 2 * overlap_frames) * hop;

            let mut chunks = Vec::with_capacity(total_folds);
            for (i, fold) in folds.iter().enumerate() {
                let chunk = self.run_fold(fold, seg_samples)?;
                chunks.push(chunk);
                if let Some(cb) = progress {
                    cb(i + 1, total_folds);
                }
            }

            xfade_and_unfold(&chunks, target_frames * hop, overlap_frames * hop)
        } else {
            let chunk = self.run_fold(&mel, wave_len)?;
            if let Some(cb) = progress {
                cb(1, 1);
            }
            chunk
        };

        // Folding pads the tail; trim back to the mel's own duration
        wav.truncate(wave_len);

        // Ease the signal out instead of cutting at the last frame
        let fade_len = (20 * hop).min(wav.len());
        let start = wav.len() - fade_len;
        for i in 0..fade_len {
            wav[start + i] *= 1.0 - i as f32 / fade_len as f32;
        }

        Ok(wav)
    }

    /// Run one fold through the network, check the returned length and
    /// expand RAW-mode samples back to linear.
    ///
    /// Expansion must happen per fold: the crossfade in
    /// [`xfade_and_unfold`] mixes amplitudes, which is only meaningful on
    /// linear samples.
    fn run_fold(&self, fold: &Mel, expected_samples: usize) -> VocoderResult<Vec<f32>> {
        let (num_mels, frames) = fold.dim();
        let mut input = Array3::<f32>::zeros((1, num_mels, frames));
        input.index_axis_mut(ndarray::Axis(0), 0).assign(fold);

        let mut wav = self.engine.run_mel(&input)?;

        if wav.len() != expected_samples {
            return Err(VocoderError::InvalidOutputShape {
                expected: format!("{expected_samples} samples"),
                got: format!("{} samples", wav.len()),
            });
        }

        expand_raw_samples(&mut wav, &self.params);
        Ok(wav)
    }
}

/// Check a mel spectrogram against the model's channel count.
pub(crate) fn validate_mel(mel: &Mel, num_mels: usize) -> VocoderResult<()> {
    if mel.nrows() != num_mels || mel.ncols() == 0 {
        return Err(VocoderError::InvalidMelShape {
            expected: format!("[{num_mels}, frames > 0]"),
            got: format!("[{}, {}]", mel.nrows(), mel.ncols()),
        });
    }
    Ok(())
}

/// Expand companded RAW-mode samples back to linear in place.
///
/// No-op for MOL models and for RAW models trained without mu-law.
pub(crate) fn expand_raw_samples(wav: &mut [f32], params: &VocoderParams) {
    if params.mode == VocoderMode::Raw && params.mu_law {
        let mu = params.quant_levels();
        for sample in wav.iter_mut() {
            *sample = decode_mu_law(*sample, mu);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_training_setup() {
        let opts = SynthesisOptions::default();
        assert!(opts.normalize);
        assert!(opts.batched);
        assert_eq!(opts.target, 8_000);
        assert_eq!(opts.overlap, 800);
        // Defaults must pass validation for the default hop length
        assert!(validate_options(&opts, VocoderParams::default().hop_length).is_ok());
    }

    #[test]
    fn rejects_offgrid_target() {
        let opts = SynthesisOptions { target: 8_100, ..Default::default() };
        assert!(matches!(
            validate_options(&opts, 200),
            Err(VocoderError::InvalidOptions(_))
        ));
    }

    #[test]
    fn rejects_oversized_overlap() {
        let opts = SynthesisOptions { target: 1_000, overlap: 600, ..Default::default() };
        assert!(matches!(
            validate_options(&opts, 200),
            Err(VocoderError::InvalidOptions(_))
        ));
    }

    #[test]
    fn unbatched_skips_fold_checks() {
        let opts = SynthesisOptions { batched: false, target: 7, overlap: 13, ..Default::default() };
        assert!(validate_options(&opts, 200).is_ok());
    }

    #[test]
    fn rejects_wrong_mel_rows() {
        let mel = Mel::zeros((40, 10));
        assert!(matches!(
            validate_mel(&mel, 80),
            Err(VocoderError::InvalidMelShape { .. })
        ));
    }

    #[test]
    fn rejects_empty_mel() {
        let mel = Mel::zeros((80, 0));
        assert!(matches!(
            validate_mel(&mel, 80),
            Err(VocoderError::InvalidMelShape { .. })
        ));
        assert!(validate_mel(&Mel::zeros((80, 1)), 80).is_ok());
    }

    #[test]
    fn expansion_skips_mol_and_linear_models() {
        let mut wav = vec![0.5f32, -0.25];
        let mol = VocoderParams { mode: VocoderMode::Mol, ..Default::default() };
        expand_raw_samples(&mut wav, &mol);
        assert_eq!(wav, vec![0.5, -0.25]);

        let linear = VocoderParams { mu_law: false, ..Default::default() };
        expand_raw_samples(&mut wav, &linear);
        assert_eq!(wav, vec![0.5, -0.25]);
    }

    #[test]
    fn raw_folds_expand_before_crossfading() {
        let params = VocoderParams::default();
        let target = 400;
        let overlap = 40;
        let seg = target + 2 * overlap;

        // Two folds of constant companded amplitude, expanded per fold the
        // way run_fold does before the crossfade mixes them
        let companded = 0.5f32;
        let mut fold = vec![companded; seg];
        expand_raw_samples(&mut fold, &params);
        let linear = fold[0];
        let folds = vec![fold.clone(), fold];

        let wav = xfade_and_unfold(&folds, target, overlap);

        // Crossfade gain profile, measured on unit folds
        let unit = vec![vec![1.0f32; seg]; 2];
        let gains = xfade_and_unfold(&unit, target, overlap);

        let mu = params.quant_levels();
        let mut saw_partial_gain = false;
        for (i, (&sample, &gain)) in wav.iter().zip(&gains).enumerate() {
            // Mixing in the linear domain scales the decoded amplitude by
            // the gain profile everywhere
            assert!(
                (sample - gain * linear).abs() < 1e-5,
                "sample {i}: {sample} vs {}",
                gain * linear
            );

            // Mixing companded samples and decoding afterwards disagrees
            // wherever the gain is partial, since expansion is nonlinear
            if gain > 0.05 && gain < 0.95 {
                saw_partial_gain = true;
                let companded_mix = decode_mu_law(gain * companded, mu);
                assert!(
                    (sample - companded_mix).abs() > 1e-4,
                    "sample {i} matches companded-domain mixing"
                );
            }
        }
        assert!(saw_partial_gain);
    }
}
