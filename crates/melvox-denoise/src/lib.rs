//! # Melvox Noise Reduction
//!
//! Post-processing for synthesized speech:
//! - Stationary spectral gating with a self-estimated noise floor
//! - Dominant-frequency analysis
//! - Frequency-aware denoising-strength selection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use melvox_core::VocoderParams;
//! use melvox_denoise::denoise_waveform;
//!
//! let clean = denoise_waveform(&wav, &VocoderParams::default())?;
//! ```

#![warn(missing_docs)]

mod analysis;
mod config;
mod error;
mod spectral_gate;

pub use analysis::{dominant_frequency, select_strength};
pub use config::DenoiseConfig;
pub use error::{DenoiseError, DenoiseResult};
pub use spectral_gate::SpectralGate;

use melvox_core::VocoderParams;

/// Gate a waveform with an explicit reduction strength.
///
/// `prop_decrease` follows the spectral-gate convention: 0.0 passes the
/// signal through, 1.0 fully gates everything under the noise floor.
pub fn reduce_noise(
    wav: &[f32],
    sample_rate: u32,
    prop_decrease: f32,
) -> DenoiseResult<Vec<f32>> {
    let gate = SpectralGate::new(DenoiseConfig::with_strength(prop_decrease), sample_rate)?;
    gate.process(wav)
}

/// Denoise a synthesized waveform with frequency-aware strength.
///
/// Estimates the dominant frequency of the waveform, picks the lighter
/// strength for low-frequency-dominant audio and the stronger one for
/// high-frequency-dominant audio, then applies the spectral gate.
pub fn denoise_waveform(wav: &[f32], params: &VocoderParams) -> DenoiseResult<Vec<f32>> {
    let dominant_hz = dominant_frequency(wav, params.sample_rate, params.min_analysis_freq)?;
    let strength = select_strength(dominant_hz, params);

    log::info!(
        "Dominant frequency of output audio is {dominant_hz:.1} Hz, denoising with strength {strength}"
    );

    reduce_noise(wav, params.sample_rate, strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone_with_noise(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let tone =
                    (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5;
                let noise = ((i as f32 * 12.9898).sin() * 43_758.547).fract() * 0.05;
                tone + noise
            })
            .collect()
    }

    #[test]
    fn denoise_waveform_keeps_length() {
        let params = VocoderParams::default();
        let wav = tone_with_noise(220.0, params.sample_rate, 16_000);
        let clean = denoise_waveform(&wav, &params).unwrap();
        assert_eq!(clean.len(), wav.len());
        assert!(clean.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn denoise_waveform_rejects_empty() {
        let params = VocoderParams::default();
        assert!(matches!(
            denoise_waveform(&[], &params),
            Err(DenoiseError::EmptyInput)
        ));
    }

    #[test]
    fn reduce_noise_bypass_is_transparent() {
        let wav = tone_with_noise(330.0, 16_000, 8_192);
        let out = reduce_noise(&wav, 16_000, 0.0).unwrap();
        let max_err = wav
            .iter()
            .zip(&out)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_err < 1e-3, "max_err = {max_err}");
    }
}
