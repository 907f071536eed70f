//! Waveform spectrum analysis
//!
//! Single-FFT dominant-frequency estimation: the search skips everything
//! below a cutoff (DC leakage and rumble sit there), then picks the bin
//! with the largest magnitude.

use crate::error::{DenoiseError, DenoiseResult};
use melvox_core::VocoderParams;
use num_complex::Complex32;
use realfft::RealFftPlanner;

/// Estimate the dominant frequency of a waveform in Hz.
///
/// Runs one real FFT over the whole signal and returns the center frequency
/// of the strongest bin at or above `min_freq`. Errors when the signal is
/// too short to resolve anything above the cutoff.
pub fn dominant_frequency(wav: &[f32], sample_rate: u32, min_freq: f32) -> DenoiseResult<f32> {
    if wav.is_empty() {
        return Err(DenoiseError::EmptyInput);
    }

    let n = wav.len();
    let bin_width = sample_rate as f32 / n as f32;
    let first_bin = (min_freq / bin_width).ceil() as usize;
    let num_bins = n / 2 + 1;

    if first_bin >= num_bins {
        // Not enough samples to resolve anything above the cutoff
        let needed = (sample_rate as f32 / min_freq).ceil() as usize * 2;
        return Err(DenoiseError::InputTooShort { got: n, needed });
    }

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);

    let mut input = wav.to_vec();
    let mut spectrum = vec![Complex32::new(0.0, 0.0); num_bins];
    fft.process(&mut input, &mut spectrum)
        .map_err(|e| DenoiseError::Fft(e.to_string()))?;

    let mut max_bin = first_bin;
    let mut max_mag = 0.0f32;
    for (i, c) in spectrum.iter().enumerate().skip(first_bin) {
        let mag = c.norm();
        if mag > max_mag {
            max_mag = mag;
            max_bin = i;
        }
    }

    Ok(max_bin as f32 * bin_width)
}

/// Pick the denoising strength for a waveform's dominant frequency.
///
/// Low-frequency-dominant audio gets the lighter setting; hissy,
/// high-frequency-dominant audio gets the stronger one.
pub fn select_strength(dominant_hz: f32, params: &VocoderParams) -> f32 {
    if dominant_hz < params.split_freq {
        params.prop_decrease_low_freq
    } else {
        params.prop_decrease_high_freq
    }
}
