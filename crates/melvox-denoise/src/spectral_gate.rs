//! Stationary spectral noise gate
//!
//! Offline spectral gating: the noise floor is estimated from the signal
//! itself as a per-bin threshold over the dB magnitude spectrogram, the
//! resulting mask is smoothed across frequency and time, and masked-out
//! bins are attenuated by `prop_decrease`. Reconstruction divides by the
//! accumulated squared window, so a unit mask reproduces the input.

use crate::config::DenoiseConfig;
use crate::error::{DenoiseError, DenoiseResult};
use num_complex::Complex32;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

const DB_EPS: f32 = 1e-10;

/// Stationary spectral gate
pub struct SpectralGate {
    /// Configuration
    config: DenoiseConfig,

    /// Sample rate
    sample_rate: u32,

    /// Forward FFT
    fft_forward: Arc<dyn RealToComplex<f32>>,

    /// Inverse FFT
    fft_inverse: Arc<dyn ComplexToReal<f32>>,

    /// Hann analysis/synthesis window
    window: Vec<f32>,
}

impl SpectralGate {
    /// Create a new spectral gate
    pub fn new(config: DenoiseConfig, sample_rate: u32) -> DenoiseResult<Self> {
        if config.fft_size < 64 || !config.fft_size.is_power_of_two() {
            return Err(DenoiseError::InvalidConfig(format!(
                "fft_size must be a power of two >= 64, got {}",
                config.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&config.prop_decrease) {
            return Err(DenoiseError::InvalidConfig(format!(
                "prop_decrease must be in [0, 1], got {}",
                config.prop_decrease
            )));
        }
        if sample_rate == 0 {
            return Err(DenoiseError::InvalidConfig("sample_rate must be non-zero".into()));
        }

        let fft_size = config.fft_size;
        let mut planner = RealFftPlanner::new();
        let fft_forward = planner.plan_fft_forward(fft_size);
        let fft_inverse = planner.plan_fft_inverse(fft_size);

        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos()))
            .collect();

        Ok(Self {
            config,
            sample_rate,
            fft_forward,
            fft_inverse,
            window,
        })
    }

    /// Gate a waveform, returning a signal of the same length
    pub fn process(&self, input: &[f32]) -> DenoiseResult<Vec<f32>> {
        if input.is_empty() {
            return Err(DenoiseError::EmptyInput);
        }

        let fft_size = self.config.fft_size;
        let hop = self.config.hop_size();
        let num_bins = fft_size / 2 + 1;

        // Lead-in pad: the Hann window is zero at its first sample, so the
        // raw first input sample would never be covered by a non-zero
        // window value. One hop of silence shifts it into coverage.
        let lead = hop;
        let padded: Vec<f32> = std::iter::repeat_n(0.0f32, lead)
            .chain(input.iter().copied())
            .collect();

        // Analysis: windowed STFT over the whole signal
        let mut spectra: Vec<Vec<Complex32>> = Vec::new();
        let mut frame = vec![0.0f32; fft_size];
        let mut scratch = vec![Complex32::new(0.0, 0.0); self.fft_forward.get_scratch_len()];

        let mut start = 0;
        while start < padded.len() {
            for i in 0..fft_size {
                let sample = padded.get(start + i).copied().unwrap_or(0.0);
                frame[i] = sample * self.window[i];
            }

            let mut spectrum = vec![Complex32::new(0.0, 0.0); num_bins];
            self.fft_forward
                .process_with_scratch(&mut frame, &mut spectrum, &mut scratch)
                .map_err(|e| DenoiseError::Fft(e.to_string()))?;
            spectra.push(spectrum);

            start += hop;
        }

        let gains = self.compute_gains(&spectra);

        // Synthesis: apply gains, inverse FFT, overlap-add with window-sum
        // normalization
        let out_len = input.len();
        let padded_len = (spectra.len() - 1) * hop + fft_size;
        let mut output = vec![0.0f32; padded_len];
        let mut window_sum = vec![0.0f32; padded_len];

        let mut ifft_scratch =
            vec![Complex32::new(0.0, 0.0); self.fft_inverse.get_scratch_len()];
        let norm = 1.0 / fft_size as f32;

        for (f, spectrum) in spectra.iter().enumerate() {
            let mut shaped: Vec<Complex32> = spectrum
                .iter()
                .zip(&gains[f])
                .map(|(c, &g)| c * g)
                .collect();

            // realfft's inverse requires purely real DC and Nyquist bins
            shaped[0].im = 0.0;
            shaped[num_bins - 1].im = 0.0;

            self.fft_inverse
                .process_with_scratch(&mut shaped, &mut frame, &mut ifft_scratch)
                .map_err(|e| DenoiseError::Fft(e.to_string()))?;

            let offset = f * hop;
            for i in 0..fft_size {
                output[offset + i] += frame[i] * norm * self.window[i];
                window_sum[offset + i] += self.window[i] * self.window[i];
            }
        }

        let mut result = Vec::with_capacity(out_len);
        for i in 0..out_len {
            let w = window_sum[lead + i];
            result.push(if w > 1e-8 { output[lead + i] / w } else { 0.0 });
        }

        Ok(result)
    }

    /// Per-bin gains from the self-estimated noise floor
    fn compute_gains(&self, spectra: &[Vec<Complex32>]) -> Vec<Vec<f32>> {
        let num_frames = spectra.len();
        let num_bins = spectra.first().map(|s| s.len()).unwrap_or(0);

        // dB magnitude spectrogram
        let mag_db: Vec<Vec<f32>> = spectra
            .iter()
            .map(|s| s.iter().map(|c| 20.0 * (c.norm() + DB_EPS).log10()).collect())
            .collect();

        // Per-bin noise threshold: mean + n_std * stddev over time
        let mut threshold = vec![0.0f32; num_bins];
        for bin in 0..num_bins {
            let mut mean = 0.0f64;
            for row in &mag_db {
                mean += row[bin] as f64;
            }
            mean /= num_frames as f64;

            let mut var = 0.0f64;
            for row in &mag_db {
                let d = row[bin] as f64 - mean;
                var += d * d;
            }
            let std = (var / num_frames as f64).sqrt();

            threshold[bin] = (mean + self.config.n_std_thresh as f64 * std) as f32;
        }

        // Binary mask of bins that rise above the noise floor
        let mut mask: Vec<Vec<f32>> = mag_db
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&threshold)
                    .map(|(&db, &th)| if db > th { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect();

        // Smooth across frequency
        let bin_width = self.sample_rate as f32 / self.config.fft_size as f32;
        let freq_radius = (self.config.freq_smooth_hz / bin_width / 2.0).round() as usize;
        if freq_radius > 0 {
            mask = mask
                .iter()
                .map(|row| moving_average(row, freq_radius))
                .collect();
        }

        // Smooth across time
        let hop_ms = self.config.hop_size() as f32 / self.sample_rate as f32 * 1000.0;
        let time_radius = (self.config.time_smooth_ms / hop_ms / 2.0).round() as usize;
        if time_radius > 0 {
            for bin in 0..num_bins {
                let column: Vec<f32> = mask.iter().map(|row| row[bin]).collect();
                let smoothed = moving_average(&column, time_radius);
                for (f, row) in mask.iter_mut().enumerate() {
                    row[bin] = smoothed[f];
                }
            }
        }

        // Keep passing bins at unity, attenuate the rest by prop_decrease
        let prop = self.config.prop_decrease;
        mask.iter()
            .map(|row| row.iter().map(|&m| m * prop + (1.0 - prop)).collect())
            .collect()
    }

    /// Sample rate this gate was built for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current reduction strength
    pub fn prop_decrease(&self) -> f32 {
        self.config.prop_decrease
    }
}

/// Centered moving average with edge clamping
fn moving_average(values: &[f32], radius: usize) -> Vec<f32> {
    let n = values.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(n);
            values[lo..hi].iter().sum::<f32>() / (hi - lo) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize) -> Vec<f32> {
        // Deterministic pseudo-noise, roughly white
        (0..len)
            .map(|i| ((i as f32 * 12.9898).sin() * 43_758.547).fract() * 0.2 - 0.1)
            .collect()
    }

    fn rms(signal: &[f32]) -> f32 {
        (signal.iter().map(|s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
    }

    #[test]
    fn zero_strength_is_transparent() {
        let gate = SpectralGate::new(DenoiseConfig::with_strength(0.0), 16_000).unwrap();
        let input = noise(8_192);
        let output = gate.process(&input).unwrap();

        assert_eq!(output.len(), input.len());
        let max_err = input
            .iter()
            .zip(&output)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_err < 1e-3, "max_err = {max_err}");
    }

    #[test]
    fn full_strength_attenuates_noise() {
        let gate = SpectralGate::new(DenoiseConfig::default(), 16_000).unwrap();
        let input = noise(16_384);
        let output = gate.process(&input).unwrap();

        assert_eq!(output.len(), input.len());
        assert!(rms(&output) < rms(&input) * 0.9);
    }

    #[test]
    fn short_input_keeps_length() {
        let gate = SpectralGate::new(DenoiseConfig::default(), 16_000).unwrap();
        let input = noise(100);
        let output = gate.process(&input).unwrap();
        assert_eq!(output.len(), 100);
        assert!(output.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn empty_input_errors() {
        let gate = SpectralGate::new(DenoiseConfig::default(), 16_000).unwrap();
        assert!(matches!(gate.process(&[]), Err(DenoiseError::EmptyInput)));
    }

    #[test]
    fn rejects_non_power_of_two_fft() {
        let config = DenoiseConfig { fft_size: 1000, ..Default::default() };
        assert!(matches!(
            SpectralGate::new(config, 16_000),
            Err(DenoiseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_strength() {
        let config = DenoiseConfig { prop_decrease: 1.5, ..Default::default() };
        assert!(matches!(
            SpectralGate::new(config, 16_000),
            Err(DenoiseError::InvalidConfig(_))
        ));
    }
}
