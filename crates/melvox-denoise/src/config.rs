//! Denoiser configuration

use serde::{Deserialize, Serialize};

/// Spectral gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    /// STFT size (power of two)
    pub fft_size: usize,

    /// Proportion to reduce gated-out noise by (0.0 = bypass, 1.0 = full gate)
    pub prop_decrease: f32,

    /// Noise threshold in standard deviations above the per-bin mean
    pub n_std_thresh: f32,

    /// Mask smoothing width across frequency (Hz)
    pub freq_smooth_hz: f32,

    /// Mask smoothing width across time (ms)
    pub time_smooth_ms: f32,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            prop_decrease: 1.0,
            n_std_thresh: 1.5,
            freq_smooth_hz: 500.0,
            time_smooth_ms: 50.0,
        }
    }
}

impl DenoiseConfig {
    /// Config with a specific reduction strength
    pub fn with_strength(prop_decrease: f32) -> Self {
        Self {
            prop_decrease: prop_decrease.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Gentle reduction that favors signal preservation
    pub fn gentle() -> Self {
        Self {
            prop_decrease: 0.5,
            n_std_thresh: 2.0,
            ..Default::default()
        }
    }

    /// Maximum reduction for heavily degraded material
    pub fn aggressive() -> Self {
        Self {
            prop_decrease: 1.0,
            n_std_thresh: 1.0,
            ..Default::default()
        }
    }

    /// STFT hop size (75% overlap)
    pub fn hop_size(&self) -> usize {
        self.fft_size / 4
    }
}
