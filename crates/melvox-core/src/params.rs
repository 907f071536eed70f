//! Vocoder hyper-parameters
//!
//! The glue layer only needs the slice of the training-time configuration
//! that affects inference and post-processing; the network topology itself
//! is frozen into the model graph.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameter validation error
#[derive(Error, Debug, PartialEq)]
pub enum ParamsError {
    /// A field that must be non-zero was zero
    #[error("{field} must be non-zero")]
    ZeroField {
        /// Offending field name
        field: &'static str,
    },

    /// A field was outside its valid range
    #[error("{field} out of range: {got} (expected {expected})")]
    OutOfRange {
        /// Offending field name
        field: &'static str,
        /// Value received
        got: f32,
        /// Human-readable expected range
        expected: &'static str,
    },
}

/// Output mode the model was trained with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VocoderMode {
    /// Quantized raw samples (optionally mu-law companded)
    #[default]
    Raw,
    /// Mixture-of-logistics output (continuous samples)
    Mol,
}

/// Inference-time vocoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocoderParams {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Samples generated per mel frame
    pub hop_length: usize,

    /// Mel channels the model expects
    pub num_mels: usize,

    /// Symmetric normalization range of the input mels
    /// (mels arrive in [-v, v] and are scaled to [-1, 1])
    pub mel_max_abs_value: f32,

    /// Quantization depth in RAW mode
    pub bits: u32,

    /// Whether RAW-mode samples are mu-law companded
    pub mu_law: bool,

    /// Output mode the model was trained with
    pub mode: VocoderMode,

    /// Lower bound of the dominant-frequency search (Hz)
    pub min_analysis_freq: f32,

    /// Dominant-frequency split deciding the denoising strength (Hz)
    pub split_freq: f32,

    /// Denoising strength for low-frequency dominant content
    pub prop_decrease_low_freq: f32,

    /// Denoising strength for high-frequency dominant content
    pub prop_decrease_high_freq: f32,
}

impl Default for VocoderParams {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            hop_length: 200,
            num_mels: 80,
            mel_max_abs_value: 4.0,
            bits: 9,
            mu_law: true,
            mode: VocoderMode::Raw,
            min_analysis_freq: 60.0,
            split_freq: 400.0,
            prop_decrease_low_freq: 0.6,
            prop_decrease_high_freq: 0.9,
        }
    }
}

impl VocoderParams {
    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.sample_rate == 0 {
            return Err(ParamsError::ZeroField { field: "sample_rate" });
        }
        if self.hop_length == 0 {
            return Err(ParamsError::ZeroField { field: "hop_length" });
        }
        if self.num_mels == 0 {
            return Err(ParamsError::ZeroField { field: "num_mels" });
        }
        if self.mel_max_abs_value <= 0.0 {
            return Err(ParamsError::OutOfRange {
                field: "mel_max_abs_value",
                got: self.mel_max_abs_value,
                expected: "> 0",
            });
        }
        if self.bits == 0 || self.bits > 16 {
            return Err(ParamsError::OutOfRange {
                field: "bits",
                got: self.bits as f32,
                expected: "1..=16",
            });
        }
        if self.split_freq <= self.min_analysis_freq {
            return Err(ParamsError::OutOfRange {
                field: "split_freq",
                got: self.split_freq,
                expected: "> min_analysis_freq",
            });
        }
        for (field, value) in [
            ("prop_decrease_low_freq", self.prop_decrease_low_freq),
            ("prop_decrease_high_freq", self.prop_decrease_high_freq),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParamsError::OutOfRange {
                    field,
                    got: value,
                    expected: "0.0..=1.0",
                });
            }
        }
        Ok(())
    }

    /// Number of quantization levels in RAW mode
    pub fn quant_levels(&self) -> u32 {
        1 << self.bits
    }

    /// Duration of one mel frame in milliseconds
    pub fn frame_ms(&self) -> f64 {
        self.hop_length as f64 / self.sample_rate as f64 * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        let params = VocoderParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.quant_levels(), 512);
    }

    #[test]
    fn rejects_zero_hop() {
        let params = VocoderParams { hop_length: 0, ..Default::default() };
        assert_eq!(
            params.validate(),
            Err(ParamsError::ZeroField { field: "hop_length" })
        );
    }

    #[test]
    fn rejects_strength_above_one() {
        let params = VocoderParams {
            prop_decrease_high_freq: 1.2,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::OutOfRange { field: "prop_decrease_high_freq", .. })
        ));
    }

    #[test]
    fn rejects_split_below_cutoff() {
        let params = VocoderParams { split_freq: 50.0, ..Default::default() };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::OutOfRange { field: "split_freq", .. })
        ));
    }

    #[test]
    fn roundtrips_through_json() {
        let params = VocoderParams { sample_rate: 22_050, ..Default::default() };
        let json = serde_json::to_string(&params).unwrap();
        let back: VocoderParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sample_rate, 22_050);
        assert_eq!(back.mode, VocoderMode::Raw);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let back: VocoderParams = serde_json::from_str(r#"{"sample_rate": 24000}"#).unwrap();
        assert_eq!(back.sample_rate, 24_000);
        assert_eq!(back.num_mels, 80);
    }
}
