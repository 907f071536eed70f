//! Error types for noise reduction

use thiserror::Error;

/// Noise reduction error types
#[derive(Error, Debug)]
pub enum DenoiseError {
    /// Input waveform was empty
    #[error("Input waveform is empty")]
    EmptyInput,

    /// Input too short for the requested analysis
    #[error("Input too short: {got} samples, need at least {needed}")]
    InputTooShort {
        /// Samples received
        got: usize,
        /// Minimum required
        needed: usize,
    },

    /// Configuration rejected
    #[error("Invalid denoise config: {0}")]
    InvalidConfig(String),

    /// FFT processing error
    #[error("FFT error: {0}")]
    Fft(String),
}

/// Result type for denoise operations
pub type DenoiseResult<T> = Result<T, DenoiseError>;
