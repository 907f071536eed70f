//! Error types for vocoder inference

use thiserror::Error;

/// Vocoder runtime error types
#[derive(Error, Debug)]
pub enum VocoderError {
    /// Model file not found
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// Path that was checked
        path: String,
    },

    /// Model loading failed
    #[error("Failed to load model: {reason}")]
    ModelLoadFailed {
        /// Backend failure description
        reason: String,
    },

    /// Inference requested before a model was loaded
    #[error("No vocoder model loaded; call load_model first")]
    ModelNotLoaded,

    /// Mel spectrogram has the wrong shape
    #[error("Invalid mel shape: expected {expected}, got {got}")]
    InvalidMelShape {
        /// Expected layout
        expected: String,
        /// Actual layout
        got: String,
    },

    /// Synthesis options are inconsistent with the model parameters
    #[error("Invalid synthesis options: {0}")]
    InvalidOptions(String),

    /// Model produced an unexpected output
    #[error("Invalid output shape: expected {expected}, got {got}")]
    InvalidOutputShape {
        /// Expected layout
        expected: String,
        /// Actual layout
        got: String,
    },

    /// Inference failed
    #[error("Inference failed: {reason}")]
    InferenceFailed {
        /// Backend failure description
        reason: String,
    },

    /// Tract error
    #[error("Tract error: {0}")]
    TractError(String),

    /// Invalid vocoder parameters
    #[error("Invalid parameters: {0}")]
    Params(#[from] melvox_core::ParamsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vocoder operations
pub type VocoderResult<T> = Result<T, VocoderError>;
