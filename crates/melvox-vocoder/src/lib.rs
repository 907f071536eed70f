//! # Melvox Vocoder Runtime
//!
//! Inference glue around a pretrained neural vocoder: loads an ONNX
//! waveform-generation graph and turns mel spectrograms into audio.
//!
//! The network itself is an opaque collaborator; this crate owns everything
//! around it: mel normalization, batched generation with overlap folding
//! and equal-power crossfade unfolding, mu-law expansion for RAW-mode
//! models, and the process-wide model slot.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use melvox_core::VocoderParams;
//! use melvox_vocoder::{self as vocoder, SynthesisOptions};
//!
//! vocoder::load_model("models/wavernn.onnx", VocoderParams::default())?;
//! assert!(vocoder::is_loaded());
//!
//! let wav = vocoder::infer_waveform(&mel, &SynthesisOptions::default())?;
//! ```

#![warn(missing_docs)]

mod batch;
mod error;
mod inference;
mod model;
mod state;

pub use batch::{fold_with_overlap, xfade_and_unfold};
pub use error::{VocoderError, VocoderResult};
pub use inference::{ExecutionProvider, InferenceConfig, InferenceEngine};
pub use model::{ProgressFn, SynthesisOptions, Vocoder};
pub use state::{infer_waveform, infer_waveform_with, is_loaded, load_model, loaded, unload_model};

/// Mel spectrogram layout: `[num_mels, frames]`
pub type Mel = ndarray::Array2<f32>;
