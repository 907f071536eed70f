//! Process-wide model state
//!
//! Hosts load one vocoder for the lifetime of the process and call into it
//! from wherever synthesis output lands. The slot is a plain RwLock: loads
//! are rare, inference takes a read lock and a cheap Arc clone so long
//! synthesis runs never hold the lock.

use crate::error::{VocoderError, VocoderResult};
use crate::model::{ProgressFn, SynthesisOptions, Vocoder};
use crate::Mel;
use melvox_core::VocoderParams;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

static MODEL: RwLock<Option<Arc<Vocoder>>> = RwLock::new(None);

/// Load a pretrained vocoder into the process-wide slot, replacing any
/// previously loaded model.
pub fn load_model<P: AsRef<Path>>(path: P, params: VocoderParams) -> VocoderResult<()> {
    let vocoder = Vocoder::load(path, params)?;
    *MODEL.write() = Some(Arc::new(vocoder));
    Ok(())
}

/// Whether a model is currently resident
pub fn is_loaded() -> bool {
    MODEL.read().is_some()
}

/// Drop the resident model, releasing its memory
pub fn unload_model() {
    *MODEL.write() = None;
}

/// Get a handle to the resident model
pub fn loaded() -> Option<Arc<Vocoder>> {
    MODEL.read().clone()
}

/// Synthesize a waveform from a mel spectrogram using the resident model.
///
/// Errors with [`VocoderError::ModelNotLoaded`] when no model has been
/// loaded yet.
pub fn infer_waveform(mel: &Mel, opts: &SynthesisOptions) -> VocoderResult<Vec<f32>> {
    infer_waveform_with(mel, opts, None)
}

/// Synthesize with an optional progress callback
pub fn infer_waveform_with(
    mel: &Mel,
    opts: &SynthesisOptions,
    progress: Option<&ProgressFn>,
) -> VocoderResult<Vec<f32>> {
    let vocoder = loaded().ok_or(VocoderError::ModelNotLoaded)?;
    vocoder.synthesize_with(mel, opts, progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global slot is shared between tests in this binary, so every test
    // here must leave it empty.

    #[test]
    fn starts_unloaded_and_guards_inference() {
        assert!(!is_loaded());
        assert!(loaded().is_none());

        let mel = Mel::zeros((80, 10));
        let result = infer_waveform(&mel, &SynthesisOptions::default());
        assert!(matches!(result, Err(VocoderError::ModelNotLoaded)));
    }

    #[test]
    fn load_failure_leaves_slot_empty() {
        let result = load_model("/nonexistent/wavernn.onnx", VocoderParams::default());
        assert!(matches!(result, Err(VocoderError::ModelNotFound { .. })));
        assert!(!is_loaded());
    }

    #[test]
    fn unload_is_idempotent() {
        unload_model();
        unload_model();
        assert!(!is_loaded());
    }
}
