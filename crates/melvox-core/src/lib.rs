//! # Melvox Core
//!
//! Shared types for the Melvox vocoder suite:
//! - Vocoder hyper-parameters (`VocoderParams`)
//! - Mu-law sample companding for RAW-mode models

#![warn(missing_docs)]

mod audio;
mod params;

pub use audio::{decode_mu_law, encode_mu_law, float_to_label, label_to_float};
pub use params::{ParamsError, VocoderMode, VocoderParams};

/// Audio sample type used throughout the suite
pub type Sample = f32;
