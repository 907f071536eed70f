//! Batched generation helpers
//!
//! Long mels are folded into overlapping segments so the network can run
//! them as a batch, then the per-segment waveforms are crossfaded back
//! together. Fold boundaries use an equal-power crossfade with half the
//! overlap kept silent, which hides the seam between segments.

use crate::Mel;
use ndarray::s;

/// Split a mel spectrogram into overlapping folds along the time axis.
///
/// Each fold spans `target + 2 * overlap` frames and consecutive folds are
/// offset by `target + overlap` frames. The tail is zero-padded so the last
/// fold is full.
pub fn fold_with_overlap(mel: &Mel, target: usize, overlap: usize) -> Vec<Mel> {
    let total = mel.ncols();
    let seg = target + 2 * overlap;

    let mut num_folds = if total > overlap {
        (total - overlap) / (target + overlap)
    } else {
        0
    };

    let extended = num_folds * (target + overlap) + overlap;
    if total > extended {
        num_folds += 1;
    }
    // Degenerate input shorter than one overlap still yields one fold
    num_folds = num_folds.max(1);

    let mut folds = Vec::with_capacity(num_folds);
    for i in 0..num_folds {
        let start = i * (target + overlap);
        let end = (start + seg).min(total);

        let mut fold = Mel::zeros((mel.nrows(), seg));
        if start < total {
            fold.slice_mut(s![.., ..end - start])
                .assign(&mel.slice(s![.., start..end]));
        }
        folds.push(fold);
    }

    folds
}

/// Crossfade per-fold waveforms back into one signal.
///
/// Each fold must hold `target + 2 * overlap` samples. The head of each fold
/// fades in and the tail fades out with an equal-power curve, the remaining
/// half-overlap is silenced, and everything is overlap-added at a stride of
/// `target + overlap`. Output length is
/// `num_folds * (target + overlap) + overlap`.
pub fn xfade_and_unfold(folds: &[Vec<f32>], target: usize, overlap: usize) -> Vec<f32> {
    let num_folds = folds.len();
    if num_folds == 0 {
        return Vec::new();
    }

    let seg = target + 2 * overlap;
    let silence_len = overlap / 2;
    let fade_len = overlap - silence_len;

    // Equal-power fade pair over fade_len samples
    let fade_curve = |i: usize, rising: bool| -> f32 {
        if fade_len <= 1 {
            return if rising { 1.0 } else { 0.0 };
        }
        let t = -1.0 + 2.0 * i as f32 / (fade_len - 1) as f32;
        let t = if rising { t } else { -t };
        (0.5 * (1.0 + t)).sqrt()
    };

    // fade_in:  [silence, rising curve]   applied to the first `overlap`
    // fade_out: [falling curve, silence]  applied to the last `overlap`
    let mut fade_in = vec![0.0f32; overlap];
    let mut fade_out = vec![0.0f32; overlap];
    for i in 0..fade_len {
        fade_in[silence_len + i] = fade_curve(i, true);
        fade_out[i] = fade_curve(i, false);
    }

    let total_len = num_folds * (target + overlap) + overlap;
    let mut unfolded = vec![0.0f32; total_len];

    for (i, fold) in folds.iter().enumerate() {
        debug_assert_eq!(fold.len(), seg);
        let start = i * (target + overlap);

        for (j, &sample) in fold.iter().enumerate().take(seg) {
            let gain = if overlap > 0 && j < overlap {
                fade_in[j]
            } else if overlap > 0 && j >= seg - overlap {
                fade_out[j - (seg - overlap)]
            } else {
                1.0
            };
            unfolded[start + j] += sample * gain;
        }
    }

    unfolded
}
