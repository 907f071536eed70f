//! Sample codecs for RAW-mode models
//!
//! RAW-mode vocoders emit class labels over `2^bits` quantization levels,
//! optionally mu-law companded. These helpers convert between label space,
//! companded floats and linear floats.

/// Convert a quantized label in `0..2^bits` to a float in [-1, 1]
pub fn label_to_float(label: f32, bits: u32) -> f32 {
    2.0 * label / ((1u32 << bits) - 1) as f32 - 1.0
}

/// Convert a float in [-1, 1] to a quantized label in `0..2^bits`
pub fn float_to_label(x: f32, bits: u32) -> f32 {
    let max_label = ((1u32 << bits) - 1) as f32;
    ((x + 1.0) * max_label / 2.0).clamp(0.0, max_label)
}

/// Mu-law compand a linear sample in [-1, 1] to a label in `0..mu`
pub fn encode_mu_law(x: f32, mu: u32) -> f32 {
    let mu = (mu - 1) as f32;
    let fx = x.signum() * (1.0 + mu * x.abs()).ln() / (1.0 + mu).ln();
    ((fx + 1.0) / 2.0 * mu + 0.5).floor()
}

/// Expand a mu-law companded sample back to linear
///
/// `y` is a float in [-1, 1]; use [`label_to_float`] first when decoding
/// from label space.
pub fn decode_mu_law(y: f32, mu: u32) -> f32 {
    let mu = (mu - 1) as f32;
    y.signum() / mu * ((1.0 + mu).powf(y.abs()) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BITS: u32 = 9;
    const MU: u32 = 1 << BITS;

    #[test]
    fn label_float_roundtrip() {
        assert_relative_eq!(label_to_float(0.0, BITS), -1.0);
        assert_relative_eq!(label_to_float(511.0, BITS), 1.0);
        assert_relative_eq!(float_to_label(label_to_float(200.0, BITS), BITS), 200.0, epsilon = 1e-3);
    }

    #[test]
    fn float_to_label_clamps() {
        assert_eq!(float_to_label(2.0, BITS), 511.0);
        assert_eq!(float_to_label(-2.0, BITS), 0.0);
    }

    #[test]
    fn mu_law_roundtrip_within_one_step() {
        // One companded quantization step maps to at most ~2/mu linear error
        // near zero, wider near full scale.
        for &x in &[-0.95f32, -0.5, -0.01, 0.0, 0.01, 0.33, 0.8, 0.99] {
            let label = encode_mu_law(x, MU);
            let y = label_to_float(label, BITS);
            let back = decode_mu_law(y, MU);
            assert!((back - x).abs() < 0.02, "x={x} back={back}");
        }
    }

    #[test]
    fn mu_law_is_odd_symmetric() {
        let pos = decode_mu_law(0.5, MU);
        let neg = decode_mu_law(-0.5, MU);
        assert_relative_eq!(pos, -neg, epsilon = 1e-6);
    }

    #[test]
    fn silence_maps_to_midpoint() {
        let label = encode_mu_law(0.0, MU);
        // floor(mu/2 + 0.5) with mu = 511
        assert_relative_eq!(label, 256.0);
        assert!(decode_mu_law(label_to_float(label, BITS), MU).abs() < 1e-2);
    }
}
