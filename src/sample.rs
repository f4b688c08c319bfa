//! Transport sample format conversion.
//!
//! The I2S transport carries signed 16-bit samples; the filters work on
//! normalized `f32`. Conversion back to the transport format saturates
//! rather than wraps, so a filter stage driven past full scale clips
//! instead of folding over.

/// One transport-format audio sample.
pub type Sample = i16;

/// Full-scale value for the 16-bit transport format.
const FULL_SCALE: f32 = 32767.0;

/// Convert a transport sample to the normalized float working format.
#[inline(always)]
pub fn sample_to_f32(sample: Sample) -> f32 {
    sample as f32 / FULL_SCALE
}

/// Convert a normalized float back to the transport format, saturating at
/// ±full scale.
#[inline(always)]
pub fn f32_to_sample(value: f32) -> Sample {
    let clamped = if value > 1.0 {
        1.0
    } else if value < -1.0 {
        -1.0
    } else {
        value
    };
    (clamped * FULL_SCALE) as Sample
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_within_one_lsb() {
        for &s in &[0i16, 1, -1, 100, -100, 12345, -12345, 32767, -32767] {
            let back = f32_to_sample(sample_to_f32(s));
            assert!((back - s).abs() <= 1, "roundtrip of {s} gave {back}");
        }
    }

    #[test]
    fn conversion_saturates() {
        assert_eq!(f32_to_sample(1.5), 32767);
        assert_eq!(f32_to_sample(-1.5), -32767);
        assert_eq!(f32_to_sample(100.0), 32767);
        assert_eq!(f32_to_sample(-100.0), -32767);
    }

    #[test]
    fn zero_maps_to_zero() {
        assert_eq!(f32_to_sample(0.0), 0);
        assert_eq!(sample_to_f32(0), 0.0);
    }

    #[test]
    fn full_scale_endpoints() {
        assert_eq!(f32_to_sample(1.0), 32767);
        assert_eq!(f32_to_sample(-1.0), -32767);
        assert_eq!(sample_to_f32(32767), 1.0);
    }
}
