//! Overdrive/distortion effect.
//!
//! A composite stage built from four sub-filters, run in order on every
//! sample:
//!
//! 1. Anti-aliasing FIR low-pass: band-limits the input before the
//!    nonlinearity folds new harmonics back below Nyquist.
//! 2. First-order IIR high-pass: removes sub-audio content that sounds
//!    muddy once distorted.
//! 3. Soft-clip waveshaper: symmetric saturating nonlinearity applied to
//!    the pre-gained signal.
//! 4. Second-order damped IIR low-pass: smooths the clipped waveform
//!    before it reaches the output.
//!
//! The high-pass and reconstruction low-pass can be retuned live without
//! resetting their histories, under the same click-avoidance contract as
//! the peaking EQ.

use libm::{fabsf, tanf};

use core::f32::consts::PI;

use super::biquad::FilterConfigError;
use super::ring::DelayLine;

/// Tap count of the anti-aliasing FIR stage.
pub const ANTI_ALIAS_TAPS: usize = 31;

/// Anti-aliasing FIR coefficients: windowed-sinc low-pass designed offline
/// (Hamming window, cutoff fs/4, unity DC gain). Linear phase; applied
/// most-recent-first over the delay line.
const ANTI_ALIAS_COEF: [f32; ANTI_ALIAS_TAPS] = [
    -0.00170040, 0.0, 0.00293733, 0.0, -0.00673009, 0.0, 0.01409389, 0.0,
    -0.02678504, 0.0, 0.04909896, 0.0, -0.09693833, 0.0, 0.31561956, 0.50080823,
    0.31561956, 0.0, -0.09693833, 0.0, 0.04909896, 0.0, -0.02678504, 0.0,
    0.01409389, 0.0, -0.00673009, 0.0, 0.00293733, 0.0, -0.00170040,
];

/// Soft-clip ratio of the default threshold to full scale.
const DEFAULT_THRESHOLD: f32 = 1.0 / 3.0;

/// Multi-stage overdrive effect.
pub struct Overdrive {
    /// Sample period in seconds.
    sample_time: f32,

    /// Anti-aliasing FIR input history.
    fir_history: DelayLine<ANTI_ALIAS_TAPS>,

    /// High-pass input/output history, newest at index 0.
    hpf_x: [f32; 2],
    hpf_y: [f32; 2],
    /// Prewarped high-pass cutoff times the sample period.
    hpf_wct: f32,

    /// Gain applied before the waveshaper.
    pre_gain: f32,
    /// Waveshaper knee: linear below, saturated at 3× beyond 2×.
    threshold: f32,

    /// Reconstruction low-pass history, newest at index 0.
    lpf_x: [f32; 3],
    lpf_y: [f32; 3],
    /// Reconstruction low-pass coefficients, recomputed on retune.
    lpf_b0: f32,
    lpf_a1: f32,
    lpf_a2: f32,
    lpf_inv_a0: f32,
}

impl Overdrive {
    /// Default high-pass cutoff used when the constructor is handed an
    /// invalid one.
    pub const DEFAULT_HPF_CUTOFF_HZ: f32 = 150.0;
    /// Default reconstruction low-pass cutoff.
    pub const DEFAULT_LPF_CUTOFF_HZ: f32 = 8_000.0;
    /// Default reconstruction low-pass damping (critically damped).
    pub const DEFAULT_LPF_DAMPING: f32 = 1.0;
    /// Default pre-gain (no extra drive).
    pub const DEFAULT_PRE_GAIN: f32 = 1.0;

    /// Wire up all four stages with cleared histories. An out-of-range
    /// cutoff or damping value falls back to the matching `DEFAULT_*`
    /// constant.
    pub fn new(
        sample_rate_hz: f32,
        hpf_cutoff_hz: f32,
        pre_gain: f32,
        lpf_cutoff_hz: f32,
        lpf_damping: f32,
    ) -> Self {
        let mut od = Overdrive {
            sample_time: 1.0 / sample_rate_hz,
            fir_history: DelayLine::new(),
            hpf_x: [0.0; 2],
            hpf_y: [0.0; 2],
            hpf_wct: 0.0,
            pre_gain,
            threshold: DEFAULT_THRESHOLD,
            lpf_x: [0.0; 3],
            lpf_y: [0.0; 3],
            lpf_b0: 0.0,
            lpf_a1: 0.0,
            lpf_a2: 0.0,
            lpf_inv_a0: 1.0,
        };
        if od.set_hpf(hpf_cutoff_hz).is_err() {
            let _ = od.set_hpf(Self::DEFAULT_HPF_CUTOFF_HZ);
        }
        if od.set_lpf(lpf_cutoff_hz, lpf_damping).is_err() {
            let _ = od.set_lpf(Self::DEFAULT_LPF_CUTOFF_HZ, Self::DEFAULT_LPF_DAMPING);
        }
        od
    }

    /// Retune the input high-pass cutoff. History is untouched.
    ///
    /// A cutoff outside (0, Nyquist) is rejected without modifying the
    /// stage: past Nyquist the prewarped coefficient goes negative and the
    /// pole leaves the unit circle, after which the state diverges and no
    /// later retune can recover it.
    pub fn set_hpf(&mut self, cutoff_hz: f32) -> Result<(), FilterConfigError> {
        let nyquist_hz = 0.5 / self.sample_time;
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist_hz) {
            return Err(FilterConfigError::CutoffOutOfRange);
        }
        self.hpf_wct = 2.0 * tanf(PI * cutoff_hz * self.sample_time);
        Ok(())
    }

    /// Retune the reconstruction low-pass cutoff and damping factor.
    /// History is untouched. Rejects a cutoff outside (0, Nyquist) or a
    /// non-positive damping factor without modifying the stage.
    pub fn set_lpf(&mut self, cutoff_hz: f32, damping: f32) -> Result<(), FilterConfigError> {
        let nyquist_hz = 0.5 / self.sample_time;
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist_hz) {
            return Err(FilterConfigError::CutoffOutOfRange);
        }
        if !(damping > 0.0) {
            return Err(FilterConfigError::NonPositiveDamping);
        }

        // Bilinear transform of wc² / (s² + 2ζ·wc·s + wc²), prewarped.
        let wct = 2.0 * tanf(PI * cutoff_hz * self.sample_time);
        let wct2 = wct * wct;
        self.lpf_b0 = wct2;
        self.lpf_a1 = 2.0 * wct2 - 8.0;
        self.lpf_a2 = 4.0 - 4.0 * damping * wct + wct2;
        self.lpf_inv_a0 = 1.0 / (4.0 + 4.0 * damping * wct + wct2);
        Ok(())
    }

    /// Set the gain applied ahead of the waveshaper.
    pub fn set_pre_gain(&mut self, pre_gain: f32) {
        self.pre_gain = pre_gain;
    }

    /// Run one sample through all four stages.
    pub fn update(&mut self, input: f32) -> f32 {
        // 1. Anti-aliasing FIR: dot product of the tap coefficients with
        //    the most recent inputs.
        self.fir_history.push(input);
        let mut band_limited = 0.0;
        for (&coef, sample) in ANTI_ALIAS_COEF.iter().zip(self.fir_history.iter_recent()) {
            band_limited += coef * sample;
        }

        // 2. First-order high-pass: responds to the change in input,
        //    damped by the prewarped cutoff coefficient.
        self.hpf_x[1] = self.hpf_x[0];
        self.hpf_x[0] = band_limited;
        self.hpf_y[1] = self.hpf_y[0];
        self.hpf_y[0] = (2.0 * (self.hpf_x[0] - self.hpf_x[1])
            + (2.0 - self.hpf_wct) * self.hpf_y[1])
            / (2.0 + self.hpf_wct);

        // 3. Waveshaper on the pre-gained signal.
        let shaped = soft_clip(self.pre_gain * self.hpf_y[0], self.threshold);

        // 4. Reconstruction low-pass.
        self.lpf_x[2] = self.lpf_x[1];
        self.lpf_x[1] = self.lpf_x[0];
        self.lpf_x[0] = shaped;
        self.lpf_y[2] = self.lpf_y[1];
        self.lpf_y[1] = self.lpf_y[0];
        self.lpf_y[0] = (self.lpf_b0 * (self.lpf_x[0] + 2.0 * self.lpf_x[1] + self.lpf_x[2])
            - self.lpf_a1 * self.lpf_y[1]
            - self.lpf_a2 * self.lpf_y[2])
            * self.lpf_inv_a0;

        self.lpf_y[0]
    }
}

/// Symmetric three-segment soft clip.
///
/// Linear (slope 2) below `threshold`, quadratic knee up to `2·threshold`,
/// saturated at `3·threshold` beyond. With the default threshold of 1/3
/// the output saturates at exactly full scale.
fn soft_clip(x: f32, threshold: f32) -> f32 {
    let mag = fabsf(x);
    let sign = if x < 0.0 { -1.0 } else { 1.0 };

    if mag < threshold {
        2.0 * x
    } else if mag < 2.0 * threshold {
        let knee = 2.0 - mag / threshold;
        sign * (3.0 - knee * knee) * threshold
    } else {
        sign * 3.0 * threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SAMPLE_RATE_HZ;

    fn make_overdrive() -> Overdrive {
        Overdrive::new(SAMPLE_RATE_HZ, 150.0, 2.0, 8_000.0, 1.0)
    }

    #[test]
    fn anti_alias_taps_are_linear_phase_with_unity_dc_gain() {
        let sum: f32 = ANTI_ALIAS_COEF.iter().sum();
        assert!(fabsf(sum - 1.0) < 1e-5, "DC gain {sum}");
        for i in 0..ANTI_ALIAS_TAPS {
            assert_eq!(ANTI_ALIAS_COEF[i], ANTI_ALIAS_COEF[ANTI_ALIAS_TAPS - 1 - i]);
        }
    }

    #[test]
    fn soft_clip_is_symmetric_and_saturating() {
        let th = 1.0 / 3.0;
        let mut x = -3.0f32;
        while x <= 3.0 {
            let y = soft_clip(x, th);
            assert_eq!(y, -soft_clip(-x, th));
            assert!(fabsf(y) <= 3.0 * th + 1e-6);
            x += 0.01;
        }
        // Saturated region clamps to exactly full scale for th = 1/3.
        assert!(fabsf(soft_clip(5.0, th) - 1.0) < 1e-6);
        assert!(fabsf(soft_clip(-5.0, th) + 1.0) < 1e-6);
    }

    #[test]
    fn soft_clip_is_monotonic() {
        let th = 1.0 / 3.0;
        let mut prev = soft_clip(-3.0, th);
        let mut x = -3.0f32 + 0.01;
        while x <= 3.0 {
            let y = soft_clip(x, th);
            assert!(y >= prev - 1e-6, "non-monotonic at x={x}");
            prev = y;
            x += 0.01;
        }
    }

    #[test]
    fn soft_clip_linear_region_doubles() {
        let th = 1.0 / 3.0;
        assert_eq!(soft_clip(0.1, th), 0.2);
        assert_eq!(soft_clip(-0.1, th), -0.2);
        assert_eq!(soft_clip(0.0, th), 0.0);
    }

    #[test]
    fn update_returns_the_completed_signal_path() {
        // A burst through the chain must come out the far end: the output
        // path is wired FIR → HPF → waveshaper → LPF → return.
        let mut od = make_overdrive();
        let mut energy = 0.0f32;
        for n in 0..2000 {
            let x = if n % 97 < 48 { 0.4 } else { -0.4 };
            energy += fabsf(od.update(x));
        }
        assert!(energy > 1.0, "output path produced no signal");
    }

    #[test]
    fn high_pass_blocks_dc() {
        let mut od = make_overdrive();
        let mut out = 0.0;
        for _ in 0..48_000 {
            out = od.update(0.5);
        }
        // A constant input decays to silence through the high-pass stage.
        assert!(fabsf(out) < 1e-3, "DC leaked through: {out}");
    }

    #[test]
    fn output_stays_bounded_under_heavy_drive() {
        let mut od = Overdrive::new(SAMPLE_RATE_HZ, 150.0, 50.0, 8_000.0, 1.0);
        for n in 0..10_000 {
            let x = libm::sinf(2.0 * PI * 440.0 * n as f32 / SAMPLE_RATE_HZ);
            let y = od.update(x);
            // Waveshaper caps at 1.0; the damped low-pass may ring
            // slightly but never runs away.
            assert!(fabsf(y) < 1.5, "unbounded output {y} at n={n}");
        }
    }

    #[test]
    fn out_of_range_retunes_are_rejected_without_mutation() {
        let mut od = make_overdrive();
        let mut witness = make_overdrive();

        assert_eq!(od.set_hpf(30_000.0), Err(FilterConfigError::CutoffOutOfRange));
        assert_eq!(od.set_hpf(0.0), Err(FilterConfigError::CutoffOutOfRange));
        assert_eq!(od.set_hpf(-10.0), Err(FilterConfigError::CutoffOutOfRange));
        assert_eq!(od.set_hpf(f32::NAN), Err(FilterConfigError::CutoffOutOfRange));
        assert_eq!(
            od.set_lpf(60_000.0, 1.0),
            Err(FilterConfigError::CutoffOutOfRange)
        );
        assert_eq!(
            od.set_lpf(8_000.0, 0.0),
            Err(FilterConfigError::NonPositiveDamping)
        );
        assert_eq!(
            od.set_lpf(8_000.0, f32::NAN),
            Err(FilterConfigError::NonPositiveDamping)
        );

        // Coefficients unchanged: identical output to the witness stage.
        for n in 0..500 {
            let x = libm::sinf(0.29 * n as f32);
            assert_eq!(od.update(x), witness.update(x));
        }
    }

    #[test]
    fn rejected_retune_cannot_destabilize_the_stage() {
        // A past-Nyquist cutoff would flip the high-pass pole outside the
        // unit circle and pin the output at full scale for good. The
        // retune must bounce off instead.
        let mut od = make_overdrive();
        assert!(od.set_hpf(30_000.0).is_err());

        for n in 0..4_800 {
            let x = libm::sinf(2.0 * PI * 440.0 * n as f32 / SAMPLE_RATE_HZ);
            let y = od.update(x);
            assert!(fabsf(y) < 1.5, "stage destabilized: {y} at n={n}");
        }

        od.set_hpf(150.0).unwrap();
        let mut out = 0.0;
        for _ in 0..48_000 {
            out = od.update(0.0);
        }
        assert!(fabsf(out) < 1e-3, "silence did not settle to silence: {out}");
    }

    #[test]
    fn constructor_falls_back_to_defaults_for_invalid_wiring() {
        let mut od = Overdrive::new(SAMPLE_RATE_HZ, 90_000.0, 2.0, -1.0, 0.0);
        let mut reference = make_overdrive();
        for n in 0..500 {
            let x = libm::sinf(0.29 * n as f32);
            assert_eq!(od.update(x), reference.update(x));
        }
    }

    #[test]
    fn retune_preserves_history() {
        let mut retuned = make_overdrive();
        for n in 0..200 {
            retuned.update(if (n / 50) % 2 == 0 { 0.6 } else { -0.6 });
        }
        retuned.set_lpf(4_000.0, 0.7).unwrap();
        retuned.set_hpf(300.0).unwrap();
        let after_retune = retuned.update(0.0);

        let mut fresh = Overdrive::new(SAMPLE_RATE_HZ, 300.0, 2.0, 4_000.0, 0.7);
        let from_rest = fresh.update(0.0);

        assert_eq!(from_rest, 0.0);
        assert!(fabsf(after_retune - from_rest) > 1e-9);
    }
}
