//! Second-order parametric peaking equalizer.
//!
//! One biquad section realizing a boost or cut around a centre frequency,
//! designed with the bilinear transform of the analog prototype
//!
//! ```text
//!          s² + (g/Q)·wc·s + wc²
//! H(s) =  ───────────────────────
//!          s² + (1/Q)·wc·s + wc²
//! ```
//!
//! with the centre frequency prewarped (`wc·T = 2·tan(π·f/fs)`) so the peak
//! lands exactly on the requested digital frequency. With `g = 1` the
//! numerator equals the denominator and the stage is an exact identity.

use libm::tanf;

use core::f32::consts::PI;

/// Rejected filter configuration. The existing coefficients are left
/// untouched when any of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterConfigError {
    /// Centre frequency not strictly between 0 and Nyquist.
    CentreFrequencyOutOfRange,
    /// Cutoff frequency not strictly between 0 and Nyquist.
    CutoffOutOfRange,
    /// Quality factor must be strictly positive.
    NonPositiveQ,
    /// Linear boost/cut gain must be strictly positive.
    NonPositiveGain,
    /// Damping factor must be strictly positive.
    NonPositiveDamping,
}

/// A second-order IIR peaking filter section.
///
/// Coefficients may be replaced at any time via
/// [`set_parameters()`](Self::set_parameters); the 3-deep sample histories
/// are never reset by a retune, so coefficient changes take effect on the
/// next sample without an audible discontinuity.
pub struct PeakingFilter {
    /// Sample period in seconds.
    sample_time: f32,
    /// Input history, newest at index 0.
    x: [f32; 3],
    /// Output history, newest at index 0.
    y: [f32; 3],
    /// Numerator coefficients (scale with the boost/cut gain).
    b: [f32; 3],
    /// Denominator damping terms (Q-dependent), leading coefficient removed.
    a1: f32,
    a2: f32,
    /// Reciprocal of the leading denominator coefficient, precomputed.
    inv_a0: f32,
}

impl PeakingFilter {
    /// Default centre frequency installed by [`new()`](Self::new). With
    /// unity gain the value is irrelevant to the response; it only seeds
    /// the coefficients until the stage is explicitly parameterized.
    /// Midband is chosen over an edge-of-band default so the seeded
    /// coefficients stay far from the prewarp singularity at Nyquist.
    const DEFAULT_CENTRE_HZ: f32 = 1_000.0;

    /// Create an inert (identity) filter for the given sample rate.
    pub fn new(sample_rate_hz: f32) -> Self {
        let mut filter = PeakingFilter {
            sample_time: 1.0 / sample_rate_hz,
            x: [0.0; 3],
            y: [0.0; 3],
            b: [1.0, 0.0, 0.0],
            a1: 0.0,
            a2: 0.0,
            inv_a0: 1.0,
        };
        // Unity boost/cut makes the stage an identity at any centre/Q.
        let _ = filter.set_parameters(Self::DEFAULT_CENTRE_HZ, 1.0, 1.0);
        filter
    }

    /// Recompute the coefficients for a new centre frequency, quality
    /// factor and linear boost/cut gain (`> 1` boosts, `< 1` cuts, `= 1`
    /// is a no-op).
    ///
    /// The sample histories are deliberately untouched. Invalid parameters
    /// are rejected without modifying the current coefficients.
    pub fn set_parameters(
        &mut self,
        centre_hz: f32,
        q: f32,
        boost_cut: f32,
    ) -> Result<(), FilterConfigError> {
        let nyquist_hz = 0.5 / self.sample_time;
        if !(centre_hz > 0.0 && centre_hz < nyquist_hz) {
            return Err(FilterConfigError::CentreFrequencyOutOfRange);
        }
        if !(q > 0.0) {
            return Err(FilterConfigError::NonPositiveQ);
        }
        if !(boost_cut > 0.0) {
            return Err(FilterConfigError::NonPositiveGain);
        }

        // Prewarped angular frequency times the sample period.
        let wct = 2.0 * tanf(PI * centre_hz * self.sample_time);
        let wct2 = wct * wct;

        self.b = [
            4.0 + 2.0 * (boost_cut / q) * wct + wct2,
            2.0 * wct2 - 8.0,
            4.0 - 2.0 * (boost_cut / q) * wct + wct2,
        ];
        self.a1 = 2.0 * wct2 - 8.0;
        self.a2 = 4.0 - (2.0 / q) * wct + wct2;
        self.inv_a0 = 1.0 / (4.0 + (2.0 / q) * wct + wct2);

        Ok(())
    }

    /// Run one sample through the filter.
    #[inline]
    pub fn update(&mut self, input: f32) -> f32 {
        self.x[2] = self.x[1];
        self.x[1] = self.x[0];
        self.x[0] = input;

        self.y[2] = self.y[1];
        self.y[1] = self.y[0];

        self.y[0] = (self.b[0] * self.x[0] + self.b[1] * self.x[1] + self.b[2] * self.x[2]
            - self.a1 * self.y[1]
            - self.a2 * self.y[2])
            * self.inv_a0;

        self.y[0]
    }
}
