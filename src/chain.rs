//! Per-channel filter chain.
//!
//! Each audio channel owns one [`FilterChain`]: a fixed sequence of
//! parametric EQ stages, an optional overdrive stage, and a volume scalar.
//! Channels are fully independent; no state is shared between chains.

use crate::constants::MAX_EQ_STAGES;
use crate::dsp::{FilterConfigError, Overdrive, PeakingFilter};
use crate::sample::{f32_to_sample, sample_to_f32, Sample};

/// Rejected chain configuration. Existing state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChainConfigError {
    /// EQ stage index beyond [`MAX_EQ_STAGES`].
    StageOutOfRange,
    /// Parameters rejected by the addressed filter stage.
    Filter(FilterConfigError),
}

impl From<FilterConfigError> for ChainConfigError {
    fn from(err: FilterConfigError) -> Self {
        ChainConfigError::Filter(err)
    }
}

/// Ordered filter stages plus volume for one audio channel.
///
/// [`process()`](Self::process) is the only audio-path operation and is not
/// reentrant: one chain must only ever be driven from one context at a time.
pub struct FilterChain {
    eq: [PeakingFilter; MAX_EQ_STAGES],
    overdrive: Overdrive,
    overdrive_enabled: bool,
    volume: f32,
}

impl FilterChain {
    /// Create a chain of inert stages at unity volume.
    pub fn new(sample_rate_hz: f32) -> Self {
        FilterChain {
            eq: [
                PeakingFilter::new(sample_rate_hz),
                PeakingFilter::new(sample_rate_hz),
                PeakingFilter::new(sample_rate_hz),
            ],
            overdrive: Overdrive::new(
                sample_rate_hz,
                Overdrive::DEFAULT_HPF_CUTOFF_HZ,
                Overdrive::DEFAULT_PRE_GAIN,
                Overdrive::DEFAULT_LPF_CUTOFF_HZ,
                Overdrive::DEFAULT_LPF_DAMPING,
            ),
            overdrive_enabled: false,
            volume: 1.0,
        }
    }

    /// Run one transport sample through every enabled stage, apply the
    /// channel volume, and convert back with saturation.
    #[inline]
    pub fn process(&mut self, input: Sample) -> Sample {
        let mut value = sample_to_f32(input);

        for stage in self.eq.iter_mut() {
            value = stage.update(value);
        }

        if self.overdrive_enabled {
            value = self.overdrive.update(value);
        }

        f32_to_sample(value * self.volume)
    }

    /// Retune one EQ stage. Rejects an out-of-range stage index or invalid
    /// filter parameters without touching any state.
    pub fn set_eq_parameters(
        &mut self,
        stage: usize,
        centre_hz: f32,
        q: f32,
        boost_cut: f32,
    ) -> Result<(), ChainConfigError> {
        let filter = self
            .eq
            .get_mut(stage)
            .ok_or(ChainConfigError::StageOutOfRange)?;
        filter.set_parameters(centre_hz, q, boost_cut)?;
        Ok(())
    }

    /// Set the channel volume multiplier (negative values clamp to mute).
    pub fn set_volume(&mut self, gain: f32) {
        self.volume = if gain < 0.0 { 0.0 } else { gain };
    }

    /// Current volume multiplier.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Switch the overdrive stage in or out of the signal path. The stage
    /// keeps its history either way.
    pub fn set_overdrive_enabled(&mut self, enabled: bool) {
        self.overdrive_enabled = enabled;
    }

    /// Whether the overdrive stage is in the signal path.
    pub fn overdrive_enabled(&self) -> bool {
        self.overdrive_enabled
    }

    /// Retune the overdrive input high-pass. Rejects an out-of-range
    /// cutoff without touching the stage.
    pub fn set_overdrive_hpf(&mut self, cutoff_hz: f32) -> Result<(), ChainConfigError> {
        self.overdrive.set_hpf(cutoff_hz)?;
        Ok(())
    }

    /// Retune the overdrive reconstruction low-pass. Rejects an
    /// out-of-range cutoff or damping factor without touching the stage.
    pub fn set_overdrive_lpf(
        &mut self,
        cutoff_hz: f32,
        damping: f32,
    ) -> Result<(), ChainConfigError> {
        self.overdrive.set_lpf(cutoff_hz, damping)?;
        Ok(())
    }

    /// Set the overdrive pre-gain.
    pub fn set_overdrive_pre_gain(&mut self, pre_gain: f32) {
        self.overdrive.set_pre_gain(pre_gain);
    }
}
