//! Digital filter building blocks.
//!
//! All filters operate on normalized `f32` samples, carry their own state,
//! and do O(1) work per sample with no allocation. Coefficient updates are
//! separate from the per-sample path and never reset filter history.

pub mod biquad;
pub mod overdrive;
pub mod ring;

pub use biquad::{FilterConfigError, PeakingFilter};
pub use overdrive::Overdrive;
pub use ring::DelayLine;
