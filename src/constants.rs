/// Audio sample rate in Hz (matches the I2S master clock configuration).
pub const SAMPLE_RATE_HZ: f32 = 48_000.0;

/// Number of interleaved audio channels (stereo).
pub const CHANNEL_COUNT: usize = 2;

/// Stereo frames per half-buffer, the unit of ownership transfer between
/// the transport ISR and the processing task (192 frames ≈ 4 ms at 48 kHz).
pub const HALF_BUFFER_FRAMES: usize = 192;

/// Interleaved samples per half-buffer.
pub const HALF_BUFFER_SAMPLES: usize = HALF_BUFFER_FRAMES * CHANNEL_COUNT;

/// Interleaved samples in a full ping-pong buffer (both halves).
pub const BUFFER_SAMPLES: usize = 2 * HALF_BUFFER_SAMPLES;

/// Maximum number of parametric EQ stages per channel.
pub const MAX_EQ_STAGES: usize = 3;
