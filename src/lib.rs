//! # mixfx
//!
//! A `no_std`, zero-allocation stereo effects pipeline for full-duplex
//! embedded audio streams. Audio flows through two fixed ping-pong DMA
//! buffers; the half-buffer handoff, the per-channel filter chains, and the
//! serial control vocabulary all live here, written in pure Rust with no
//! heap and no blocking in interrupt context.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Framing | [`constants`] / [`sample`] | Stream geometry, `i16` ↔ `f32` conversion |
//! | Sync | [`sync`] | ISR-safe ready signals and SPSC queue |
//! | Exchange | [`stream`] | Double-buffered capture/playback handoff |
//! | DSP | [`dsp`] | Peaking EQ biquad, overdrive, delay line |
//! | Chain | [`chain`] | Per-channel EQ → overdrive → volume pipeline |
//! | Task | [`processor`] | Non-blocking poll loop over both channels |
//! | Control | [`control`] | Serial command parsing and parameter conversions |
//!
//! ## Quick start
//!
//! ```ignore
//! use mixfx::control::{parse_line, CommandQueue};
//! use mixfx::processor::StreamProcessor;
//! use mixfx::stream::{StreamBuffers, StreamExchange};
//!
//! static EXCHANGE: StreamExchange = StreamExchange::new();
//! static COMMANDS: CommandQueue = CommandQueue::new();
//!
//! // Half/full-transfer ISRs:
//! //   EXCHANGE.half_complete();   EXCHANGE.full_complete();
//!
//! // Control task, per received line:
//! //   if let Some(cmd) = parse_line(&line) { let _ = COMMANDS.push(cmd); }
//!
//! // Processing task:
//! let mut buffers = StreamBuffers::new();
//! let mut processor = StreamProcessor::new(mixfx::constants::SAMPLE_RATE_HZ);
//! loop {
//!     if !processor.service(&COMMANDS, &EXCHANGE, &mut buffers) {
//!         // yield to lower-priority work
//!     }
//! }
//! ```
//!
//! ## Stream parameters
//!
//! - **Sample rate:** 48 kHz ([`constants::SAMPLE_RATE_HZ`])
//! - **Channels:** 2, interleaved ([`constants::CHANNEL_COUNT`])
//! - **Half buffer:** 192 frames ([`constants::HALF_BUFFER_FRAMES`])
//! - **Sample format:** `i16` (signed 16-bit)

#![no_std]

pub mod constants;
pub mod sample;
pub mod sync;
pub mod stream;
pub mod dsp;
pub mod chain;
pub mod processor;
pub mod control;
