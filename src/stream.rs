//! Double-buffered sample exchange between the transport and the
//! processing task.
//!
//! The transport streams full-duplex audio through two fixed ping-pong
//! buffers (capture and playback) and fires two completion events per full
//! buffer cycle: one when the first half has been transferred, one when the
//! second half has. While the transport works on one half, the application
//! owns the other: the half not currently targeted by the transport is the
//! ONLY half the processing task may touch. That ownership rule is what the
//! [`StreamExchange`] protocol enforces; violating it corrupts the output
//! audio.
//!
//! ```text
//!            capture buffer                 playback buffer
//!         ┌─────────┬─────────┐          ┌─────────┬─────────┐
//! DMA ───►│ half A  │ half B  │          │ half A  │ half B  │───► DMA
//!         └────┬────┴────┬────┘          └────▲────┴────▲────┘
//!              │         │    processing      │         │
//!              └─────────┴───(ready half)─────┴─────────┘
//! ```
//!
//! The completion handlers do O(1) work (signal raise plus bookkeeping) and
//! never block, so they are safe to call from interrupt context. All heavier
//! work happens on the consumer side via [`StreamExchange::claim`].

use core::ops::Range;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::constants::{BUFFER_SAMPLES, HALF_BUFFER_SAMPLES};
use crate::sample::Sample;
use crate::sync::ReadySignal;

/// Which half of a ping-pong buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferHalf {
    First,
    Second,
}

impl BufferHalf {
    /// Index range of this half within an interleaved full buffer.
    pub fn sample_range(self) -> Range<usize> {
        match self {
            BufferHalf::First => 0..HALF_BUFFER_SAMPLES,
            BufferHalf::Second => HALF_BUFFER_SAMPLES..BUFFER_SAMPLES,
        }
    }
}

/// Most recent transition of the exchange, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExchangeState {
    /// Waiting for the transport to finish the first half.
    AwaitingHalf,
    /// First half transferred, not yet claimed.
    HalfReady,
    /// Waiting for the transport to finish the second half.
    AwaitingFull,
    /// Second half transferred, not yet claimed.
    FullReady,
}

/// The two hardware-facing sample buffers.
///
/// The transport reads and writes these via DMA; application code only
/// touches the half handed over by [`StreamExchange::claim`]. Sized for
/// interleaved stereo: `BUFFER_SAMPLES` = 2 halves × 192 frames × 2
/// channels.
pub struct StreamBuffers {
    capture: [Sample; BUFFER_SAMPLES],
    playback: [Sample; BUFFER_SAMPLES],
}

impl StreamBuffers {
    /// Create silent capture and playback buffers.
    pub const fn new() -> Self {
        StreamBuffers {
            capture: [0; BUFFER_SAMPLES],
            playback: [0; BUFFER_SAMPLES],
        }
    }

    /// The application-owned capture half and the matching playback half.
    pub fn ready_halves(&mut self, half: BufferHalf) -> (&[Sample], &mut [Sample]) {
        let range = half.sample_range();
        (&self.capture[range.clone()], &mut self.playback[range])
    }

    /// Transport-side access to one capture half (used by the board code
    /// when wiring DMA, and by tests standing in for the transport).
    pub fn capture_half_mut(&mut self, half: BufferHalf) -> &mut [Sample] {
        &mut self.capture[half.sample_range()]
    }

    /// Transport-side view of one playback half.
    pub fn playback_half(&self, half: BufferHalf) -> &[Sample] {
        &self.playback[half.sample_range()]
    }
}

impl Default for StreamBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// Half/full-buffer handoff protocol between the transport ISR and the
/// processing task.
///
/// Single producer (the completion ISR calling
/// [`half_complete`](Self::half_complete) /
/// [`full_complete`](Self::full_complete)), single consumer (the task
/// calling [`claim`](Self::claim)). Each completion event arms exactly one
/// claim of the matching half; a half can never be claimed twice before the
/// transport re-arms it.
pub struct StreamExchange {
    half_ready: ReadySignal,
    full_ready: ReadySignal,
    state: AtomicU8,
    overruns: AtomicU32,
}

const STATE_AWAITING_HALF: u8 = 0;
const STATE_HALF_READY: u8 = 1;
const STATE_AWAITING_FULL: u8 = 2;
const STATE_FULL_READY: u8 = 3;

impl StreamExchange {
    /// Create an exchange waiting for the first half-transfer event.
    pub const fn new() -> Self {
        StreamExchange {
            half_ready: ReadySignal::new(),
            full_ready: ReadySignal::new(),
            state: AtomicU8::new(STATE_AWAITING_HALF),
            overruns: AtomicU32::new(0),
        }
    }

    /// Transport half-transfer event: the first half of both buffers is now
    /// application-owned. ISR context; O(1), never blocks.
    pub fn half_complete(&self) {
        if !self.half_ready.raise() {
            self.record_overrun();
        }
        self.state.store(STATE_HALF_READY, Ordering::Release);
    }

    /// Transport full-transfer event: the second half of both buffers is
    /// now application-owned. ISR context; O(1), never blocks.
    pub fn full_complete(&self) {
        if !self.full_ready.raise() {
            self.record_overrun();
        }
        self.state.store(STATE_FULL_READY, Ordering::Release);
    }

    /// Non-blocking poll for an application-owned half, first half before
    /// second. Consuming the returned half transfers ownership to the
    /// caller until the corresponding completion event fires again.
    pub fn claim(&self) -> Option<BufferHalf> {
        if self.half_ready.try_claim() {
            self.state.store(STATE_AWAITING_FULL, Ordering::Release);
            return Some(BufferHalf::First);
        }
        if self.full_ready.try_claim() {
            self.state.store(STATE_AWAITING_HALF, Ordering::Release);
            return Some(BufferHalf::Second);
        }
        None
    }

    /// Number of completion events that found their previous signal still
    /// pending; each one is a missed real-time deadline.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Snapshot of the most recent transition (diagnostic only; the signal
    /// pair is the authoritative handoff state).
    pub fn state(&self) -> ExchangeState {
        match self.state.load(Ordering::Acquire) {
            STATE_HALF_READY => ExchangeState::HalfReady,
            STATE_AWAITING_FULL => ExchangeState::AwaitingFull,
            STATE_FULL_READY => ExchangeState::FullReady,
            _ => ExchangeState::AwaitingHalf,
        }
    }

    fn record_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "defmt")]
        defmt::warn!("stream overrun: half-buffer completed before previous claim");
    }
}

impl Default for StreamExchange {
    fn default() -> Self {
        Self::new()
    }
}
