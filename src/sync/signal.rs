//! Buffer-ready signal between interrupt and task context.

use core::sync::atomic::{AtomicBool, Ordering};

/// A binary, non-blocking-pollable ready signal.
///
/// The producer (transport completion ISR) calls [`raise()`](Self::raise)
/// once per completed buffer half; the consumer (processing task) calls
/// [`try_claim()`](Self::try_claim) from its poll loop. A claim only
/// succeeds after a raise, and each raise can be claimed at most once.
///
/// # Safety Contract
///
/// - Only ONE context may call `raise()` (the producer ISR).
/// - Only ONE context may call `try_claim()` (the consumer task).
pub struct ReadySignal {
    raised: AtomicBool,
}

impl ReadySignal {
    /// Create a new signal in the clear state.
    pub const fn new() -> Self {
        ReadySignal {
            raised: AtomicBool::new(false),
        }
    }

    /// Raise the signal (producer side).
    ///
    /// Returns `false` if the previous raise had not been claimed yet:
    /// the consumer has fallen behind and a buffer period was missed.
    pub fn raise(&self) -> bool {
        // Release ordering publishes the producer's buffer writes before
        // the consumer can observe the raised flag.
        !self.raised.swap(true, Ordering::Release)
    }

    /// Attempt to claim the signal (consumer side), non-blocking.
    ///
    /// Returns `true` exactly once per preceding [`raise()`](Self::raise).
    pub fn try_claim(&self) -> bool {
        self.raised.swap(false, Ordering::Acquire)
    }

    /// Whether the signal is currently raised (diagnostic only).
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear() {
        let s = ReadySignal::new();
        assert!(!s.is_raised());
        assert!(!s.try_claim());
    }

    #[test]
    fn raise_then_claim() {
        let s = ReadySignal::new();
        assert!(s.raise());
        assert!(s.is_raised());
        assert!(s.try_claim());
        assert!(!s.is_raised());
    }

    #[test]
    fn claim_consumes_exactly_one_raise() {
        let s = ReadySignal::new();
        s.raise();
        assert!(s.try_claim());
        // No second claim without a new raise
        assert!(!s.try_claim());
        s.raise();
        assert!(s.try_claim());
    }

    #[test]
    fn double_raise_reports_missed_buffer() {
        let s = ReadySignal::new();
        assert!(s.raise());
        assert!(!s.raise()); // consumer never claimed the first one
        // Only one claim is available regardless
        assert!(s.try_claim());
        assert!(!s.try_claim());
    }

    #[test]
    fn claims_never_exceed_raises() {
        let s = ReadySignal::new();
        let mut raises = 0u32;
        let mut claims = 0u32;
        // Arbitrary interleaving of production and consumption
        for step in 0..1000u32 {
            if step % 3 != 2 {
                s.raise();
                raises += 1;
            }
            if step % 2 == 0 && s.try_claim() {
                claims += 1;
            }
        }
        while s.try_claim() {
            claims += 1;
        }
        assert!(claims <= raises);
    }
}
