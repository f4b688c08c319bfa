//! Lock-free single-producer single-consumer (SPSC) command ring.
//!
//! Carries parameter-update commands from the control-channel task to the
//! processing task without locks, so neither side can block the other.
//!
//! The indices are free-running push/pop counters rather than wrapped slot
//! positions: `head - tail` is the queue depth directly, all `N` slots are
//! usable, and full is `depth == N`. Slot selection is `counter % N`, which
//! stays correct across counter wraparound only when `N` divides the
//! counter range, so `N` must be a power of two.
//!
//! A full queue rejects the push and counts it in
//! [`dropped()`](SpscQueue::dropped); for a control channel that counter
//! is the diagnostic that commands are arriving faster than the processing
//! task drains them.
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`push()`](SpscQueue::push) (the producer).
//! - Only ONE context may call [`pop()`](SpscQueue::pop) (the consumer).
//! - These may run concurrently at different priorities.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// A lock-free SPSC queue with `N` usable slots. `N` must be a power of
/// two.
pub struct SpscQueue<T, const N: usize> {
    slots: [UnsafeCell<MaybeUninit<T>>; N],
    /// Total pushes, advanced only by the producer. Wraps freely.
    head: AtomicUsize,
    /// Total pops, advanced only by the consumer. Wraps freely.
    tail: AtomicUsize,
    /// Pushes rejected because the queue was full.
    dropped: AtomicU32,
}

// SAFETY: The SPSC contract guarantees each counter is advanced from
// exactly one context, and acquire/release ordering on the counters makes
// slot writes visible before the matching counter advance. T: Send because
// values cross the context boundary.
unsafe impl<T: Send, const N: usize> Sync for SpscQueue<T, N> {}
unsafe impl<T: Send, const N: usize> Send for SpscQueue<T, N> {}

impl<T, const N: usize> SpscQueue<T, N> {
    /// Create a new empty queue. `N` must be a nonzero power of two.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "slot count must be a power of two");

        SpscQueue {
            // SAFETY: an array of uninitialized MaybeUninit<T> is valid;
            // UnsafeCell is a transparent wrapper.
            slots: unsafe {
                MaybeUninit::<[UnsafeCell<MaybeUninit<T>>; N]>::uninit().assume_init()
            },
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a value (producer side). Returns `Err(val)` and counts a drop
    /// if the queue is full.
    pub fn push(&self, val: T) -> Result<(), T> {
        let head = self.head.load(Ordering::Relaxed);
        if head.wrapping_sub(self.tail.load(Ordering::Acquire)) == N {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(val);
        }

        // SAFETY: sole producer; depth < N means the consumer has already
        // vacated this slot.
        unsafe {
            (*self.slots[head % N].get()).write(val);
        }

        self.head.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Pop a value (consumer side). Returns `None` if the queue is empty.
    pub fn pop(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: sole consumer; nonzero depth means this slot holds a
        // value the producer has published.
        let val = unsafe { (*self.slots[tail % N].get()).assume_init_read() };

        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(val)
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Acquire) == self.head.load(Ordering::Acquire)
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.head
            .load(Ordering::Acquire)
            .wrapping_sub(self.tail.load(Ordering::Acquire))
    }

    /// Number of pushes rejected because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T, const N: usize> Drop for SpscQueue<T, N> {
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}
