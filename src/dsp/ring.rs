//! Fixed-capacity sample delay line.

/// A ring buffer of the `N` most recent samples.
///
/// Backs FIR convolution: [`push()`](Self::push) overwrites the oldest
/// sample, and [`iter_recent()`](Self::iter_recent) walks the history
/// most-recent-first, matching tap coefficient order.
pub struct DelayLine<const N: usize> {
    samples: [f32; N],
    /// Index the next push writes to.
    head: usize,
}

impl<const N: usize> DelayLine<N> {
    /// Create a delay line filled with silence.
    pub const fn new() -> Self {
        assert!(N > 0);
        DelayLine {
            samples: [0.0; N],
            head: 0,
        }
    }

    /// Push a sample, discarding the oldest.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.samples[self.head] = sample;
        self.head = (self.head + 1) % N;
    }

    /// Iterate the stored samples, most recent first.
    pub fn iter_recent(&self) -> impl Iterator<Item = f32> + '_ {
        (1..=N).map(move |age| self.samples[(self.head + N - age) % N])
    }

    /// Clear the history back to silence.
    pub fn reset(&mut self) {
        self.samples = [0.0; N];
        self.head = 0;
    }
}

impl<const N: usize> Default for DelayLine<N> {
    fn default() -> Self {
        Self::new()
    }
}
