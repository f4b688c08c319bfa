//! Non-blocking stream processing task.
//!
//! [`StreamProcessor`] is the consumer side of the half-buffer handoff: it
//! polls the [`StreamExchange`] with zero timeout, drains a claimed capture
//! half through every channel's [`FilterChain`], and writes the result into
//! the matching playback half. When nothing is claimable the caller's loop
//! should yield cooperatively and retry. Polling instead of blocking keeps
//! the worst-case latency at one buffer period with no possibility of
//! priority inversion at the interrupt boundary.
//!
//! ```ignore
//! // Task loop in board code:
//! loop {
//!     if !processor.service(&COMMANDS, &EXCHANGE, &mut buffers) {
//!         yield_now();
//!     }
//! }
//! ```

use crate::chain::FilterChain;
use crate::constants::CHANNEL_COUNT;
use crate::control::{gain_db_to_linear, volume_percent_to_gain, CommandQueue, ControlCommand};
use crate::sample::Sample;
use crate::stream::{StreamBuffers, StreamExchange};

/// Per-channel filter chains plus the poll-driven processing step.
pub struct StreamProcessor {
    chains: [FilterChain; CHANNEL_COUNT],
}

impl StreamProcessor {
    /// Create a processor with transparent chains for every channel.
    pub fn new(sample_rate_hz: f32) -> Self {
        StreamProcessor {
            chains: [
                FilterChain::new(sample_rate_hz),
                FilterChain::new(sample_rate_hz),
            ],
        }
    }

    /// Borrow one channel's chain (e.g. to enable its overdrive stage).
    pub fn chain_mut(&mut self, channel: usize) -> Option<&mut FilterChain> {
        self.chains.get_mut(channel)
    }

    /// Apply one decoded control command.
    ///
    /// Unknown channels and invalid filter parameters are dropped whole;
    /// nothing is partially applied.
    pub fn apply(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::SetFilter {
                channel,
                stage,
                centre_hz,
                gain_db,
                q,
            } => {
                let Some(chain) = self.chains.get_mut(channel as usize) else {
                    return;
                };
                let boost_cut = gain_db_to_linear(gain_db);
                if chain
                    .set_eq_parameters(stage as usize, centre_hz, q, boost_cut)
                    .is_err()
                {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "rejected filter update: ch {} stage {}",
                        channel,
                        stage
                    );
                }
            }
            ControlCommand::SetVolume { channel, percent } => {
                if let Some(chain) = self.chains.get_mut(channel as usize) {
                    chain.set_volume(volume_percent_to_gain(percent));
                }
            }
        }
    }

    /// Drain every pending command from the control task.
    pub fn drain_commands(&mut self, commands: &CommandQueue) {
        while let Some(command) = commands.pop() {
            self.apply(command);
        }
    }

    /// Process one interleaved capture half into the matching playback
    /// half, sample by sample through each channel's chain.
    pub fn process_half(&mut self, capture: &[Sample], playback: &mut [Sample]) {
        debug_assert_eq!(capture.len(), playback.len());
        debug_assert_eq!(capture.len() % CHANNEL_COUNT, 0);

        for (frame_in, frame_out) in capture
            .chunks_exact(CHANNEL_COUNT)
            .zip(playback.chunks_exact_mut(CHANNEL_COUNT))
        {
            for (channel, chain) in self.chains.iter_mut().enumerate() {
                frame_out[channel] = chain.process(frame_in[channel]);
            }
        }
    }

    /// Non-blocking poll: claim a ready half if there is one and process
    /// it. Returns `true` if a half was processed, `false` if the caller
    /// should yield and retry.
    pub fn poll(&mut self, exchange: &StreamExchange, buffers: &mut StreamBuffers) -> bool {
        let Some(half) = exchange.claim() else {
            return false;
        };
        let (capture, playback) = buffers.ready_halves(half);
        self.process_half(capture, playback);
        true
    }

    /// One iteration of the task loop: apply pending parameter updates,
    /// then poll for stream work.
    pub fn service(
        &mut self,
        commands: &CommandQueue,
        exchange: &StreamExchange,
        buffers: &mut StreamBuffers,
    ) -> bool {
        self.drain_commands(commands);
        self.poll(exchange, buffers)
    }
}
