//! ISR-safe synchronization primitives.
//!
//! Everything here is lock-free: interrupt context must never block, so the
//! handoff between the transport ISR and the processing task is built on
//! atomics only.
//!
//! - [`ReadySignal`]: binary pollable signal, raised by the ISR and claimed
//!   by the consumer task.
//! - [`SpscQueue`]: single-producer single-consumer ring buffer, used to
//!   carry parameter updates from the control task to the processing task.

pub mod signal;
pub mod spsc;

pub use signal::ReadySignal;
pub use spsc::SpscQueue;
