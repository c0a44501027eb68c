/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Wait and retry strategies
//!
//! The queues never block. The `send` and `recv` helpers of the handles poll the queue
//! and call a `WaitStrategy` between attempts.

use crossbeam_utils::Backoff;

/// A wait strategy
///
/// A fresh strategy is created for each blocking call, so that stateful strategies restart from scratch.
pub trait WaitStrategy: Default {
    /// Wait a little bit
    fn wait(&self);
}

/// Delegates to crossbeam `Backoff` to busy-spin
#[derive(Debug, Default)]
pub struct SpinWaitStrategy {
    inner: Backoff,
}

impl WaitStrategy for SpinWaitStrategy {
    #[inline]
    fn wait(&self) {
        self.inner.spin();
    }
}

/// Delegates to crossbeam `Backoff` to spin, then yield the thread once spinning for long enough
#[derive(Debug, Default)]
pub struct SnoozeWaitStrategy {
    inner: Backoff,
}

impl WaitStrategy for SnoozeWaitStrategy {
    #[inline]
    fn wait(&self) {
        self.inner.snooze();
    }
}

/// Yield the thread to the OS
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct YieldWaitStrategy;

#[cfg(feature = "std")]
impl WaitStrategy for YieldWaitStrategy {
    fn wait(&self) {
        std::thread::yield_now();
    }
}

/// Sleep a bit each time
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct SleepWaitStrategy;

#[cfg(feature = "std")]
impl SleepWaitStrategy {
    /// The time slept on each wait
    pub const PERIOD: std::time::Duration = std::time::Duration::from_millis(1);
}

#[cfg(feature = "std")]
impl WaitStrategy for SleepWaitStrategy {
    fn wait(&self) {
        std::thread::sleep(Self::PERIOD);
    }
}
