/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! The consumer for the work queue

use alloc::sync::Arc;
use core::marker::PhantomData;

use super::ring::WorkQueue;
use crate::errors::{AlreadyAttached, RecvError, TryRecvError};
use crate::trace::debug;
use crate::wait::{SnoozeWaitStrategy, WaitStrategy};

/// The single consumer of a work queue
///
/// Only one consumer can be attached to a queue at any time.
/// Dropping it frees the queue for another consumer.
#[derive(Debug)]
pub struct WorkConsumer<T, WS: WaitStrategy = SnoozeWaitStrategy> {
    _strategy: PhantomData<fn() -> WS>,
    /// The queue itself
    pub(crate) queue: Arc<WorkQueue<T>>,
}

impl<T, WS: WaitStrategy> Drop for WorkConsumer<T, WS> {
    fn drop(&mut self) {
        self.queue.consumer.release();
        debug!("work consumer detached");
    }
}

impl<T> WorkConsumer<T> {
    /// Creates the consumer for a queue
    ///
    /// # Errors
    ///
    /// Fails when another consumer is attached to the queue
    pub fn new(queue: Arc<WorkQueue<T>>) -> Result<Self, AlreadyAttached> {
        Self::with_strategy(queue)
    }
}

impl<T, WS: WaitStrategy> WorkConsumer<T, WS> {
    /// Creates the consumer for a queue, waiting with a specific strategy when the queue is empty
    ///
    /// # Errors
    ///
    /// Fails when another consumer is attached to the queue
    pub fn with_strategy(queue: Arc<WorkQueue<T>>) -> Result<Self, AlreadyAttached> {
        queue.consumer.attach()?;
        debug!(capacity = queue.capacity(), "work consumer attached");
        Ok(Self {
            _strategy: PhantomData,
            queue,
        })
    }

    /// Gets the queue itself
    #[must_use]
    #[inline]
    pub fn queue(&self) -> &Arc<WorkQueue<T>> {
        &self.queue
    }

    /// Gets whether all the producers were dropped
    #[must_use]
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.queue.producers.all_gone()
    }

    /// Attempts to receive a single item from the queue
    /// Items still in the queue are returned even when producers are gone.
    ///
    /// # Errors
    ///
    /// This returns a `TryRecvError` when the queue is empty, or when it is empty and there is no longer any producer
    pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
        // SAFETY: the attachment guarantees this is the only consumer
        match unsafe { self.queue.dequeue_unchecked() } {
            Err(TryRecvError::Empty) if self.is_disconnected() => {
                // the last producer may have published right before leaving
                match unsafe { self.queue.dequeue_unchecked() } {
                    Err(TryRecvError::Empty) => Err(TryRecvError::Disconnected),
                    result => result,
                }
            }
            result => result,
        }
    }

    /// Blocks while waiting for the next item
    ///
    /// # Errors
    ///
    /// Returns an error when the queue is empty and no producer is connected
    pub fn recv(&mut self) -> Result<T, RecvError> {
        let strategy = WS::default();
        loop {
            match self.try_recv() {
                Ok(item) => return Ok(item),
                Err(TryRecvError::Empty) => strategy.wait(),
                Err(TryRecvError::Lagging(count)) => return Err(RecvError::Lagging(count)),
                Err(TryRecvError::Disconnected) => return Err(RecvError::Disconnected),
            }
        }
    }

    /// Gets an iterator over the items that can be received without waiting
    pub fn try_iter(&mut self) -> impl Iterator<Item = T> + '_ {
        core::iter::from_fn(move || self.try_recv().ok())
    }
}
