/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! The receivers for the broadcast queue

use alloc::sync::Arc;
use core::marker::PhantomData;

use super::ring::{BroadcastQueue, ReaderContext};
use crate::errors::{RecvError, TryRecvError};
use crate::wait::{SnoozeWaitStrategy, WaitStrategy};

/// A receiver of items from a broadcast queue
///
/// Each receiver owns its reader context and progresses at its own pace.
/// Cloning a receiver creates an independent one at the same position.
#[derive(Debug)]
pub struct BroadcastReceiver<T: Copy, WS: WaitStrategy = SnoozeWaitStrategy> {
    _strategy: PhantomData<fn() -> WS>,
    /// The position of this receiver
    context: ReaderContext,
    /// The queue itself
    pub(crate) queue: Arc<BroadcastQueue<T>>,
}

impl<T: Copy, WS: WaitStrategy> Clone for BroadcastReceiver<T, WS> {
    fn clone(&self) -> Self {
        Self {
            _strategy: PhantomData,
            context: self.context,
            queue: self.queue.clone(),
        }
    }
}

impl<T: Copy> BroadcastReceiver<T> {
    /// Creates a receiver that will see the items pushed from now on
    #[must_use]
    pub fn new(queue: Arc<BroadcastQueue<T>>) -> Self {
        Self::with_strategy(queue)
    }
}

impl<T: Copy, WS: WaitStrategy> BroadcastReceiver<T, WS> {
    /// Creates a receiver that will see the items pushed from now on, waiting with a specific strategy
    #[must_use]
    pub fn with_strategy(queue: Arc<BroadcastQueue<T>>) -> Self {
        let context = queue.new_reader_context();
        Self::from_context(queue, context)
    }

    /// Creates a receiver resuming from an existing context
    #[must_use]
    pub fn from_context(queue: Arc<BroadcastQueue<T>>, context: ReaderContext) -> Self {
        Self {
            _strategy: PhantomData,
            context,
            queue,
        }
    }

    /// Gets the queue itself
    #[must_use]
    #[inline]
    pub fn queue(&self) -> &Arc<BroadcastQueue<T>> {
        &self.queue
    }

    /// Gets the position of this receiver
    #[must_use]
    #[inline]
    pub fn context(&self) -> ReaderContext {
        self.context
    }

    /// Gets the number of items this receiver can still read, at most the capacity
    #[must_use]
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.pending(&self.context)
    }

    /// Gets whether the producer was dropped
    #[must_use]
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.queue.producer.is_released()
    }

    /// Attempts to receive the next item
    /// Pending items are returned even when the producer is gone.
    ///
    /// # Errors
    ///
    /// This returns a `TryRecvError` when nothing new was pushed, when this receiver was overtaken,
    /// or when nothing new was pushed and the producer is gone
    pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
        match self.queue.dequeue(&mut self.context) {
            Err(TryRecvError::Empty) if self.is_disconnected() => {
                // the producer may have pushed right before leaving
                match self.queue.dequeue(&mut self.context) {
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
    /// Returns an error when this receiver was overtaken, or when the producer is gone and nothing is pending
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
}
