/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! The producer for the broadcast queue

use alloc::sync::Arc;

use super::consumers::BroadcastReceiver;
use super::ring::BroadcastQueue;
use crate::errors::{AlreadyAttached, SendError, TrySendError};
use crate::trace::debug;

/// The single producer of a broadcast queue
///
/// Pushing never fails nor waits, the oldest items are overwritten when the queue is full.
#[derive(Debug)]
pub struct BroadcastProducer<T: Copy> {
    /// The queue itself
    pub(crate) queue: Arc<BroadcastQueue<T>>,
}

impl<T: Copy> Drop for BroadcastProducer<T> {
    fn drop(&mut self) {
        self.queue.producer.release();
        debug!(writes = self.queue.writes(), "broadcast producer detached");
    }
}

impl<T: Copy> BroadcastProducer<T> {
    /// Creates the producer for a queue
    ///
    /// # Errors
    ///
    /// Fails when another producer is attached to the queue
    pub fn new(queue: Arc<BroadcastQueue<T>>) -> Result<Self, AlreadyAttached> {
        queue.producer.attach()?;
        debug!(capacity = queue.capacity(), "broadcast producer attached");
        Ok(Self { queue })
    }

    /// Gets the queue itself
    #[must_use]
    #[inline]
    pub fn queue(&self) -> &Arc<BroadcastQueue<T>> {
        &self.queue
    }

    /// Gets the capacity of the queue
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Pushes an item, overwriting the oldest one when the queue is full
    pub fn enqueue(&mut self, item: T) {
        // SAFETY: the attachment guarantees this is the only producer
        unsafe { self.queue.enqueue_unchecked(item) }
    }

    /// Pushes all the items of an iterator, in order
    pub fn enqueue_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.enqueue(item);
        }
    }

    /// Pushes an item, as a channel sender
    ///
    /// # Errors
    ///
    /// Never fails, the oldest item is overwritten when the queue is full
    pub fn try_send(&mut self, item: T) -> Result<(), TrySendError<T>> {
        self.enqueue(item);
        Ok(())
    }

    /// Pushes an item, as a channel sender
    ///
    /// # Errors
    ///
    /// Never fails, pushing never waits for readers
    pub fn send(&mut self, item: T) -> Result<(), SendError<T>> {
        self.enqueue(item);
        Ok(())
    }

    /// Creates a receiver that will see the items pushed from now on
    #[must_use]
    pub fn subscribe(&self) -> BroadcastReceiver<T> {
        BroadcastReceiver::new(self.queue.clone())
    }
}
