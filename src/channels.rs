/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Channels on top of the queues
//!
//! The constructors create a queue and the handles for both of its ends.
//! The `Sender` and `Receiver` traits abstract over the handles.

use alloc::sync::Arc;

use crate::broadcast::{BroadcastProducer, BroadcastQueue, BroadcastReceiver};
use crate::errors::{RecvError, SendError, TryRecvError, TrySendError};
use crate::wait::{SnoozeWaitStrategy, WaitStrategy};
use crate::work::{WorkConsumer, WorkProducer, WorkQueue};

/// Common traits for all kind of sender
pub trait Sender: Sized {
    type Item;

    /// Gets whether the other side is disconnected
    #[must_use]
    fn is_disconnected(&self) -> bool;

    /// Gets the capacity of the channel
    #[must_use]
    fn capacity(&self) -> usize;

    /// Gets the number of items in the channel
    #[must_use]
    fn len(&self) -> usize;

    /// Gets whether the channel is empty
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets whether the channel is full
    #[must_use]
    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Attempts to send a single item on to the channel
    ///
    /// # Errors
    ///
    /// Returns an error when the channel is full, or no receiver is connected
    fn try_send(&mut self, item: Self::Item) -> Result<(), TrySendError<Self::Item>>;

    /// Blocks while sending the next item
    ///
    /// # Errors
    ///
    /// Returns an error when no receiver is connected
    fn send(&mut self, item: Self::Item) -> Result<(), SendError<Self::Item>>;

    /// Disconnects this sender by dropping it
    fn disconnect(self) {}
}

/// Common trait for all kind of receiver
pub trait Receiver: Sized {
    type Item;

    /// Gets whether the other side is disconnected
    #[must_use]
    fn is_disconnected(&self) -> bool;

    /// Gets the capacity of the channel
    #[must_use]
    fn capacity(&self) -> usize;

    /// Gets the number of items waiting for this receiver
    #[must_use]
    fn len(&self) -> usize;

    /// Gets whether the channel is empty
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets whether the channel is full
    #[must_use]
    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Attempts to receive a single item from to the channel
    /// An item will be returned for as long as there are items in the channel, even if senders are not connected.
    ///
    /// # Errors
    ///
    /// Returns an error when the channel is empty, or no sender is connected
    fn try_recv(&mut self) -> Result<Self::Item, TryRecvError>;

    /// Blocks while waiting for the next item
    /// An item will be returned for as long as there are items in the channel, even if senders are not connected.
    ///
    /// # Errors
    ///
    /// Returns an error when no sender is connected
    fn recv(&mut self) -> Result<Self::Item, RecvError>;

    /// Disconnects this receiver by dropping it
    fn disconnect(self) {}
}

impl<T, WS: WaitStrategy> Sender for WorkProducer<T, WS> {
    type Item = T;

    #[inline]
    fn is_disconnected(&self) -> bool {
        WorkProducer::is_disconnected(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    #[inline]
    fn len(&self) -> usize {
        self.queue.size()
    }

    #[inline]
    fn try_send(&mut self, item: Self::Item) -> Result<(), TrySendError<Self::Item>> {
        WorkProducer::try_send(self, item)
    }

    #[inline]
    fn send(&mut self, item: Self::Item) -> Result<(), SendError<Self::Item>> {
        WorkProducer::send(self, item)
    }
}

/// A broadcast producer has no single occupancy: each receiver has its own number of pending items.
/// `len` is the number of most recent items retained for receivers, at most the capacity,
/// so `is_full` stays true once the producer wrote a full lap.
impl<T: Copy> Sender for BroadcastProducer<T> {
    type Item = T;

    /// Readers come and go, the producer is never disconnected
    #[inline]
    fn is_disconnected(&self) -> bool {
        false
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Gets the number of retained items, see [`BroadcastReceiver::pending`] for the items left to a receiver
    #[inline]
    fn len(&self) -> usize {
        self.queue.writes().min(self.queue.capacity())
    }

    #[inline]
    fn try_send(&mut self, item: Self::Item) -> Result<(), TrySendError<Self::Item>> {
        BroadcastProducer::try_send(self, item)
    }

    #[inline]
    fn send(&mut self, item: Self::Item) -> Result<(), SendError<Self::Item>> {
        BroadcastProducer::send(self, item)
    }
}

impl<T, WS: WaitStrategy> Receiver for WorkConsumer<T, WS> {
    type Item = T;

    #[inline]
    fn is_disconnected(&self) -> bool {
        WorkConsumer::is_disconnected(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    #[inline]
    fn len(&self) -> usize {
        self.queue.size()
    }

    #[inline]
    fn try_recv(&mut self) -> Result<Self::Item, TryRecvError> {
        WorkConsumer::try_recv(self)
    }

    #[inline]
    fn recv(&mut self) -> Result<Self::Item, RecvError> {
        WorkConsumer::recv(self)
    }
}

impl<T: Copy, WS: WaitStrategy> Receiver for BroadcastReceiver<T, WS> {
    type Item = T;

    #[inline]
    fn is_disconnected(&self) -> bool {
        BroadcastReceiver::is_disconnected(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    #[inline]
    fn len(&self) -> usize {
        self.pending()
    }

    #[inline]
    fn try_recv(&mut self) -> Result<Self::Item, TryRecvError> {
        BroadcastReceiver::try_recv(self)
    }

    #[inline]
    fn recv(&mut self) -> Result<Self::Item, RecvError> {
        BroadcastReceiver::recv(self)
    }
}

/// Creates a work channel: many producers (clone the sender), a single consumer
///
/// # Panics
///
/// Panics when `capacity` is 0
#[must_use]
pub fn work_channel<T>(capacity: usize) -> (WorkProducer<T>, WorkConsumer<T>) {
    work_channel_with_strategy::<T, SnoozeWaitStrategy>(capacity)
}

/// Creates a work channel whose handles wait with a specific strategy
///
/// # Panics
///
/// Panics when `capacity` is 0
#[must_use]
pub fn work_channel_with_strategy<T, WS: WaitStrategy>(capacity: usize) -> (WorkProducer<T, WS>, WorkConsumer<T, WS>) {
    let queue = Arc::new(WorkQueue::new(capacity));
    let consumer = match WorkConsumer::with_strategy(queue.clone()) {
        Ok(consumer) => consumer,
        Err(_) => unreachable!("the queue was just created"),
    };
    (WorkProducer::with_strategy(queue), consumer)
}

/// Creates a broadcast channel: a single producer, many receivers (clone the receiver or subscribe)
///
/// # Panics
///
/// Panics when `capacity` is 0
#[must_use]
pub fn broadcast_channel<T: Copy>(capacity: usize) -> (BroadcastProducer<T>, BroadcastReceiver<T>) {
    let queue = Arc::new(BroadcastQueue::new(capacity));
    let receiver = BroadcastReceiver::new(queue.clone());
    let producer = match BroadcastProducer::new(queue) {
        Ok(producer) => producer,
        Err(_) => unreachable!("the queue was just created"),
    };
    (producer, receiver)
}
