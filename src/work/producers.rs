/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! The producers for the work queue

use alloc::sync::Arc;
use core::marker::PhantomData;

use super::ring::WorkQueue;
use crate::errors::{SendError, TrySendError};
use crate::trace::debug;
use crate::wait::{SnoozeWaitStrategy, WaitStrategy};

/// A producer for a work queue, any number of them can push concurrently
///
/// Cloning a producer connects a new one to the same queue.
#[derive(Debug)]
pub struct WorkProducer<T, WS: WaitStrategy = SnoozeWaitStrategy> {
    _strategy: PhantomData<fn() -> WS>,
    /// The queue itself
    pub(crate) queue: Arc<WorkQueue<T>>,
}

impl<T, WS: WaitStrategy> Clone for WorkProducer<T, WS> {
    fn clone(&self) -> Self {
        Self::with_strategy(self.queue.clone())
    }
}

impl<T, WS: WaitStrategy> Drop for WorkProducer<T, WS> {
    fn drop(&mut self) {
        self.queue.producers.disconnect();
        debug!(remaining = self.queue.get_connected_producers(), "work producer detached");
    }
}

impl<T> WorkProducer<T> {
    /// Creates a producer for a queue
    #[must_use]
    pub fn new(queue: Arc<WorkQueue<T>>) -> Self {
        Self::with_strategy(queue)
    }
}

impl<T, WS: WaitStrategy> WorkProducer<T, WS> {
    /// Creates a producer for a queue, waiting with a specific strategy when the queue is full
    #[must_use]
    pub fn with_strategy(queue: Arc<WorkQueue<T>>) -> Self {
        queue.producers.connect();
        debug!(connected = queue.get_connected_producers(), "work producer attached");
        Self {
            _strategy: PhantomData,
            queue,
        }
    }

    /// Gets the queue itself
    #[must_use]
    #[inline]
    pub fn queue(&self) -> &Arc<WorkQueue<T>> {
        &self.queue
    }

    /// Gets whether the consumer was dropped
    #[must_use]
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.queue.consumer.is_released()
    }

    /// Attempts to push a single item onto the queue
    ///
    /// # Errors
    ///
    /// This returns a `TrySendError` when the queue is full or the consumer was dropped
    pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        if self.is_disconnected() {
            return Err(TrySendError::Disconnected(item));
        }
        self.queue.enqueue(item)
    }

    /// Pushes a single item onto the queue, waiting for room with the strategy when the queue is full
    ///
    /// # Errors
    ///
    /// This returns the item when the consumer was dropped
    pub fn send(&self, item: T) -> Result<(), SendError<T>> {
        let strategy = WS::default();
        let mut item = item;
        loop {
            match self.try_send(item) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => {
                    item = back;
                    strategy.wait();
                }
                Err(TrySendError::Disconnected(back)) => return Err(SendError(back)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::WorkProducer;
    use crate::errors::{SendError, TrySendError};
    use crate::wait::SpinWaitStrategy;
    use crate::work::{WorkConsumer, WorkQueue};

    #[test]
    fn clones_are_counted() {
        let queue = Arc::new(WorkQueue::<usize>::new(4));
        let producer = WorkProducer::new(queue.clone());
        assert_eq!(queue.get_connected_producers(), 1);
        let other = producer.clone();
        assert_eq!(queue.get_connected_producers(), 2);
        drop(producer);
        assert_eq!(queue.get_connected_producers(), 1);
        drop(other);
        assert_eq!(queue.get_connected_producers(), 0);
    }

    #[test]
    fn try_send_until_full() {
        let queue = Arc::new(WorkQueue::new(2));
        let producer = WorkProducer::new(queue.clone());
        assert_eq!(producer.try_send(0), Ok(()));
        assert_eq!(producer.try_send(1), Ok(()));
        assert_eq!(producer.try_send(2), Err(TrySendError::Full(2)));
        assert_eq!(queue.size(), 2);
    }

    #[test]
    fn disconnected_after_consumer_dropped() {
        let queue = Arc::new(WorkQueue::new(2));
        let producer = WorkProducer::<_, SpinWaitStrategy>::with_strategy(queue.clone());
        assert!(!producer.is_disconnected());
        let consumer = WorkConsumer::new(queue).unwrap();
        assert_eq!(producer.try_send(0), Ok(()));
        drop(consumer);
        assert!(producer.is_disconnected());
        assert_eq!(producer.try_send(1), Err(TrySendError::Disconnected(1)));
        assert_eq!(producer.send(2), Err(SendError(2)));
    }

    #[test]
    fn send_waits_for_room() {
        let queue = Arc::new(WorkQueue::new(1));
        let producer = WorkProducer::new(queue.clone());
        let mut consumer = WorkConsumer::new(queue).unwrap();
        assert_eq!(producer.send(0), Ok(()));

        let handle = std::thread::spawn(move || producer.send(1));
        let mut received = alloc::vec::Vec::new();
        while received.len() < 2 {
            if let Ok(item) = consumer.try_recv() {
                received.push(item);
            }
        }
        assert_eq!(handle.join().unwrap(), Ok(()));
        assert_eq!(received, [0, 1]);
    }
}
