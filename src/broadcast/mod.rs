/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Broadcast queue: bounded, a single producer, many readers.
//! All readers see all items, each one at its own pace, and get copies of them.
//! The producer never waits; readers falling behind by more than the capacity lose the oldest items and are told so.

mod consumers;
mod producers;
mod ring;

pub use consumers::BroadcastReceiver;
pub use producers::BroadcastProducer;
pub use ring::{BroadcastQueue, ReaderContext};

#[cfg(test)]
mod tests_send_sync {
    use alloc::sync::Arc;

    use super::{BroadcastProducer, BroadcastQueue, BroadcastReceiver};

    pub fn assert_send<T: Send>(_thing: &T) {}
    pub fn assert_sync<T: Sync>(_thing: &T) {}

    #[test]
    fn queue_is_send_sync() {
        let queue = BroadcastQueue::<usize>::new(4);
        assert_send(&queue);
        assert_sync(&queue);
    }

    #[test]
    fn handles_are_send() {
        let queue = Arc::new(BroadcastQueue::<usize>::new(4));
        let producer = BroadcastProducer::new(queue.clone()).unwrap();
        let receiver = BroadcastReceiver::new(queue);
        assert_send(&producer);
        assert_send(&receiver);
        assert_sync(&receiver);
    }
}
