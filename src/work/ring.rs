/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! The ring buffer for the work queue

use alloc::boxed::Box;
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use crossbeam_utils::CachePadded;

use crate::errors::{TryRecvError, TrySendError};
use crate::trace::trace;
use crate::utils::{Attachment, AtomicU8, AtomicUsize, Connections, Ordering, ring_size, slot_index};

/// Nothing in the slot, a producer may claim it
const SLOT_EMPTY: u8 = 0;
/// A producer owns the slot and is writing into it
const SLOT_WRITING: u8 = 1;
/// The slot holds an item for the consumer
const SLOT_READY: u8 = 2;

/// A slot in the work queue
#[derive(Debug)]
struct Slot<T> {
    /// One of `SLOT_EMPTY`, `SLOT_WRITING` or `SLOT_READY`
    state: AtomicU8,
    /// The item, initialized only when the state is `SLOT_READY`
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SLOT_EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// A bounded queue for many producers and a single consumer
///
/// Producers claim slots in turn by incrementing a shared cursor and publish them by marking them ready.
/// The consumer drains slots in order.
/// When the queue is full, new items are rejected and handed back to the producer.
#[derive(Debug)]
pub struct WorkQueue<T> {
    /// The slots themselves, a power of two of them
    slots: Box<[Slot<T>]>,
    /// The mask to get the slot of a sequence
    mask: usize,
    /// The maximum number of items in the queue
    capacity: usize,
    /// The number of admitted items, not yet consumed
    count: CachePadded<AtomicUsize>,
    /// The sequence of the next slot to be claimed by a producer
    head: CachePadded<AtomicUsize>,
    /// The sequence of the next slot to be read, only touched by the consumer
    tail: CachePadded<AtomicUsize>,
    /// The attachment of the consumer handle
    pub(crate) consumer: Attachment,
    /// The connected producer handles
    pub(crate) producers: Connections,
}

/// SAFETY: A slot's content is only accessed by the producer that claimed it until it is marked ready,
/// then by the single consumer.
unsafe impl<T: Send> Sync for WorkQueue<T> {}

impl<T> Drop for WorkQueue<T> {
    fn drop(&mut self) {
        if core::mem::needs_drop::<T>() {
            for slot in self.slots.iter_mut() {
                if slot.state.load(Ordering::Acquire) == SLOT_READY {
                    unsafe {
                        slot.value.get_mut().assume_init_drop();
                    }
                }
            }
        }
    }
}

impl<T> WorkQueue<T> {
    /// Creates a new queue
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is 0
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let size = ring_size(capacity);
        Self {
            slots: (0..size).map(|_| Slot::new()).collect(),
            mask: size - 1,
            capacity,
            count: CachePadded::new(AtomicUsize::new(0)),
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            consumer: Attachment::new(),
            producers: Connections::new(),
        }
    }

    /// Gets the capacity of the queue
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Gets the number of items in the queue
    ///
    /// This is a snapshot that may be stale as soon as it is returned.
    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        // a producer losing the admission race briefly pushes the count over capacity
        self.count.load(Ordering::Relaxed).min(self.capacity())
    }

    /// Gets whether the queue is empty
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Gets whether the queue is full
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.size() == self.capacity()
    }

    /// Gets the number of connected producer handles
    #[must_use]
    #[inline]
    pub fn get_connected_producers(&self) -> usize {
        self.producers.count()
    }

    /// Gets whether a consumer handle is attached
    #[must_use]
    #[inline]
    pub fn has_consumer(&self) -> bool {
        self.consumer.is_attached()
    }

    /// Attempts to push an item onto the queue
    ///
    /// This can be called concurrently from any number of threads.
    ///
    /// # Errors
    ///
    /// Returns `TrySendError::Full` with the item when the queue is full
    pub fn enqueue(&self, item: T) -> Result<(), TrySendError<T>> {
        let admitted = self.count.fetch_add(1, Ordering::AcqRel);
        if admitted >= self.capacity() {
            // back off, the queue is full
            self.count.fetch_sub(1, Ordering::Release);
            trace!(capacity = self.capacity(), "work queue is full, item rejected");
            return Err(TrySendError::Full(item));
        }

        // the increment gives exclusive access to the slot until it is marked ready
        let head = self.head.fetch_add(1, Ordering::AcqRel);
        let slot = &self.slots[slot_index(head, self.mask)];
        let previous = slot.state.swap(SLOT_WRITING, Ordering::Acquire);
        debug_assert_eq!(previous, SLOT_EMPTY, "claimed a slot that was not consumed");
        unsafe {
            (*slot.value.get()).write(item);
        }
        slot.state.store(SLOT_READY, Ordering::Release);
        Ok(())
    }

    /// Attempts to pop the next item from the queue
    ///
    /// # Errors
    ///
    /// Returns `TryRecvError::Empty` when no item is ready.
    /// This is also the case when the producer owning the next slot is still writing into it.
    pub fn dequeue(&mut self) -> Result<T, TryRecvError> {
        // SAFETY: the exclusive borrow makes this the only consumer
        unsafe { self.dequeue_unchecked() }
    }

    /// Attempts to pop the next item from the queue through a shared reference
    ///
    /// # Safety
    ///
    /// The caller must be the only consumer of the queue.
    pub(crate) unsafe fn dequeue_unchecked(&self) -> Result<T, TryRecvError> {
        let tail = self.tail.load(Ordering::Relaxed);
        let slot = &self.slots[slot_index(tail, self.mask)];
        if slot.state.load(Ordering::Acquire) != SLOT_READY {
            return Err(TryRecvError::Empty);
        }
        let item = unsafe { (*slot.value.get()).assume_init_read() };
        slot.state.store(SLOT_EMPTY, Ordering::Release);
        self.tail.store(tail.wrapping_add(1), Ordering::Relaxed);
        let count = self.count.fetch_sub(1, Ordering::Release);
        debug_assert!(count > 0);
        Ok(item)
    }
}

#[cfg(test)]
mod tests_init {
    use super::WorkQueue;

    #[test]
    fn capacity_is_kept() {
        let queue = WorkQueue::<usize>::new(3);
        assert_eq!(queue.capacity(), 3);
        assert_eq!(queue.size(), 0);
        assert!(queue.is_empty());
        assert!(!queue.is_full());
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn panic_on_zero_capacity() {
        let _queue = WorkQueue::<usize>::new(0);
    }
}

#[cfg(test)]
mod tests_ops {
    use super::WorkQueue;
    use crate::errors::{TryRecvError, TrySendError};
    use crate::utils::Ordering;

    #[test]
    fn fill_reject_drain() {
        let mut queue = WorkQueue::new(4);
        assert_eq!(queue.enqueue('A'), Ok(()));
        assert_eq!(queue.enqueue('B'), Ok(()));
        assert_eq!(queue.enqueue('C'), Ok(()));
        assert_eq!(queue.enqueue('D'), Ok(()));
        assert_eq!(queue.size(), 4);
        assert!(queue.is_full());
        assert_eq!(queue.enqueue('E'), Err(TrySendError::Full('E')));
        assert_eq!(queue.size(), 4);

        assert_eq!(queue.dequeue(), Ok('A'));
        assert_eq!(queue.dequeue(), Ok('B'));
        assert_eq!(queue.dequeue(), Ok('C'));
        assert_eq!(queue.dequeue(), Ok('D'));
        assert_eq!(queue.dequeue(), Err(TryRecvError::Empty));
        assert_eq!(queue.size(), 0);
    }

    #[test]
    fn empty_reads_are_idempotent() {
        let mut queue = WorkQueue::<u32>::new(2);
        for _ in 0..10 {
            assert_eq!(queue.dequeue(), Err(TryRecvError::Empty));
            assert_eq!(queue.size(), 0);
        }
        assert_eq!(queue.enqueue(1), Ok(()));
        assert_eq!(queue.dequeue(), Ok(1));
    }

    #[test]
    fn wraps_around_many_laps() {
        let mut queue = WorkQueue::new(3);
        let mut expected = 0;
        for i in 0..100 {
            assert_eq!(queue.enqueue(i), Ok(()));
            if i % 2 == 1 {
                assert_eq!(queue.dequeue(), Ok(expected));
                assert_eq!(queue.dequeue(), Ok(expected + 1));
                expected += 2;
            }
        }
        assert_eq!(queue.dequeue(), Err(TryRecvError::Empty));
    }

    #[test]
    fn capacity_one() {
        let mut queue = WorkQueue::new(1);
        assert_eq!(queue.enqueue(1), Ok(()));
        assert_eq!(queue.enqueue(2), Err(TrySendError::Full(2)));
        assert_eq!(queue.dequeue(), Ok(1));
        assert_eq!(queue.enqueue(3), Ok(()));
        assert_eq!(queue.dequeue(), Ok(3));
    }

    #[test]
    fn unready_slot_reads_as_empty() {
        let mut queue = WorkQueue::new(2);
        // a producer that claimed slot 0 but has not finished writing it
        queue.count.fetch_add(1, Ordering::Relaxed);
        queue.head.fetch_add(1, Ordering::Relaxed);
        assert_eq!(queue.enqueue(7), Ok(()));
        assert_eq!(queue.dequeue(), Err(TryRecvError::Empty));
        assert_eq!(queue.size(), 2);
    }

    #[test]
    fn capacity_is_exact_when_not_a_power_of_two() {
        let mut queue = WorkQueue::new(3);
        assert_eq!(queue.enqueue(1), Ok(()));
        assert_eq!(queue.enqueue(2), Ok(()));
        assert_eq!(queue.enqueue(3), Ok(()));
        assert!(queue.is_full());
        assert_eq!(queue.enqueue(4), Err(TrySendError::Full(4)));
        assert_eq!(queue.dequeue(), Ok(1));
        assert_eq!(queue.enqueue(4), Ok(()));
        assert_eq!(queue.enqueue(5), Err(TrySendError::Full(5)));
    }

    #[test]
    fn cursors_overflow_without_losing_items() {
        let mut queue = WorkQueue::new(3);
        queue.head.store(usize::MAX - 1, Ordering::Relaxed);
        queue.tail.store(usize::MAX - 1, Ordering::Relaxed);
        for i in 0..3 {
            assert_eq!(queue.enqueue(i), Ok(()));
        }
        assert_eq!(queue.head.load(Ordering::Relaxed), 1);
        assert_eq!(queue.dequeue(), Ok(0));
        assert_eq!(queue.enqueue(3), Ok(()));
        for expected in 1..4 {
            assert_eq!(queue.dequeue(), Ok(expected));
        }
        assert_eq!(queue.dequeue(), Err(TryRecvError::Empty));
        assert_eq!(queue.size(), 0);
    }
}
