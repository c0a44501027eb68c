/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! The ring buffer for the broadcast queue
//!
//! Each slot carries a stamp telling which write occupies it.
//! The stamp of the write of sequence `s` is `2 * (s + 1)` once published and `2 * (s + 1) - 1` while being written.
//! Readers copy the item out and check the stamp did not move during the copy, as with a sequence lock.

use alloc::boxed::Box;
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use crossbeam_utils::CachePadded;

use crate::errors::TryRecvError;
use crate::trace::warn;
use crate::utils::{Attachment, AtomicUsize, Ordering, fence, ring_size, slot_index};

/// Gets the stamp of a published write
#[inline]
fn published_stamp(sequence: usize) -> usize {
    sequence.wrapping_add(1).wrapping_mul(2)
}

/// Gets the stamp of a write in progress
#[inline]
fn writing_stamp(sequence: usize) -> usize {
    published_stamp(sequence).wrapping_sub(1)
}

/// A slot in the broadcast queue
#[derive(Debug)]
struct Slot<T> {
    /// The stamp of the write occupying the slot, 0 when never written
    stamp: AtomicUsize,
    /// The item
    value: UnsafeCell<MaybeUninit<T>>,
}

/// The position of a reader in a broadcast queue
///
/// Each reader owns its context, there is no shared state between readers.
/// A context can be copied to fork a reader at the same position.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReaderContext {
    /// The number of writes on the queue when the context was created
    init_index: usize,
    /// The number of items read, or skipped when overtaken, since the context was created
    num_reads: usize,
}

impl ReaderContext {
    /// Gets the number of writes on the queue when the context was created
    #[must_use]
    #[inline]
    pub fn init_index(&self) -> usize {
        self.init_index
    }

    /// Gets the number of items read (or skipped) through this context
    #[must_use]
    #[inline]
    pub fn num_reads(&self) -> usize {
        self.num_reads
    }

    /// Gets the sequence of the next item for this reader
    #[inline]
    fn next(&self) -> usize {
        self.init_index.wrapping_add(self.num_reads)
    }
}

/// A bounded queue for a single producer and many independent readers
///
/// All readers see all items, in order.
/// The producer never waits: when the queue is full, the oldest item is overwritten.
/// A reader that falls behind by more than the capacity is overtaken; it is told how many items it missed
/// and resumes from the most recent write.
///
/// Readers receive copies of the items.
#[derive(Debug)]
pub struct BroadcastQueue<T> {
    /// The slots themselves, a power of two of them
    slots: Box<[Slot<T>]>,
    /// The mask to get the slot of a sequence
    mask: usize,
    /// The number of most recent items readers can still get
    capacity: usize,
    /// The number of items ever written
    num_writes: CachePadded<AtomicUsize>,
    /// The attachment of the producer handle
    pub(crate) producer: Attachment,
}

/// SAFETY: A single producer writes into the slots, readers only copy items out and discard torn copies.
unsafe impl<T: Copy + Send> Sync for BroadcastQueue<T> {}

impl<T: Copy> BroadcastQueue<T> {
    /// Creates a new queue
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is 0
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let size = ring_size(capacity);
        Self {
            slots: (0..size)
                .map(|_| Slot {
                    stamp: AtomicUsize::new(0),
                    value: UnsafeCell::new(MaybeUninit::uninit()),
                })
                .collect(),
            mask: size - 1,
            capacity,
            num_writes: CachePadded::new(AtomicUsize::new(0)),
            producer: Attachment::new(),
        }
    }

    /// Gets the capacity of the queue
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Gets the number of items ever written
    #[must_use]
    #[inline]
    pub fn writes(&self) -> usize {
        self.num_writes.load(Ordering::Acquire)
    }

    /// Gets whether a producer handle is attached
    #[must_use]
    #[inline]
    pub fn has_producer(&self) -> bool {
        self.producer.is_attached()
    }

    /// Creates a context for a new reader.
    /// The reader will see the items written from now on.
    #[must_use]
    pub fn new_reader_context(&self) -> ReaderContext {
        ReaderContext {
            init_index: self.writes(),
            num_reads: 0,
        }
    }

    /// Gets the number of items that a reader can still read, at most the capacity
    #[must_use]
    pub fn pending(&self, context: &ReaderContext) -> usize {
        self.writes().wrapping_sub(context.next()).min(self.capacity())
    }

    /// Pushes an item, overwriting the oldest one when the queue is full
    pub fn enqueue(&mut self, item: T) {
        // SAFETY: the exclusive borrow makes this the only producer
        unsafe { self.enqueue_unchecked(item) }
    }

    /// Pushes an item through a shared reference
    ///
    /// # Safety
    ///
    /// The caller must be the only producer of the queue.
    pub(crate) unsafe fn enqueue_unchecked(&self, item: T) {
        let sequence = self.num_writes.load(Ordering::Relaxed);
        let slot = &self.slots[slot_index(sequence, self.mask)];
        slot.stamp.store(writing_stamp(sequence), Ordering::Relaxed);
        // the odd stamp must be visible before any byte of the new item
        fence(Ordering::Release);
        unsafe {
            slot.value.get().write_volatile(MaybeUninit::new(item));
        }
        slot.stamp.store(published_stamp(sequence), Ordering::Release);
        self.num_writes.store(sequence.wrapping_add(1), Ordering::Release);
    }

    /// Attempts to read the next item for a reader
    ///
    /// # Errors
    ///
    /// Returns `TryRecvError::Empty` when nothing was written since the last read.
    /// Returns `TryRecvError::Lagging` with the number of skipped items when the reader was overtaken by the producer.
    /// The context is then moved to the most recent write, so that the next read returns the next new item.
    pub fn dequeue(&self, context: &mut ReaderContext) -> Result<T, TryRecvError> {
        let num_writes = self.num_writes.load(Ordering::Acquire);
        let next = context.next();
        let pending = num_writes.wrapping_sub(next);
        if pending == 0 {
            return Err(TryRecvError::Empty);
        }
        if pending > self.capacity() {
            return Err(self.overtaken(context, num_writes));
        }
        if let Some(item) = self.read_slot(next) {
            context.num_reads = context.num_reads.wrapping_add(1);
            return Ok(item);
        }
        // the producer lapped the reader while reading
        let num_writes = self.num_writes.load(Ordering::Acquire);
        Err(self.overtaken(context, num_writes))
    }

    /// Moves a reader to the most recent write
    fn overtaken(&self, context: &mut ReaderContext, num_writes: usize) -> TryRecvError {
        let missed = num_writes.wrapping_sub(context.next());
        context.num_reads = num_writes.wrapping_sub(context.init_index);
        warn!(missed, capacity = self.capacity(), "broadcast reader overtaken, skipped to the most recent write");
        TryRecvError::Lagging(missed)
    }

    /// Copies the item of a sequence out of its slot, if it was not overwritten
    fn read_slot(&self, sequence: usize) -> Option<T> {
        let slot = &self.slots[slot_index(sequence, self.mask)];
        let expected = published_stamp(sequence);
        if slot.stamp.load(Ordering::Acquire) != expected {
            return None;
        }
        // the copy may be torn, it is only trusted after checking the stamp again
        let value = unsafe { slot.value.get().read_volatile() };
        fence(Ordering::Acquire);
        if slot.stamp.load(Ordering::Relaxed) != expected {
            return None;
        }
        // SAFETY: the stamp did not move, the slot held the published item during the whole copy
        Some(unsafe { value.assume_init() })
    }
}

#[cfg(test)]
mod tests_init {
    use super::{BroadcastQueue, published_stamp, writing_stamp};

    #[test]
    fn stamps() {
        assert_eq!(published_stamp(0), 2);
        assert_eq!(writing_stamp(0), 1);
        assert_eq!(published_stamp(5), 12);
        assert_eq!(writing_stamp(5), 11);
        assert_eq!(published_stamp(usize::MAX), 0);
    }

    #[test]
    fn capacity_is_kept() {
        let queue = BroadcastQueue::<u32>::new(5);
        assert_eq!(queue.capacity(), 5);
        assert_eq!(queue.writes(), 0);
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn panic_on_zero_capacity() {
        let _queue = BroadcastQueue::<u32>::new(0);
    }
}
