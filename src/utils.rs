/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Low-level utils for queues
//!
//! Atomics are taken from `loom` when building with `--cfg loom` so that the model checker can explore
//! the interleavings of the queue protocols.

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering, fence};

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering, fence};

use crate::errors::AlreadyAttached;

/// The handle is not attached yet
const HANDLE_FREE: u8 = 0;
/// The handle is attached
const HANDLE_ATTACHED: u8 = 1;
/// The handle was attached, then released
const HANDLE_RELEASED: u8 = 2;

/// Tracks the single handle allowed on one side of a queue
#[derive(Debug)]
pub(crate) struct Attachment {
    state: AtomicU8,
}

impl Attachment {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(HANDLE_FREE),
        }
    }

    /// Claims the attachment
    pub(crate) fn attach(&self) -> Result<(), AlreadyAttached> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current == HANDLE_ATTACHED {
                return Err(AlreadyAttached);
            }
            match self
                .state
                .compare_exchange_weak(current, HANDLE_ATTACHED, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    /// Releases the attachment, everything done by the handle before is visible to `is_released` observers
    pub(crate) fn release(&self) {
        self.state.store(HANDLE_RELEASED, Ordering::Release);
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.state.load(Ordering::Acquire) == HANDLE_ATTACHED
    }

    pub(crate) fn is_released(&self) -> bool {
        self.state.load(Ordering::Acquire) == HANDLE_RELEASED
    }
}

/// Tracks the handles on the side of a queue that allows many of them
#[derive(Debug)]
pub(crate) struct Connections {
    /// The number of connected handles
    count: AtomicUsize,
    /// Whether a handle was ever connected
    seen: AtomicBool,
}

impl Connections {
    pub(crate) fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            seen: AtomicBool::new(false),
        }
    }

    pub(crate) fn connect(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
        self.seen.store(true, Ordering::Release);
    }

    pub(crate) fn disconnect(&self) {
        let previous = self.count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0);
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Gets whether handles were connected and all of them are gone
    pub(crate) fn all_gone(&self) -> bool {
        // `seen` first so that a connection setting it is counted
        self.seen.load(Ordering::Acquire) && self.count.load(Ordering::Acquire) == 0
    }
}

/// Gets the ring index for a sequence
///
/// Sequences are free-running counters; masking keeps consecutive sequences on consecutive slots
/// when they wrap around.
#[inline]
pub(crate) fn slot_index(sequence: usize, mask: usize) -> usize {
    sequence & mask
}

/// Checks the capacity given to a queue constructor and gets the number of slots to allocate,
/// the next power of two
#[inline]
pub(crate) fn ring_size(capacity: usize) -> usize {
    assert!(capacity > 0, "capacity must be non-zero");
    capacity.next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::{Attachment, Connections, ring_size, slot_index};
    use crate::errors::AlreadyAttached;

    #[test]
    fn slot_index_wraps() {
        assert_eq!(slot_index(0, 3), 0);
        assert_eq!(slot_index(3, 3), 3);
        assert_eq!(slot_index(4, 3), 0);
        assert_eq!(slot_index(10, 0), 0);
    }

    #[test]
    fn slot_index_is_continuous_across_overflow() {
        let mask = ring_size(3) - 1;
        assert_eq!(slot_index(usize::MAX, mask), 3);
        assert_eq!(slot_index(usize::MAX.wrapping_add(1), mask), 0);
    }

    #[test]
    fn ring_size_rounds_up() {
        assert_eq!(ring_size(1), 1);
        assert_eq!(ring_size(3), 4);
        assert_eq!(ring_size(4), 4);
        assert_eq!(ring_size(5), 8);
    }

    #[test]
    fn attachment_is_exclusive() {
        let attachment = Attachment::new();
        assert!(!attachment.is_attached());
        assert!(!attachment.is_released());
        assert_eq!(attachment.attach(), Ok(()));
        assert_eq!(attachment.attach(), Err(AlreadyAttached));
        attachment.release();
        assert!(attachment.is_released());
        assert_eq!(attachment.attach(), Ok(()));
        assert!(attachment.is_attached());
    }

    #[test]
    fn connections_gone_only_after_seen() {
        let connections = Connections::new();
        assert!(!connections.all_gone());
        connections.connect();
        connections.connect();
        assert_eq!(connections.count(), 2);
        connections.disconnect();
        assert!(!connections.all_gone());
        connections.disconnect();
        assert!(connections.all_gone());
    }
}
