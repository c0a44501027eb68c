/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Definition of errors for this crate

use core::fmt::{Debug, Display};

/// Error when trying to send an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The item could not be sent because the queue is full.
    Full(T),
    /// The item could not be sent because the consumer is gone.
    Disconnected(T),
}

impl<T> Display for TrySendError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full(_) => write!(f, "failed to send: the queue is full"),
            Self::Disconnected(_) => write!(f, "failed to send: the queue is disconnected"),
        }
    }
}

impl<T: Debug> core::error::Error for TrySendError<T> {}

impl<T> TrySendError<T> {
    /// Gets back the rejected item
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Disconnected(item) => item,
        }
    }

    /// Tests whether the cause of the error is the queue being full
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Tests whether the cause of the error is the queue being disconnected
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected(_))
    }
}

/// The item could not be sent because the queue is disconnected
///
/// The error contains the item so it can be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    /// Gets back the wrapped item
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Display for SendError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "failed to send: the queue is disconnected")
    }
}

impl<T: Debug> core::error::Error for SendError<T> {}

impl<T> From<TrySendError<T>> for SendError<T> {
    fn from(value: TrySendError<T>) -> Self {
        Self(value.into_inner())
    }
}

/// Error when trying to receive an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// Nothing new to receive
    Empty,
    /// The reader was overtaken by the writer and skipped this number of items.
    /// The reader is caught up again when this is returned.
    Lagging(usize),
    /// Nothing to receive and the other side is gone
    Disconnected,
}

impl Display for TryRecvError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "failed to receive: the queue is empty"),
            Self::Lagging(count) => write!(f, "failed to receive: lagging behind {count} items"),
            Self::Disconnected => write!(f, "failed to receive: the queue is disconnected"),
        }
    }
}

impl core::error::Error for TryRecvError {}

impl TryRecvError {
    /// Tests whether the cause of the error is the queue being empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Tests whether the reader lost items because it was overtaken
    #[must_use]
    pub fn is_lagging(&self) -> bool {
        matches!(self, Self::Lagging(_))
    }

    /// Tests whether the cause of the error is the queue being disconnected
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

/// Error when blocking while receiving an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The reader was overtaken by the writer and skipped this number of items
    Lagging(usize),
    /// Nothing to receive and the other side is gone
    Disconnected,
}

impl Display for RecvError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Lagging(count) => write!(f, "failed to receive: lagging behind {count} items"),
            Self::Disconnected => write!(f, "failed to receive: the queue is disconnected"),
        }
    }
}

impl core::error::Error for RecvError {}

/// The single-owner side of a queue (the work consumer or the broadcast producer) is already attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyAttached;

impl Display for AlreadyAttached {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "another handle is already attached to the queue")
    }
}

impl core::error::Error for AlreadyAttached {}
