/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

#[cfg(not(loom))]
mod work;

/// The size of the queue to use
pub const SCALE_QUEUE_SIZE: usize = 64;

/// The number of messages per producer
pub const SCALE_MSG_COUNT: usize = 100_000;

/// The number of producers in a multiple producers, single consumer test
pub const SCALE_PRODUCERS: usize = 4;

/// The number of consumers in a single producer, multiple consumers test
pub const SCALE_CONSUMERS: usize = 4;
