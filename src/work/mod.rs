/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Work queue: bounded, many producers, a single consumer.
//! Items are handed over to the consumer (ownership is transferred) in the order producers claimed their slots.
//! When the queue is full, producers get their item back.

mod consumers;
mod producers;
mod ring;

pub use consumers::WorkConsumer;
pub use producers::WorkProducer;
pub use ring::WorkQueue;
