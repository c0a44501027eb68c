/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! # Ringlet
//!
//! Bounded lock-free queues for handing data between threads, built on fixed-size ring buffers with atomic cursors.
//! No operation on the queues blocks nor allocates after construction.
//!
//! Two queues are provided:
//!
//! * [`work::WorkQueue`]: many producers, a single consumer.
//!   Items are moved to the consumer.
//!   When the queue is full, producers get their item back (back-pressure).
//! * [`broadcast::BroadcastQueue`]: a single producer, many readers.
//!   Each reader sees every item, at its own pace, through its own [`broadcast::ReaderContext`].
//!   When the queue is full, the producer overwrites the oldest item;
//!   a reader left behind by more than the capacity is told how many items it missed and resumes from the most recent write.
//!
//! The queues can be used directly, or through producer and consumer handles sharing the queue
//! that enforce the topology and report disconnections.
//!
//!
//! ## Example
//!
//! Many producers feeding a single consumer.
//! ```
//! use ringlet::channels::work_channel;
//! use ringlet::errors::RecvError;
//!
//! let (producer, mut consumer) = work_channel::<usize>(64);
//! let producer_threads = (0..4)
//!     .map(|p| {
//!         let producer = producer.clone();
//!         std::thread::spawn(move || {
//!             for i in 0..100 {
//!                 producer.send(p * 100 + i).unwrap();
//!             }
//!         })
//!     })
//!     .collect::<Vec<_>>();
//! drop(producer); // so that `RecvError::Disconnected` is raised once everything is received
//!
//! let mut received = Vec::new();
//! loop {
//!     match consumer.recv() {
//!         Ok(item) => received.push(item),
//!         Err(RecvError::Disconnected) => break,
//!         Err(RecvError::Lagging(_)) => unreachable!(),
//!     }
//! }
//! for handle in producer_threads {
//!     handle.join().unwrap();
//! }
//! assert_eq!(received.len(), 400);
//! ```
//!
//! A producer broadcasting to several readers.
//! ```
//! use ringlet::broadcast::BroadcastQueue;
//! use ringlet::errors::TryRecvError;
//!
//! let mut queue = BroadcastQueue::new(4);
//! let mut reader = queue.new_reader_context();
//! for i in 1..=9 {
//!     queue.enqueue(i);
//! }
//! // 9 writes for 4 slots, the reader was overtaken
//! assert_eq!(queue.dequeue(&mut reader), Err(TryRecvError::Lagging(9)));
//! assert_eq!(queue.dequeue(&mut reader), Err(TryRecvError::Empty));
//! queue.enqueue(10);
//! assert_eq!(queue.dequeue(&mut reader), Ok(10));
//! ```
//!
//!
//! ## Features
//!
//! * `std` (default): wait strategies that yield or sleep the thread.
//!   Without it, the crate is `no-std` (it still requires `alloc`).
//! * `tracing`: logs handle attachment, rejected items and overtaken readers through `tracing`,
//!   see [`trace::init_tracing`].
//!
//!
//! ## License
//!
//! Copyright 2024 Cénotélie Opérations SAS
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the “Software”), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
//!

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

extern crate alloc;

pub mod broadcast;
pub mod channels;
pub mod errors;
pub mod prelude;
pub mod trace;
mod utils;
pub mod wait;
pub mod work;

#[cfg(test)]
mod tests;
