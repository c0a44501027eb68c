/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

use alloc::sync::Arc;
use alloc::vec::Vec;

use crossbeam_utils::Backoff;

use crate::errors::{RecvError, TryRecvError};
use crate::tests::{SCALE_MSG_COUNT, SCALE_PRODUCERS, SCALE_QUEUE_SIZE};
use crate::work::{WorkConsumer, WorkProducer, WorkQueue};

#[test]
fn work_spsc_keeps_order() {
    let queue = Arc::new(WorkQueue::new(SCALE_QUEUE_SIZE));
    let producer = WorkProducer::new(queue.clone());
    let mut consumer = WorkConsumer::new(queue).unwrap();

    let producer = std::thread::spawn(move || {
        for i in 0..SCALE_MSG_COUNT {
            producer.send(i).unwrap();
        }
    });

    let mut next = 0;
    loop {
        match consumer.try_recv() {
            Ok(item) => {
                assert_eq!(item, next);
                next += 1;
            }
            Err(TryRecvError::Empty) => {
                let backoff = Backoff::new();
                backoff.snooze();
            }
            Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Lagging(_)) => panic!("work consumer should not lag"),
        }
    }
    producer.join().unwrap();
    assert_eq!(next, SCALE_MSG_COUNT);
}

#[test]
fn work_mpsc_keeps_order_per_producer() {
    let queue = Arc::new(WorkQueue::new(SCALE_QUEUE_SIZE));
    let producer = WorkProducer::new(queue.clone());
    let mut consumer = WorkConsumer::new(queue.clone()).unwrap();

    let producers = (0..SCALE_PRODUCERS)
        .map(|p| {
            let producer = producer.clone();
            std::thread::spawn(move || {
                for i in 0..SCALE_MSG_COUNT {
                    while producer.try_send((p, i)).is_err() {
                        let backoff = Backoff::new();
                        backoff.spin();
                    }
                }
            })
        })
        .collect::<Vec<_>>();
    drop(producer);

    let mut next_per_producer = [0; SCALE_PRODUCERS];
    let mut max_size = 0;
    loop {
        max_size = max_size.max(queue.size());
        match consumer.recv() {
            Ok((p, i)) => {
                assert_eq!(i, next_per_producer[p], "producer {p} out of order");
                next_per_producer[p] += 1;
            }
            Err(RecvError::Disconnected) => break,
            Err(RecvError::Lagging(_)) => panic!("work consumer should not lag"),
        }
    }
    for producer in producers {
        producer.join().unwrap();
    }
    assert_eq!(next_per_producer, [SCALE_MSG_COUNT; SCALE_PRODUCERS]);
    assert!(max_size <= SCALE_QUEUE_SIZE);
    assert_eq!(queue.size(), 0);
}

#[test]
fn work_capacity_is_never_exceeded() {
    const CAPACITY: usize = 8;
    let queue = Arc::new(WorkQueue::new(CAPACITY));

    // producers race to fill the queue while nobody consumes
    let producers = (0..SCALE_PRODUCERS)
        .map(|p| {
            let queue = queue.clone();
            std::thread::spawn(move || (0..100).filter(|&i| queue.enqueue(p * 100 + i).is_ok()).count())
        })
        .collect::<Vec<_>>();
    let accepted: usize = producers.into_iter().map(|handle| handle.join().unwrap()).sum();
    assert_eq!(accepted, CAPACITY);
    assert_eq!(queue.size(), CAPACITY);

    let mut queue = Arc::into_inner(queue).unwrap();
    let mut drained = 0;
    while queue.dequeue().is_ok() {
        drained += 1;
    }
    assert_eq!(drained, CAPACITY);
    assert_eq!(queue.size(), 0);
}
