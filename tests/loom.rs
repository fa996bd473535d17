#![cfg(loom)]

use lfq::{blind, cached};
use loom::sync::Arc;
use loom::thread;

#[test]
fn loom_cached_spsc() {
    loom::model(|| {
        let queue = Arc::new(cached::Queue::<usize>::new(2).unwrap());
        let producer_queue = queue.clone();

        let producer = thread::spawn(move || {
            for i in 0..3 {
                // SAFETY: this is the only thread that pushes
                while unsafe { producer_queue.try_push(i) }.is_err() {
                    thread::yield_now();
                }
            }
        });

        let mut received = vec![];
        while received.len() < 3 {
            // SAFETY: this is the only thread that pops
            match unsafe { queue.try_pop() } {
                Some(i) => received.push(i),
                None => thread::yield_now(),
            }
        }

        producer.join().unwrap();
        assert_eq!(received, [0, 1, 2]);
    });
}

#[test]
fn loom_cached_signed_full() {
    loom::model(|| {
        let queue = Arc::new(cached::Queue::<usize, i64>::new(2).unwrap());
        let producer_queue = queue.clone();

        let producer = thread::spawn(move || {
            let mut pushed = 0;
            for i in 0..3 {
                if unsafe { producer_queue.try_push(i) }.is_ok() {
                    pushed += 1;
                }
            }
            pushed
        });

        let popped = unsafe { queue.try_pop() };
        let pushed = producer.join().unwrap();

        // at most one slot can have been freed while the producer ran
        assert!(pushed == 2 || (pushed == 3 && popped == Some(0)));

        if let Some(first) = popped {
            assert_eq!(first, 0);
        }
    });
}

#[test]
fn loom_cached_drops_leftovers() {
    loom::model(|| {
        let queue = Arc::new(cached::Queue::<String>::new(2).unwrap());
        let producer_queue = queue.clone();

        let producer = thread::spawn(move || {
            for i in 0..2 {
                unsafe { producer_queue.try_push(i.to_string()) }.unwrap();
            }
        });

        let popped = unsafe { queue.try_pop() };
        producer.join().unwrap();

        if let Some(first) = popped {
            assert_eq!(first, "0");
        }

        // the drain in `Drop` reads the slots the producer wrote
        drop(queue);
    });
}

#[test]
fn loom_blind_spsc() {
    loom::model(|| {
        let queue = Arc::new(blind::Queue::<String>::new(2).unwrap());
        let producer_queue = queue.clone();

        let producer = thread::spawn(move || {
            for i in 0..3 {
                while unsafe { producer_queue.try_push(i.to_string()) }.is_err() {
                    thread::yield_now();
                }
            }
        });

        let mut received = vec![];
        while received.len() < 3 {
            match unsafe { queue.try_pop() } {
                Some(value) => received.push(value),
                None => thread::yield_now(),
            }
        }

        producer.join().unwrap();
        assert_eq!(received, ["0", "1", "2"]);
    });
}
