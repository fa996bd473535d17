//! The two ends of a queue.
//!
//! Every queue in this crate can be split into exactly one [`Producer`] and
//! one [`Consumer`]. Splitting borrows the queue mutably, so no other handle
//! can exist while the pair is alive, and the handles themselves can be sent
//! to another thread but not shared between threads.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

/// A bounded single-producer single-consumer ring.
///
/// The push and pop operations are `unsafe`: at any given time at most one
/// thread may push and at most one thread may pop. Use the safe handles
/// returned by the queue's `split` method to have the compiler enforce this.
pub trait Ring {
    /// The type of value stored in the ring.
    type Item;

    /// Attempts to push a value, handing it back if the ring is full.
    ///
    /// # Safety
    ///
    /// No other thread may be pushing to this ring concurrently.
    unsafe fn try_push(&self, value: Self::Item) -> Result<(), Self::Item>;

    /// Attempts to pop the oldest value, returning `None` if the ring is empty.
    ///
    /// # Safety
    ///
    /// No other thread may be popping from this ring concurrently.
    unsafe fn try_pop(&self) -> Option<Self::Item>;

    /// The number of slots in the ring.
    fn capacity(&self) -> usize;

    /// A snapshot of the number of values held by the ring.
    ///
    /// The result may be stale by the time it is returned if the other side
    /// is active.
    fn len(&self) -> usize;

    /// Whether the ring held no values when it was checked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every slot held a value when the ring was checked.
    fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }
}

// opts out of `Sync` while staying `Send`
type PhantomUnsync = PhantomData<Cell<()>>;

/// The write end of a queue.
pub struct Producer<'a, R: Ring> {
    ring: &'a R,
    _unsync: PhantomUnsync,
}

/// The read end of a queue.
pub struct Consumer<'a, R: Ring> {
    ring: &'a R,
    _unsync: PhantomUnsync,
}

/// Splits a ring into its two ends.
pub(crate) fn split<R: Ring>(ring: &mut R) -> (Producer<'_, R>, Consumer<'_, R>) {
    let ring = &*ring;

    let producer = Producer {
        ring,
        _unsync: PhantomData,
    };

    let consumer = Consumer {
        ring,
        _unsync: PhantomData,
    };

    (producer, consumer)
}

impl<'a, R: Ring> Producer<'a, R> {
    /// Attempts to push a value without blocking.
    ///
    /// # Errors
    ///
    /// Returns the value back if the queue is full. This is not a failure,
    /// the push can be retried once the consumer has made progress.
    #[inline]
    pub fn try_push(&self, value: R::Item) -> Result<(), R::Item> {
        // SAFETY: `split` hands out a single producer per exclusive
        // borrow of the ring, and the producer is not `Sync`
        unsafe { self.ring.try_push(value) }
    }

    /// The number of slots in the queue.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// A snapshot of the number of values held by the queue.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the queue held no values when it was checked.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Whether every slot held a value when the queue was checked.
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

impl<'a, R: Ring> Consumer<'a, R> {
    /// Attempts to pop the oldest value without blocking.
    #[inline]
    pub fn try_pop(&self) -> Option<R::Item> {
        // SAFETY: `split` hands out a single consumer per exclusive
        // borrow of the ring, and the consumer is not `Sync`
        unsafe { self.ring.try_pop() }
    }

    /// Attempts to pop the oldest value into `out`.
    ///
    /// Returns `false` if the queue is empty, in which case `out` is left
    /// untouched and still holds whatever it held before the call.
    #[inline]
    pub fn try_pop_into(&self, out: &mut R::Item) -> bool {
        match self.try_pop() {
            Some(value) => {
                *out = value;
                true
            }
            None => false,
        }
    }

    /// The number of slots in the queue.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// A snapshot of the number of values held by the queue.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the queue held no values when it was checked.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Whether every slot held a value when the queue was checked.
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

impl<'a, R: Ring> fmt::Debug for Producer<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

impl<'a, R: Ring> fmt::Debug for Consumer<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
