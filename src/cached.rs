//! A bounded SPSC queue that caches how much room each side has left.
//!
//! Each side keeps a private count of the slots it knows it may use: free
//! slots for the producer, filled slots for the consumer. The opposite
//! cursor is only read when that count runs out, so in the steady state most
//! operations touch no cache line written by the other thread.
//!
//! ```
//! let mut queue = lfq::cached::Queue::<String>::new(4).unwrap();
//! let (producer, consumer) = queue.split();
//!
//! producer.try_push("hello".to_string()).unwrap();
//! assert_eq!(consumer.try_pop().as_deref(), Some("hello"));
//! assert_eq!(consumer.try_pop(), None);
//! ```

use crate::error::CapacityError;
use crate::handle::{self, Consumer, Producer, Ring};
use crate::index::Index;
use crate::trace;
use crate::utils::sync::atomic::Ordering;
use crate::utils::sync::cell::UnsafeCell;
use crate::utils::{self, CachePadded};

use std::mem::MaybeUninit;
use std::{fmt, iter, ptr};

/// A bounded single-producer single-consumer queue with cached availability.
///
/// The cursor type `I` is `u64` by default. `Queue<T, i64>` runs the same
/// algorithm over signed cursors.
pub struct Queue<T, I: Index = u64> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,
    writer: CachePadded<Position<I>>,
    reader: CachePadded<Position<I>>,
}

/// One side's cursor, together with the side's private availability count.
struct Position<I: Index> {
    cursor: I::Atomic,
    // only ever touched by the owner of `cursor`
    avail: UnsafeCell<usize>,
}

unsafe impl<T: Send, I: Index> Send for Queue<T, I> {}
unsafe impl<T: Send, I: Index> Sync for Queue<T, I> {}

impl<T, I: Index> Queue<T, I> {
    /// Creates a queue holding at most `capacity` values.
    ///
    /// # Errors
    ///
    /// Fails if `capacity` is smaller than 2 or not a power of two.
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        Self::starting_at(capacity, I::ZERO)
    }

    pub(crate) fn starting_at(capacity: usize, start: I) -> Result<Self, CapacityError> {
        let mask = utils::mask_for(capacity).map_err(|err| {
            trace::warn!(capacity, %err, "rejected cached queue capacity");
            err
        })?;

        trace::debug!(
            capacity,
            index = std::any::type_name::<I>(),
            "created cached queue"
        );

        Ok(Queue {
            slots: iter::repeat_with(|| UnsafeCell::new(MaybeUninit::uninit()))
                .take(capacity)
                .collect(),
            mask,
            writer: CachePadded::new(Position {
                cursor: start.atomic(),
                avail: UnsafeCell::new(capacity),
            }),
            reader: CachePadded::new(Position {
                cursor: start.atomic(),
                avail: UnsafeCell::new(0),
            }),
        })
    }

    /// Splits the queue into its producer and consumer ends.
    pub fn split(&mut self) -> (Producer<'_, Self>, Consumer<'_, Self>) {
        handle::split(self)
    }

    /// Attempts to push a value, handing it back if the queue is full.
    ///
    /// # Safety
    ///
    /// No other thread may be pushing to this queue concurrently.
    #[inline]
    pub unsafe fn try_push(&self, value: T) -> Result<(), T> {
        // only this thread writes the cursor
        let cursor = I::load(&self.writer.cursor, Ordering::Relaxed);

        self.writer.avail.with_mut(|avail| {
            if *avail == 0 {
                let reader = I::load(&self.reader.cursor, Ordering::Acquire);
                *avail = self.capacity() - cursor.distance(reader);

                if *avail == 0 {
                    return Err(value);
                }
            }

            // the slot is either fresh or was moved out of by the consumer
            // before it published a reader cursor past it
            self.slots
                .get_unchecked(cursor.slot(self.mask))
                .with_mut(|slot| slot.write(MaybeUninit::new(value)));

            I::store(&self.writer.cursor, cursor.successor(), Ordering::Release);
            *avail -= 1;
            Ok(())
        })
    }

    /// Attempts to pop the oldest value, returning `None` if the queue is empty.
    ///
    /// # Safety
    ///
    /// No other thread may be popping from this queue concurrently.
    #[inline]
    pub unsafe fn try_pop(&self) -> Option<T> {
        let cursor = I::load(&self.reader.cursor, Ordering::Relaxed);

        self.reader.avail.with_mut(|avail| {
            if *avail == 0 {
                let writer = I::load(&self.writer.cursor, Ordering::Acquire);
                *avail = writer.distance(cursor);

                if *avail == 0 {
                    return None;
                }
            }

            let value = self
                .slots
                .get_unchecked(cursor.slot(self.mask))
                .with(|slot| slot.read().assume_init());

            I::store(&self.reader.cursor, cursor.successor(), Ordering::Release);
            *avail -= 1;
            Some(value)
        })
    }

    /// The number of slots in the queue.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// A snapshot of the number of values held by the queue.
    pub fn len(&self) -> usize {
        // the reader never passes the writer, so load it first
        let reader = I::load(&self.reader.cursor, Ordering::Acquire);
        let writer = I::load(&self.writer.cursor, Ordering::Acquire);
        writer.distance(reader).min(self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }
}

impl<T, I: Index> Ring for Queue<T, I> {
    type Item = T;

    #[inline]
    unsafe fn try_push(&self, value: T) -> Result<(), T> {
        Queue::try_push(self, value)
    }

    #[inline]
    unsafe fn try_pop(&self) -> Option<T> {
        Queue::try_pop(self)
    }

    fn capacity(&self) -> usize {
        Queue::capacity(self)
    }

    fn len(&self) -> usize {
        Queue::len(self)
    }
}

impl<T, I: Index> Drop for Queue<T, I> {
    fn drop(&mut self) {
        let mut cursor = I::load(&self.reader.cursor, Ordering::Relaxed);
        let writer = I::load(&self.writer.cursor, Ordering::Relaxed);

        if cursor != writer {
            trace::trace!(
                remaining = writer.distance(cursor),
                "dropping values left in cached queue"
            );
        }

        while cursor != writer {
            self.slots[cursor.slot(self.mask)]
                .with_mut(|slot| unsafe { ptr::drop_in_place((*slot).as_mut_ptr()) });
            cursor = cursor.successor();
        }
    }
}

impl<T, I: Index> fmt::Debug for Queue<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
