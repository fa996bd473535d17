//! A bounded SPSC queue that reads the opposite cursor on every operation.
//!
//! This is the textbook ring: no per-side cache, one acquire load and, on
//! success, one release store per call. It behaves exactly like
//! [`cached::Queue`](crate::cached::Queue) but generates more cross-core
//! traffic when both sides are busy.

use crate::error::CapacityError;
use crate::handle::{self, Consumer, Producer, Ring};
use crate::index::Index;
use crate::trace;
use crate::utils::sync::atomic::Ordering;
use crate::utils::sync::cell::UnsafeCell;
use crate::utils::{self, CachePadded};

use std::mem::MaybeUninit;
use std::{fmt, iter, ptr};

/// A bounded single-producer single-consumer queue without cached availability.
pub struct Queue<T, I: Index = u64> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,
    writer: CachePadded<I::Atomic>,
    reader: CachePadded<I::Atomic>,
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
            trace::warn!(capacity, %err, "rejected blind queue capacity");
            err
        })?;

        trace::debug!(
            capacity,
            index = std::any::type_name::<I>(),
            "created blind queue"
        );

        Ok(Queue {
            slots: iter::repeat_with(|| UnsafeCell::new(MaybeUninit::uninit()))
                .take(capacity)
                .collect(),
            mask,
            writer: CachePadded::new(start.atomic()),
            reader: CachePadded::new(start.atomic()),
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
        let cursor = I::load(&self.writer, Ordering::Relaxed);

        if cursor.distance(I::load(&self.reader, Ordering::Acquire)) == self.capacity() {
            return Err(value);
        }

        self.slots
            .get_unchecked(cursor.slot(self.mask))
            .with_mut(|slot| slot.write(MaybeUninit::new(value)));

        I::store(&self.writer, cursor.successor(), Ordering::Release);
        Ok(())
    }

    /// Attempts to pop the oldest value, returning `None` if the queue is empty.
    ///
    /// # Safety
    ///
    /// No other thread may be popping from this queue concurrently.
    #[inline]
    pub unsafe fn try_pop(&self) -> Option<T> {
        let cursor = I::load(&self.reader, Ordering::Relaxed);

        if I::load(&self.writer, Ordering::Acquire) == cursor {
            return None;
        }

        let value = self
            .slots
            .get_unchecked(cursor.slot(self.mask))
            .with(|slot| slot.read().assume_init());

        I::store(&self.reader, cursor.successor(), Ordering::Release);
        Some(value)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// A snapshot of the number of values held by the queue.
    pub fn len(&self) -> usize {
        let reader = I::load(&self.reader, Ordering::Acquire);
        let writer = I::load(&self.writer, Ordering::Acquire);
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
        let mut cursor = I::load(&self.reader, Ordering::Relaxed);
        let writer = I::load(&self.writer, Ordering::Relaxed);

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
