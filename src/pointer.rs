//! A queue that carries raw pointers of any type.
//!
//! Pointers are erased to an address on push and cast back to whatever
//! pointer type the consumer asks for on pop. Nothing records what type was
//! pushed: popping a pointer as a different type than it was pushed with is
//! allowed, and dereferencing the result is then the caller's problem.
//!
//! ```
//! use lfq::pointer::PointerQueue;
//!
//! let mut queue: PointerQueue = PointerQueue::new(8).unwrap();
//! let (producer, consumer) = queue.split();
//!
//! let number = 7_i32;
//! let ratio = 0.5_f64;
//!
//! producer.try_push(&number as *const i32).unwrap();
//! producer.try_push(&ratio as *const f64).unwrap();
//!
//! assert_eq!(consumer.try_pop::<*const i32>(), Some(&number as *const i32));
//! assert_eq!(consumer.try_pop::<*const f64>(), Some(&ratio as *const f64));
//! ```

use crate::cached::Queue;
use crate::error::CapacityError;
use crate::handle::{Consumer, Producer};
use crate::index::Index;

use std::fmt;

/// An erased pointer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Address(*mut ());

// the address is never dereferenced by the queue
unsafe impl Send for Address {}

mod sealed {
    pub trait Sealed {}

    impl<T> Sealed for *const T {}
    impl<T> Sealed for *mut T {}
}

/// A thin raw pointer that can pass through a [`PointerQueue`].
pub trait Pointer: Copy + sealed::Sealed {
    #[doc(hidden)]
    fn erase(self) -> Address;

    #[doc(hidden)]
    fn restore(address: Address) -> Self;
}

impl<T> Pointer for *const T {
    #[inline(always)]
    fn erase(self) -> Address {
        Address(self.cast_mut().cast())
    }

    #[inline(always)]
    fn restore(address: Address) -> Self {
        address.0.cast_const().cast()
    }
}

impl<T> Pointer for *mut T {
    #[inline(always)]
    fn erase(self) -> Address {
        Address(self.cast())
    }

    #[inline(always)]
    fn restore(address: Address) -> Self {
        address.0.cast()
    }
}

/// A bounded SPSC queue of pointers to heterogeneous types.
///
/// Backed by a [`cached::Queue`](crate::cached::Queue) of erased addresses,
/// so it has the same capacity rules and ordering guarantees.
pub struct PointerQueue<I: Index = u64> {
    queue: Queue<Address, I>,
}

impl<I: Index> PointerQueue<I> {
    /// Creates a queue holding at most `capacity` pointers.
    ///
    /// # Errors
    ///
    /// Fails if `capacity` is smaller than 2 or not a power of two.
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        Ok(PointerQueue {
            queue: Queue::new(capacity)?,
        })
    }

    /// Splits the queue into its producer and consumer ends.
    pub fn split(&mut self) -> (PointerProducer<'_, I>, PointerConsumer<'_, I>) {
        let (producer, consumer) = self.queue.split();
        (PointerProducer(producer), PointerConsumer(consumer))
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// The write end of a [`PointerQueue`].
pub struct PointerProducer<'a, I: Index>(Producer<'a, Queue<Address, I>>);

/// The read end of a [`PointerQueue`].
pub struct PointerConsumer<'a, I: Index>(Consumer<'a, Queue<Address, I>>);

impl<'a, I: Index> PointerProducer<'a, I> {
    /// Attempts to push a pointer without blocking.
    ///
    /// # Errors
    ///
    /// Returns the pointer back if the queue is full.
    #[inline]
    pub fn try_push<P: Pointer>(&self, pointer: P) -> Result<(), P> {
        self.0.try_push(pointer.erase()).map_err(P::restore)
    }
}

impl<'a, I: Index> PointerConsumer<'a, I> {
    /// Attempts to pop the oldest pointer as a `P`.
    #[inline]
    pub fn try_pop<P: Pointer>(&self) -> Option<P> {
        self.0.try_pop().map(P::restore)
    }

    /// Attempts to pop the oldest pointer into `out`.
    ///
    /// Returns `false` if the queue is empty, leaving `out` untouched.
    #[inline]
    pub fn try_pop_into<P: Pointer>(&self, out: &mut P) -> bool {
        match self.try_pop() {
            Some(pointer) => {
                *out = pointer;
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}

impl<I: Index> fmt::Debug for PointerQueue<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::ptr;

    #[test]
    fn heterogeneous_round_trip() {
        let mut queue: PointerQueue = PointerQueue::new(4).unwrap();
        let (producer, consumer) = queue.split();

        let mut int_value = 42_i32;
        let double_value = 2.5_f64;
        let text = String::from("pointer");

        producer.try_push(&mut int_value as *mut i32).unwrap();
        producer.try_push(&double_value as *const f64).unwrap();
        producer.try_push(&text as *const String).unwrap();

        let int_ptr = consumer.try_pop::<*mut i32>().unwrap();
        let double_ptr = consumer.try_pop::<*const f64>().unwrap();
        let text_ptr = consumer.try_pop::<*const String>().unwrap();

        assert!(ptr::eq(int_ptr, &int_value));
        assert!(ptr::eq(double_ptr, &double_value));
        assert!(ptr::eq(text_ptr, &text));

        unsafe {
            *int_ptr += 1;
            assert_eq!(*double_ptr, 2.5);
            assert_eq!(*text_ptr, "pointer");
        }
        assert_eq!(int_value, 43);
    }

    #[test]
    fn full_queue_returns_pointer() {
        let mut queue = PointerQueue::<i64>::new(2).unwrap();
        let (producer, consumer) = queue.split();

        let values = [1_u8, 2, 3];
        producer.try_push(&values[0] as *const u8).unwrap();
        producer.try_push(&values[1] as *const u8).unwrap();

        let rejected = &values[2] as *const u8;
        assert_eq!(producer.try_push(rejected), Err(rejected));

        assert_eq!(consumer.try_pop::<*const u8>(), Some(&values[0] as *const u8));
        assert_eq!(consumer.try_pop::<*const u8>(), Some(&values[1] as *const u8));
        assert_eq!(consumer.try_pop::<*const u8>(), None);
    }

    #[test]
    fn null_pointers_pass_through() {
        let mut queue: PointerQueue = PointerQueue::new(2).unwrap();
        let (producer, consumer) = queue.split();

        producer.try_push(ptr::null::<u32>()).unwrap();

        let mut out = ptr::NonNull::<u64>::dangling().as_ptr();
        assert!(consumer.try_pop_into(&mut out));
        assert!(out.is_null());

        let before = out;
        assert!(!consumer.try_pop_into(&mut out));
        assert_eq!(out, before);
    }

    #[test]
    fn validates_capacity() {
        assert_eq!(
            PointerQueue::<u64>::new(3).unwrap_err(),
            CapacityError::NotPowerOfTwo { capacity: 3 }
        );
        assert!(PointerQueue::<u64>::new(1024).is_ok());
    }
}
