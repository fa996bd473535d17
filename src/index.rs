//! Cursor widths.
//!
//! A cursor counts every value a side has ever pushed or popped. Cursors are
//! never reset, so all arithmetic on them wraps: the distance between the
//! writer and the reader stays correct after either counter overflows, as
//! long as that distance never exceeds the queue capacity.

use crate::utils::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use std::fmt;

mod sealed {
    pub trait Sealed {}
}

/// An integer type that can be used as a queue cursor.
///
/// Implemented for `u64` (the default) and `i64`.
pub trait Index: Copy + Eq + fmt::Debug + Send + Sync + sealed::Sealed + 'static {
    #[doc(hidden)]
    type Atomic: Send + Sync;

    /// The starting value of every cursor.
    const ZERO: Self;

    #[doc(hidden)]
    fn atomic(self) -> Self::Atomic;

    #[doc(hidden)]
    fn load(atomic: &Self::Atomic, order: Ordering) -> Self;

    #[doc(hidden)]
    fn store(atomic: &Self::Atomic, value: Self, order: Ordering);

    /// The next cursor value, wrapping on overflow.
    fn successor(self) -> Self;

    /// The number of steps from `earlier` to `self`, wrapping on overflow.
    fn distance(self, earlier: Self) -> usize;

    /// The slot this cursor points to.
    fn slot(self, mask: usize) -> usize;
}

macro_rules! index {
    ($int:ty, $atomic:ty) => {
        impl sealed::Sealed for $int {}

        impl Index for $int {
            type Atomic = $atomic;

            const ZERO: Self = 0;

            #[inline(always)]
            fn atomic(self) -> $atomic {
                <$atomic>::new(self)
            }

            #[inline(always)]
            fn load(atomic: &$atomic, order: Ordering) -> Self {
                atomic.load(order)
            }

            #[inline(always)]
            fn store(atomic: &$atomic, value: Self, order: Ordering) {
                atomic.store(value, order)
            }

            #[inline(always)]
            fn successor(self) -> Self {
                self.wrapping_add(1)
            }

            #[inline(always)]
            fn distance(self, earlier: Self) -> usize {
                self.wrapping_sub(earlier) as usize
            }

            #[inline(always)]
            fn slot(self, mask: usize) -> usize {
                // the low bits survive the cast on every pointer width
                (self as usize) & mask
            }
        }
    };
}

index!(u64, AtomicU64);
index!(i64, AtomicI64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_wraps() {
        let cursor = u64::MAX;
        assert_eq!(cursor.successor(), 0);
        assert_eq!(2u64.distance(u64::MAX - 1), 4);
        assert_eq!(cursor.slot(7), 7);
        assert_eq!(cursor.successor().slot(7), 0);
    }

    #[test]
    fn signed_wraps() {
        let cursor = i64::MAX;
        assert_eq!(cursor.successor(), i64::MIN);
        assert_eq!(i64::MIN.wrapping_add(1).distance(i64::MAX - 2), 4);
        assert_eq!(cursor.slot(3), 3);
        assert_eq!(cursor.successor().slot(3), 0);
    }

    #[test]
    fn distance_is_zero_for_equal_cursors() {
        assert_eq!(42u64.distance(42), 0);
        assert_eq!((-7i64).distance(-7), 0);
    }
}
