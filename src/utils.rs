pub(crate) use crossbeam::utils::CachePadded;

use crate::error::CapacityError;

#[cfg(not(loom))]
pub(crate) mod sync {
    pub(crate) use std::sync::atomic;

    pub(crate) mod cell {
        /// `std::cell::UnsafeCell` behind loom's closure-based access API.
        pub(crate) struct UnsafeCell<T>(std::cell::UnsafeCell<T>);

        impl<T> UnsafeCell<T> {
            pub(crate) fn new(data: T) -> UnsafeCell<T> {
                UnsafeCell(std::cell::UnsafeCell::new(data))
            }

            #[inline(always)]
            pub(crate) fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
                f(self.0.get())
            }

            #[inline(always)]
            pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
                f(self.0.get())
            }
        }
    }
}

#[cfg(loom)]
pub(crate) mod sync {
    pub(crate) use loom::sync::atomic;

    pub(crate) mod cell {
        pub(crate) use loom::cell::UnsafeCell;
    }
}

/// Validates a ring capacity and returns the mask used to map a cursor
/// onto a slot.
pub(crate) fn mask_for(capacity: usize) -> Result<usize, CapacityError> {
    if capacity < 2 {
        return Err(CapacityError::TooSmall { capacity });
    }

    if !capacity.is_power_of_two() {
        return Err(CapacityError::NotPowerOfTwo { capacity });
    }

    Ok(capacity - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_capacities() {
        assert_eq!(mask_for(0), Err(CapacityError::TooSmall { capacity: 0 }));
        assert_eq!(mask_for(1), Err(CapacityError::TooSmall { capacity: 1 }));

        for capacity in [3, 6, 100, 1023] {
            assert_eq!(
                mask_for(capacity),
                Err(CapacityError::NotPowerOfTwo { capacity })
            );
        }
    }

    #[test]
    fn accepts_powers_of_two() {
        assert_eq!(mask_for(2), Ok(1));
        assert_eq!(mask_for(4), Ok(3));
        assert_eq!(mask_for(1024), Ok(1023));
    }
}
