use thiserror::Error;

/// A queue was constructed with a capacity it cannot use.
///
/// Capacities must be a power of two and at least 2, so that a cursor can be
/// mapped onto a slot with a single mask.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    /// The capacity is 0 or 1.
    #[error("capacity {capacity} is too small, a queue needs at least 2 slots")]
    TooSmall { capacity: usize },
    /// The capacity is not a power of two.
    #[error("capacity {capacity} is not a power of two")]
    NotPowerOfTwo { capacity: usize },
}

impl CapacityError {
    /// The rejected capacity.
    pub fn capacity(&self) -> usize {
        match *self {
            CapacityError::TooSmall { capacity } | CapacityError::NotPowerOfTwo { capacity } => {
                capacity
            }
        }
    }
}
