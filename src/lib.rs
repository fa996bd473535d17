//! Bounded lock-free single-producer single-consumer queues.
//!
//! Every queue here moves values between exactly two threads through a fixed
//! ring of slots. The producer owns one cursor and the consumer owns the
//! other; a release store of a cursor publishes the slots behind it and an
//! acquire load on the other side observes them. No operation blocks,
//! allocates, or retries: a full push hands the value back and an empty pop
//! returns `None`, and what to do next is up to the caller.
//!
//! - [`cached::Queue`] keeps a private count of usable slots on each side and
//!   only reads the other side's cursor when that count runs out.
//! - [`blind::Queue`] reads the other side's cursor on every call.
//! - [`pointer::PointerQueue`] carries raw pointers of any type through one
//!   cached queue.
//!
//! Queues are split into a [`Producer`] and a [`Consumer`], which can be moved
//! to different threads:
//!
//! ```
//! let mut queue = lfq::cached::Queue::<u64>::new(64).unwrap();
//! let (producer, consumer) = queue.split();
//!
//! crossbeam::scope(|scope| {
//!     scope.spawn(move |_| {
//!         for i in 0..1000 {
//!             while producer.try_push(i).is_err() {
//!                 std::hint::spin_loop();
//!             }
//!         }
//!     });
//!
//!     let mut expected = 0;
//!     while expected < 1000 {
//!         if let Some(i) = consumer.try_pop() {
//!             assert_eq!(i, expected);
//!             expected += 1;
//!         }
//!     }
//! })
//! .unwrap();
//! ```

mod utils;

pub mod blind;
pub mod cached;
pub mod pointer;
pub mod trace;

mod error;
mod handle;
mod index;

pub use error::CapacityError;
pub use handle::{Consumer, Producer, Ring};
pub use index::Index;
