//! One-shot background computations and their bridge into chains.
//!
//! A [`Future`] runs its producer on a dedicated thread and stores the
//! result in a write-once cell. Any number of handles may wait on it, block
//! with a timeout, poll it, or await it from async code.
//!
//! [`Chain::from_future`](crate::Chain::from_future) lifts a future into a
//! chain so that it composes with ordinary binds.

mod bridge;
mod error;
#[allow(clippy::module_inception)]
mod future;

pub use error::FutureError;
pub use future::{Future, Resolved};
