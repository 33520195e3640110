//! The composite chain engine.
//!
//! A [`Chain`] threads a value and a read-only dependency context through a
//! sequence of steps while it:
//! - composes the steps' state transitions into one pure transform
//! - concatenates their deferred effects in declaration order
//! - checks the value against its contract before every step
//! - keeps the first failure and short-circuits everything after it
//!
//! [`Chain::run`] applies the transform to an initial state and hands back an
//! [`Outcome`]. Effects are never performed by the engine.

#[allow(clippy::module_inception)]
mod chain;
mod error;
mod outcome;

pub use chain::Chain;
pub use error::{BoxError, ChainError};
pub use outcome::Outcome;
