//! Parallel combinator.
//!
//! Runs a batch of independent chains on the rayon pool and merges them into
//! a single chain whose value is the ordered vector of results.

mod builder;
mod cancel;
mod combinator;
mod config;

pub use builder::ParallelBuilder;
pub use cancel::CancellationToken;
pub use combinator::{parallel, parallel_with};
pub use config::ParallelConfig;
