//! Pure building blocks shared by the chain engine.
//!
//! This module contains the side-effect free pieces:
//! - The immutable `StateLayer` snapshot and its `Counter` trait
//! - `Contract` predicates guarding chain values
//!
//! Nothing in here performs I/O or spawns work.

mod contract;
mod state;

pub use contract::Contract;
pub use state::{Counter, StateLayer};
