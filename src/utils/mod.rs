//! # Utilities Module
//!
//! Random number generation, dice expressions and grid search helpers.

pub mod dice;
pub mod pathfinding;
pub mod rng;

pub use dice::*;
pub use pathfinding::*;
pub use rng::*;
