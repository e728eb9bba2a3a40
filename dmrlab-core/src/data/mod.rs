//! Price data alignment for the two rotated assets

pub mod align;

pub use align::{AlignError, AlignedPair};
