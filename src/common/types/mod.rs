//! Shared value types

pub mod geometry;

pub use geometry::{Dimensions, Position};
