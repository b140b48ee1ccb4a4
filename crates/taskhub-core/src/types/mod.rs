//! Shared value types used across TaskHub crates.

pub mod geo;
pub mod window;

pub use geo::GeoLocation;
pub use window::{SlidingWindow, WindowEvaluation};
