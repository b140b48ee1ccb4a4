//! Trait definitions consumed across crate boundaries.

pub mod geo;

pub use geo::GeoProvider;
