//! # taskhub-core
//!
//! Core crate for the TaskHub security engine. Contains configuration
//! schemas, the sliding-window risk primitive, the geolocation provider
//! trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TaskHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
