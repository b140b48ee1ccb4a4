//! # taskhub-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for the TaskHub security engine.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
