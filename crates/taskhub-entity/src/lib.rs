//! # taskhub-entity
//!
//! Domain entity models for the TaskHub security engine. Every struct in
//! this crate represents a database table row or a domain value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! database entities additionally derive `sqlx::FromRow`.

pub mod login_attempt;
pub mod session;
