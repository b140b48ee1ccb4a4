//! Scheduled maintenance for the TaskHub security engine.
//!
//! The security crate owns the cleanup operations; this crate owns the
//! timers that invoke them.

pub mod scheduler;

pub use scheduler::CronScheduler;
