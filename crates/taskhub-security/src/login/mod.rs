//! Failed-login tracking, risk scoring, and derived account lockout.

pub mod risk;
pub mod tracker;

pub use risk::{RiskAssessment, RiskSignals};
pub use tracker::FailedLoginTracker;
