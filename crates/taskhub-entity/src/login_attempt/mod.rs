//! Failed-login attempt domain entities.

pub mod lockout;
pub mod model;
pub mod risk;
pub mod summary;

pub use lockout::AccountLockoutStatus;
pub use model::{FailedLoginAttempt, RecordFailedLoginAttempt};
pub use risk::RiskFactor;
pub use summary::{FailedLoginSummary, IdentityCount, IpCount, SuspiciousIp};
