//! # taskhub-security
//!
//! The authentication-security engine for TaskHub: brute-force and
//! account-lockout detection over the failed-login log, and session
//! issuance, validation, and termination with a per-user concurrency cap.
//!
//! ## Modules
//!
//! - `geo` — geolocation provider implementations and the degrading resolver
//! - `login` — failed-login tracking, risk scoring, derived lockout status
//! - `session` — session lifecycle management and expired-session cleanup
//!
//! The authentication flow is expected to consult
//! [`login::FailedLoginTracker::is_account_locked`] *before* comparing
//! credentials, call [`login::FailedLoginTracker::log_attempt`] on every
//! failure, create a session through
//! [`session::SessionManager::create_session`] on success, and call
//! [`session::SessionManager::validate_session`] on every authenticated
//! request.

pub mod geo;
pub mod login;
pub mod session;

pub use geo::{GeoProviderDispatch, GeoResolver};
pub use login::FailedLoginTracker;
pub use session::{SessionCleanup, SessionManager};
