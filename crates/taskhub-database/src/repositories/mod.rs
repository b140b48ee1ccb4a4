//! Concrete PostgreSQL repository implementations.

pub mod login_attempt;
pub mod session;

pub use login_attempt::LoginAttemptRepository;
pub use session::SessionRepository;
