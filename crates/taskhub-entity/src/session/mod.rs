//! Session domain entities.

pub mod device;
pub mod model;
pub mod summary;

pub use device::DeviceInfo;
pub use model::{CreateUserSession, UserSession};
pub use summary::{DeviceTypeCount, LocationCount, SessionSecuritySummary};
