//! Geolocation and IP risk-signal provider trait.

use async_trait::async_trait;
use std::net::IpAddr;
use uuid::Uuid;

use crate::error::AppError;
use crate::types::geo::GeoLocation;

/// External geolocation and IP reputation provider.
///
/// Implementations resolve an IP address to a location and report
/// qualitative risk signals (suspicious location, VPN/proxy). Callers must
/// treat provider failure as "unknown/false" rather than letting it block
/// the security flow; the `GeoResolver` wrapper in `taskhub-security`
/// applies that degradation policy.
#[async_trait]
pub trait GeoProvider: Send + Sync + std::fmt::Debug {
    /// Resolve the location of an IP address, if known.
    async fn locate(&self, ip: IpAddr) -> Result<Option<GeoLocation>, AppError>;

    /// Whether the provider considers this IP's location suspicious,
    /// optionally in the context of a specific user's history.
    async fn is_location_suspicious(
        &self,
        ip: IpAddr,
        user_id: Option<Uuid>,
    ) -> Result<bool, AppError>;

    /// Whether the IP is a known VPN exit or proxy.
    async fn is_vpn_or_proxy(&self, ip: IpAddr) -> Result<bool, AppError>;
}
