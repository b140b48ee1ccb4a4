//! Degrading wrapper over the geolocation provider.
//!
//! Provider failure must never block attempt logging or session creation.
//! Every method here swallows provider errors into "unknown/false" after
//! logging a warning; the security flow proceeds on whatever signals were
//! available.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use taskhub_core::traits::geo::GeoProvider;
use taskhub_core::types::geo::GeoLocation;

/// Geolocation signals gathered for one IP, degraded where unavailable.
#[derive(Debug, Clone, Default)]
pub struct GeoAssessment {
    /// Resolved location, if the provider knew one.
    pub location: Option<GeoLocation>,
    /// Whether the provider flagged the location as suspicious.
    pub location_suspicious: bool,
    /// Whether the provider flagged the IP as a VPN exit or proxy.
    pub vpn_or_proxy: bool,
}

/// Resolver applying the degradation policy over any [`GeoProvider`].
#[derive(Clone)]
pub struct GeoResolver {
    provider: Arc<dyn GeoProvider>,
}

impl std::fmt::Debug for GeoResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoResolver").finish()
    }
}

impl GeoResolver {
    /// Wrap a provider.
    pub fn new(provider: Arc<dyn GeoProvider>) -> Self {
        Self { provider }
    }

    /// Gather every signal for an IP, degrading failures to unknown/false.
    pub async fn assess(&self, ip: IpAddr, user_id: Option<Uuid>) -> GeoAssessment {
        let location = match self.provider.locate(ip).await {
            Ok(location) => location,
            Err(e) => {
                warn!(ip = %ip, error = %e, "Geo lookup failed; treating location as unknown");
                None
            }
        };

        let location_suspicious = match self.provider.is_location_suspicious(ip, user_id).await {
            Ok(flag) => flag,
            Err(e) => {
                warn!(ip = %ip, error = %e, "Location check failed; treating as not suspicious");
                false
            }
        };

        let vpn_or_proxy = match self.provider.is_vpn_or_proxy(ip).await {
            Ok(flag) => flag,
            Err(e) => {
                warn!(ip = %ip, error = %e, "VPN check failed; treating as not VPN");
                false
            }
        };

        GeoAssessment {
            location,
            location_suspicious,
            vpn_or_proxy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use taskhub_core::error::AppError;

    /// Provider that fails every call.
    #[derive(Debug)]
    struct BrokenProvider;

    #[async_trait]
    impl GeoProvider for BrokenProvider {
        async fn locate(&self, _ip: IpAddr) -> Result<Option<GeoLocation>, AppError> {
            Err(AppError::external_service("provider down"))
        }

        async fn is_location_suspicious(
            &self,
            _ip: IpAddr,
            _user_id: Option<Uuid>,
        ) -> Result<bool, AppError> {
            Err(AppError::external_service("provider down"))
        }

        async fn is_vpn_or_proxy(&self, _ip: IpAddr) -> Result<bool, AppError> {
            Err(AppError::external_service("provider down"))
        }
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_unknown() {
        let resolver = GeoResolver::new(Arc::new(BrokenProvider));
        let assessment = resolver.assess("192.0.2.1".parse().unwrap(), None).await;
        assert!(assessment.location.is_none());
        assert!(!assessment.location_suspicious);
        assert!(!assessment.vpn_or_proxy);
    }
}
