//! Static list-backed geolocation provider for development and tests.

use std::collections::HashSet;
use std::net::IpAddr;

use async_trait::async_trait;
use uuid::Uuid;

use taskhub_core::config::geo::GeoConfig;
use taskhub_core::error::AppError;
use taskhub_core::traits::geo::GeoProvider;
use taskhub_core::types::geo::GeoLocation;

/// Provider that answers from configured IP lists and never resolves a
/// location.
#[derive(Debug, Clone)]
pub struct StaticGeoProvider {
    vpn_ips: HashSet<String>,
    suspicious_ips: HashSet<String>,
}

impl StaticGeoProvider {
    /// Build from the configured lists.
    pub fn new(config: &GeoConfig) -> Self {
        Self {
            vpn_ips: config.static_vpn_ips.iter().cloned().collect(),
            suspicious_ips: config.static_suspicious_ips.iter().cloned().collect(),
        }
    }
}

#[async_trait]
impl GeoProvider for StaticGeoProvider {
    async fn locate(&self, _ip: IpAddr) -> Result<Option<GeoLocation>, AppError> {
        Ok(None)
    }

    async fn is_location_suspicious(
        &self,
        ip: IpAddr,
        _user_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        Ok(self.suspicious_ips.contains(&ip.to_string()))
    }

    async fn is_vpn_or_proxy(&self, ip: IpAddr) -> Result<bool, AppError> {
        Ok(self.vpn_ips.contains(&ip.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeoConfig {
        GeoConfig {
            static_vpn_ips: vec!["198.51.100.7".to_string()],
            static_suspicious_ips: vec!["203.0.113.9".to_string()],
            ..GeoConfig::default()
        }
    }

    #[tokio::test]
    async fn test_listed_ips_are_flagged() {
        let provider = StaticGeoProvider::new(&config());
        let vpn: IpAddr = "198.51.100.7".parse().unwrap();
        let sus: IpAddr = "203.0.113.9".parse().unwrap();
        let clean: IpAddr = "192.0.2.1".parse().unwrap();

        assert!(provider.is_vpn_or_proxy(vpn).await.unwrap());
        assert!(!provider.is_vpn_or_proxy(clean).await.unwrap());
        assert!(provider.is_location_suspicious(sus, None).await.unwrap());
        assert!(!provider.is_location_suspicious(clean, None).await.unwrap());
        assert!(provider.locate(vpn).await.unwrap().is_none());
    }
}
