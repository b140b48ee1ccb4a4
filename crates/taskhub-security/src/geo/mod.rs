//! Geolocation provider implementations and the degrading resolver.

pub mod http;
pub mod resolver;
pub mod static_lists;

pub use resolver::{GeoAssessment, GeoResolver};

use std::net::IpAddr;

use async_trait::async_trait;
use uuid::Uuid;

use taskhub_core::config::geo::{GeoConfig, GeoProviderKind};
use taskhub_core::error::AppError;
use taskhub_core::traits::geo::GeoProvider;
use taskhub_core::types::geo::GeoLocation;

use self::http::HttpGeoProvider;
use self::static_lists::StaticGeoProvider;

/// Dispatcher over the configured geolocation provider.
#[derive(Debug)]
pub enum GeoProviderDispatch {
    /// External HTTP lookup service.
    Http(HttpGeoProvider),
    /// Static in-process lists (development and tests).
    Static(StaticGeoProvider),
    /// No provider; every signal resolves to unknown/false.
    Disabled,
}

impl GeoProviderDispatch {
    /// Build the provider selected by configuration.
    pub fn from_config(config: &GeoConfig) -> Result<Self, AppError> {
        match config.provider {
            GeoProviderKind::Http => Ok(Self::Http(HttpGeoProvider::new(config)?)),
            GeoProviderKind::Static => Ok(Self::Static(StaticGeoProvider::new(config))),
            GeoProviderKind::Disabled => Ok(Self::Disabled),
        }
    }
}

#[async_trait]
impl GeoProvider for GeoProviderDispatch {
    async fn locate(&self, ip: IpAddr) -> Result<Option<GeoLocation>, AppError> {
        match self {
            Self::Http(p) => p.locate(ip).await,
            Self::Static(p) => p.locate(ip).await,
            Self::Disabled => Ok(None),
        }
    }

    async fn is_location_suspicious(
        &self,
        ip: IpAddr,
        user_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        match self {
            Self::Http(p) => p.is_location_suspicious(ip, user_id).await,
            Self::Static(p) => p.is_location_suspicious(ip, user_id).await,
            Self::Disabled => Ok(false),
        }
    }

    async fn is_vpn_or_proxy(&self, ip: IpAddr) -> Result<bool, AppError> {
        match self {
            Self::Http(p) => p.is_vpn_or_proxy(ip).await,
            Self::Static(p) => p.is_vpn_or_proxy(ip).await,
            Self::Disabled => Ok(false),
        }
    }
}
