//! HTTP geolocation provider client.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use taskhub_core::config::geo::GeoConfig;
use taskhub_core::error::AppError;
use taskhub_core::traits::geo::GeoProvider;
use taskhub_core::types::geo::GeoLocation;

/// Response shape of the lookup service's `/v1/ip/{ip}` endpoint.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    found: bool,
    country: Option<String>,
    city: Option<String>,
    country_code: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    suspicious: bool,
    #[serde(default)]
    vpn_or_proxy: bool,
}

/// Client for an external IP geolocation and reputation service.
///
/// Errors from this client are real errors; the degradation to
/// unknown/false happens in [`crate::geo::GeoResolver`], not here.
#[derive(Debug, Clone)]
pub struct HttpGeoProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeoProvider {
    /// Build a client from configuration.
    pub fn new(config: &GeoConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::external_service(format!("Failed to build geo client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup(&self, ip: IpAddr, user_id: Option<Uuid>) -> Result<LookupResponse, AppError> {
        let mut request = self.client.get(format!("{}/v1/ip/{ip}", self.base_url));
        if let Some(user_id) = user_id {
            request = request.query(&[("user_id", user_id.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Geo lookup failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::external_service(format!("Geo lookup failed: {e}")))?;

        response
            .json::<LookupResponse>()
            .await
            .map_err(|e| AppError::external_service(format!("Invalid geo response: {e}")))
    }
}

#[async_trait]
impl GeoProvider for HttpGeoProvider {
    async fn locate(&self, ip: IpAddr) -> Result<Option<GeoLocation>, AppError> {
        let resp = self.lookup(ip, None).await?;
        if !resp.found {
            return Ok(None);
        }
        match (
            resp.country,
            resp.city,
            resp.country_code,
            resp.latitude,
            resp.longitude,
        ) {
            (Some(country), Some(city), Some(country_code), Some(latitude), Some(longitude)) => {
                Ok(Some(GeoLocation {
                    country,
                    city,
                    country_code,
                    latitude,
                    longitude,
                }))
            }
            _ => Ok(None),
        }
    }

    async fn is_location_suspicious(
        &self,
        ip: IpAddr,
        user_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        Ok(self.lookup(ip, user_id).await?.suspicious)
    }

    async fn is_vpn_or_proxy(&self, ip: IpAddr) -> Result<bool, AppError> {
        Ok(self.lookup(ip, None).await?.vpn_or_proxy)
    }
}
