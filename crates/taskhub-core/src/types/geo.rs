//! Resolved geolocation value type.

use serde::{Deserialize, Serialize};

/// A geolocation resolved from an IP address by the external provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Country name.
    pub country: String,
    /// City name.
    pub city: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl GeoLocation {
    /// Human-readable "City, Country" label used in summaries.
    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}
