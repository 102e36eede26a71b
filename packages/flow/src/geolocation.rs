//! Geolocation boundary.
//!
//! The report wizard fires one position request on entry. Any failure
//! (denied, unsupported, network) yields `None` and the report simply
//! goes without coordinates.

use std::time::Duration;

use serde::Deserialize;
use vigia_report_models::LocationData;

/// One-shot position lookup.
#[async_trait::async_trait]
pub trait Geolocator: Send + Sync {
    /// Current position, or `None` if it cannot be determined.
    async fn current_position(&self) -> Option<LocationData>;
}

/// Always answers with the same position (or always fails with `None`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedGeolocator(pub Option<LocationData>);

#[async_trait::async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Option<LocationData> {
        self.0
    }
}

const IP_API_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Coarse position from the public IP address.
pub struct IpGeolocator {
    client: reqwest::Client,
    url: String,
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IpGeolocator {
    /// Creates a locator with a short request timeout.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            client,
            url: IP_API_URL.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_location(self) -> Option<LocationData> {
        if self.status != "success" {
            log::warn!(
                "IP geolocation failed: {}",
                self.message.as_deref().unwrap_or("unknown error")
            );
            return None;
        }
        Some(LocationData::new(self.lat?, self.lon?))
    }
}

#[async_trait::async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Option<LocationData> {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Geo error: {e}");
                return None;
            }
        };

        match response.json::<IpApiResponse>().await {
            Ok(body) => body.into_location(),
            Err(e) => {
                log::warn!("Geo error: {e}");
                None
            }
        }
    }
}

/// Parses `"lat,lng"` in decimal degrees.
#[must_use]
pub fn parse_location(value: &str) -> Option<LocationData> {
    let (lat, lng) = value.split_once(',')?;
    let latitude: f64 = lat.trim().parse().ok()?;
    let longitude: f64 = lng.trim().parse().ok()?;

    ((-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude))
        .then(|| LocationData::new(latitude, longitude))
}

/// Picks the locator from `VIGIA_LOCATION`:
///
/// - `"lat,lng"`: that fixed position
/// - `off` / `none`: geolocation denied
/// - unset: IP-based lookup
#[must_use]
pub fn geolocator_from_env() -> Box<dyn Geolocator> {
    let Ok(value) = std::env::var("VIGIA_LOCATION") else {
        return Box::new(IpGeolocator::new());
    };

    if matches!(value.trim().to_lowercase().as_str(), "off" | "none" | "") {
        log::info!("Geolocation disabled via VIGIA_LOCATION");
        return Box::new(FixedGeolocator(None));
    }

    parse_location(&value).map_or_else(
        || {
            log::warn!("Invalid VIGIA_LOCATION '{value}', expected \"lat,lng\"; geolocation disabled");
            Box::new(FixedGeolocator(None)) as Box<dyn Geolocator>
        },
        |location| Box::new(FixedGeolocator(Some(location))) as Box<dyn Geolocator>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lng_pairs() {
        assert_eq!(
            parse_location("-19.9167, -43.9345"),
            Some(LocationData::new(-19.9167, -43.9345))
        );
        assert_eq!(parse_location("-19.9167"), None);
        assert_eq!(parse_location("abc,1"), None);
        assert_eq!(parse_location("91,0"), None);
    }

    #[test]
    fn ip_api_failure_status_is_none() {
        let body: IpApiResponse =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
        assert_eq!(body.into_location(), None);

        let body: IpApiResponse =
            serde_json::from_str(r#"{"status":"success","lat":-19.92,"lon":-43.94}"#).unwrap();
        assert_eq!(body.into_location(), Some(LocationData::new(-19.92, -43.94)));
    }

    #[tokio::test]
    async fn fixed_locator_answers_its_position() {
        let locator = FixedGeolocator(Some(LocationData::new(-19.9167, -43.9345)));
        assert_eq!(
            locator.current_position().await,
            Some(LocationData::new(-19.9167, -43.9345))
        );
        assert_eq!(FixedGeolocator(None).current_position().await, None);
    }
}
