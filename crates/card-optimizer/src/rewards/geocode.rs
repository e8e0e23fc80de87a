use serde::Deserialize;

use super::domain::Position;
use super::resolver::{LookupError, PlaceTypeLookup};
use crate::config::GeocoderConfig;

#[derive(Debug, Deserialize)]
struct ReversePlace {
    #[serde(rename = "type")]
    place_type: Option<String>,
}

/// Reverse geocoding client for Nominatim-compatible endpoints.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    agent: ureq::Agent,
    base_url: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            agent,
            base_url: config.base_url.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl PlaceTypeLookup for NominatimClient {
    fn place_type(&self, position: Position) -> Result<String, LookupError> {
        let response = self
            .agent
            .get(&self.base_url)
            .query("format", "jsonv2")
            .query("lat", &position.latitude.to_string())
            .query("lon", &position.longitude.to_string())
            .set("User-Agent", &self.user_agent)
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => LookupError::Status(code),
                ureq::Error::Transport(transport) => LookupError::Transport(transport.to_string()),
            })?;

        let place: ReversePlace = response
            .into_json()
            .map_err(|err| LookupError::Malformed(err.to_string()))?;

        place
            .place_type
            .map(|place_type| place_type.trim().to_string())
            .filter(|place_type| !place_type.is_empty())
            .ok_or_else(|| LookupError::Malformed("missing `type` field".to_string()))
    }
}
