//! Directions/geocoding provider client.
//!
//! Wraps a Google-Directions-style JSON API behind the [`RoutingClient`]
//! trait so handlers and tests can swap the implementation. A provider call
//! is a single attempt; failures surface to the caller unretried.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::RoutingConfig;

/// Travel mode of a trip, also the vocabulary sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walk,
    Bike,
    Transit,
    Drive,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Walk => "walk",
            TravelMode::Bike => "bike",
            TravelMode::Transit => "transit",
            TravelMode::Drive => "drive",
        }
    }

    /// Mode parameter the directions API expects.
    pub fn provider_mode(self) -> &'static str {
        match self {
            TravelMode::Walk => "walking",
            TravelMode::Bike => "bicycling",
            TravelMode::Transit => "transit",
            TravelMode::Drive => "driving",
        }
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walk" => Ok(TravelMode::Walk),
            "bike" => Ok(TravelMode::Bike),
            "transit" => Ok(TravelMode::Transit),
            "drive" => Ok(TravelMode::Drive),
            other => Err(format!("unknown travel mode: {other}")),
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance/duration of the best route for one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing connection failed: {0}")]
    ConnectionFailed(String),
    #[error("routing request failed: {0}")]
    RequestFailed(String),
    #[error("routing response parse error: {0}")]
    ParseError(String),
    #[error("address not found: {0}")]
    AddressNotFound(String),
    #[error("routing request timed out")]
    Timeout,
}

#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// Best route between two free-form addresses for the given mode.
    async fn route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<RouteSummary, RoutingError>;

    /// Address suggestions for a partial query.
    async fn autocomplete(
        &self,
        query: &str,
        session_token: Uuid,
    ) -> Result<Vec<String>, RoutingError>;
}

/// Directions API client over HTTP.
#[derive(Debug)]
pub struct DirectionsClient {
    client: Client,
    config: RoutingConfig,
}

impl DirectionsClient {
    pub fn new(config: &RoutingConfig) -> Result<Self, RoutingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("greentrip/0.1")
            .build()
            .map_err(|e| RoutingError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn parse_directions_response(
        body: &str,
        origin: &str,
        destination: &str,
    ) -> Result<RouteSummary, RoutingError> {
        let raw: RawDirectionsResponse =
            serde_json::from_str(body).map_err(|e| RoutingError::ParseError(e.to_string()))?;

        match raw.status.as_str() {
            "OK" => {}
            "NOT_FOUND" | "ZERO_RESULTS" => {
                return Err(RoutingError::AddressNotFound(format!(
                    "{origin} -> {destination}"
                )))
            }
            other => {
                let detail = raw.error_message.unwrap_or_default();
                return Err(RoutingError::RequestFailed(format!("{other} {detail}")));
            }
        }

        // The provider may return several routes; keep the shortest one.
        raw.routes
            .into_iter()
            .map(Self::summarize_route)
            .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
            .ok_or_else(|| {
                RoutingError::AddressNotFound(format!("{origin} -> {destination}"))
            })
    }

    fn summarize_route(route: RawRoute) -> RouteSummary {
        let mut distance_meters = 0.0;
        let mut duration_seconds = 0.0;
        for leg in route.legs {
            if let Some(d) = leg.distance {
                distance_meters += d.value;
            }
            if let Some(d) = leg.duration {
                duration_seconds += d.value;
            }
        }
        RouteSummary {
            distance_km: distance_meters / 1000.0,
            duration_seconds,
        }
    }

    fn parse_autocomplete_response(body: &str) -> Result<Vec<String>, RoutingError> {
        let raw: RawAutocompleteResponse =
            serde_json::from_str(body).map_err(|e| RoutingError::ParseError(e.to_string()))?;

        match raw.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(raw
                .predictions
                .into_iter()
                .map(|p| p.description)
                .collect()),
            other => Err(RoutingError::RequestFailed(other.to_string())),
        }
    }

    async fn get_text(&self, url: &str, params: &[(&str, String)]) -> Result<String, RoutingError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RoutingError::Timeout
                } else {
                    RoutingError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutingError::RequestFailed(format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| RoutingError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl RoutingClient for DirectionsClient {
    #[instrument(skip(self))]
    async fn route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<RouteSummary, RoutingError> {
        let url = format!("{}/maps/api/directions/json", self.config.base_url);
        let params = [
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", mode.provider_mode().to_string()),
            ("key", self.config.api_key.clone()),
        ];

        debug!(%origin, %destination, %mode, "requesting directions");
        let body = self.get_text(&url, &params).await?;
        let summary = Self::parse_directions_response(&body, origin, destination)?;

        if summary.distance_km == 0.0 {
            warn!(%origin, %destination, %mode, "provider returned a zero-length route");
        }
        Ok(summary)
    }

    #[instrument(skip(self, session_token))]
    async fn autocomplete(
        &self,
        query: &str,
        session_token: Uuid,
    ) -> Result<Vec<String>, RoutingError> {
        let url = format!(
            "{}/maps/api/place/autocomplete/json",
            self.config.base_url
        );
        let params = [
            ("input", query.to_string()),
            ("sessiontoken", session_token.to_string()),
            ("key", self.config.api_key.clone()),
        ];

        debug!(%query, "requesting address autocomplete");
        let body = self.get_text(&url, &params).await?;
        Self::parse_autocomplete_response(&body)
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawDirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<RawRoute>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    legs: Vec<RawLeg>,
}

#[derive(Debug, Deserialize)]
struct RawLeg {
    distance: Option<RawValue>,
    duration: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct RawAutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<RawPrediction>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_mode_round_trips_through_str() {
        for mode in [
            TravelMode::Walk,
            TravelMode::Bike,
            TravelMode::Transit,
            TravelMode::Drive,
        ] {
            assert_eq!(mode.as_str().parse::<TravelMode>().unwrap(), mode);
        }
        assert!("teleport".parse::<TravelMode>().is_err());
    }

    #[test]
    fn parse_directions_sums_legs_and_picks_shortest_route() {
        let json = r#"{
            "status": "OK",
            "routes": [
                {
                    "legs": [
                        { "distance": { "value": 8000.0 }, "duration": { "value": 900.0 } },
                        { "distance": { "value": 4000.0 }, "duration": { "value": 450.0 } }
                    ]
                },
                {
                    "legs": [
                        { "distance": { "value": 10000.0 }, "duration": { "value": 800.0 } }
                    ]
                }
            ]
        }"#;

        let summary =
            DirectionsClient::parse_directions_response(json, "Bergen", "Oslo").unwrap();
        assert!((summary.distance_km - 10.0).abs() < 1e-9);
        assert!((summary.duration_seconds - 800.0).abs() < 1e-9);
    }

    #[test]
    fn parse_directions_not_found_is_address_error() {
        let json = r#"{ "status": "NOT_FOUND", "routes": [] }"#;
        let err =
            DirectionsClient::parse_directions_response(json, "Nowhere", "Oslo").unwrap_err();
        assert!(matches!(err, RoutingError::AddressNotFound(_)));

        let json = r#"{ "status": "ZERO_RESULTS", "routes": [] }"#;
        let err = DirectionsClient::parse_directions_response(json, "A", "B").unwrap_err();
        assert!(matches!(err, RoutingError::AddressNotFound(_)));
    }

    #[test]
    fn parse_directions_provider_error_carries_detail() {
        let json = r#"{
            "status": "OVER_QUERY_LIMIT",
            "routes": [],
            "error_message": "quota exceeded"
        }"#;
        let err = DirectionsClient::parse_directions_response(json, "A", "B").unwrap_err();
        match err {
            RoutingError::RequestFailed(msg) => {
                assert!(msg.contains("OVER_QUERY_LIMIT"));
                assert!(msg.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_directions_rejects_invalid_json() {
        let err =
            DirectionsClient::parse_directions_response("not json", "A", "B").unwrap_err();
        assert!(matches!(err, RoutingError::ParseError(_)));
    }

    #[test]
    fn parse_autocomplete_extracts_descriptions() {
        let json = r#"{
            "status": "OK",
            "predictions": [
                { "description": "Bryggen, Bergen, Norway" },
                { "description": "Bryggen Tracteursted, Bergen, Norway" }
            ]
        }"#;
        let suggestions = DirectionsClient::parse_autocomplete_response(json).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0], "Bryggen, Bergen, Norway");
    }

    #[test]
    fn parse_autocomplete_zero_results_is_empty_not_error() {
        let json = r#"{ "status": "ZERO_RESULTS", "predictions": [] }"#;
        let suggestions = DirectionsClient::parse_autocomplete_response(json).unwrap();
        assert!(suggestions.is_empty());
    }
}

#[cfg(test)]
mod wiremock_tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> crate::config::RoutingConfig {
        crate::config::RoutingConfig {
            base_url,
            api_key: "test-key".into(),
            timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn route_hits_directions_endpoint_and_parses_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/directions/json"))
            .and(query_param("origin", "Bryggen, Bergen"))
            .and(query_param("destination", "Fantoft, Bergen"))
            .and(query_param("mode", "walking"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{
                    "status": "OK",
                    "routes": [{
                        "legs": [{
                            "distance": { "value": 5200.0 },
                            "duration": { "value": 3900.0 }
                        }]
                    }]
                }"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = DirectionsClient::new(&config(server.uri())).unwrap();
        let summary = client
            .route("Bryggen, Bergen", "Fantoft, Bergen", TravelMode::Walk)
            .await
            .unwrap();

        assert!((summary.distance_km - 5.2).abs() < 1e-9);
        assert!((summary.duration_seconds - 3900.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn route_maps_http_failure_to_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/directions/json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = DirectionsClient::new(&config(server.uri())).unwrap();
        let err = client
            .route("A", "B", TravelMode::Drive)
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn route_surfaces_unresolvable_addresses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/directions/json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{ "status": "NOT_FOUND", "routes": [] }"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = DirectionsClient::new(&config(server.uri())).unwrap();
        let err = client
            .route("gibberish", "Bergen", TravelMode::Transit)
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::AddressNotFound(_)));
    }

    #[tokio::test]
    async fn autocomplete_passes_session_token() {
        let server = MockServer::start().await;
        let token = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/maps/api/place/autocomplete/json"))
            .and(query_param("input", "Brygg"))
            .and(query_param("sessiontoken", token.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{
                    "status": "OK",
                    "predictions": [
                        { "description": "Bryggen, Bergen, Norway" }
                    ]
                }"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = DirectionsClient::new(&config(server.uri())).unwrap();
        let suggestions = client.autocomplete("Brygg", token).await.unwrap();
        assert_eq!(suggestions, vec!["Bryggen, Bergen, Norway".to_string()]);
    }
}
