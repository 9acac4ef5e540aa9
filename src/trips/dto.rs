use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::trips::repo::Trip;

#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub origin: String,
    pub destination: String,
    /// walk | bike | transit | drive; derived from the vehicle when absent.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, rename = "vehicleId")]
    pub vehicle_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    #[serde(rename = "travelMode")]
    pub travel_mode: String,
    #[serde(rename = "vehicleId")]
    pub vehicle_id: Option<Uuid>,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "durationSeconds")]
    pub duration_seconds: f64,
    #[serde(rename = "emissionsCO2eKg")]
    pub emissions_co2e_kg: f64,
    #[serde(rename = "savedEmissionsCO2eKg")]
    pub saved_emissions_co2e_kg: f64,
    #[serde(rename = "costNOK")]
    pub cost_nok: f64,
    #[serde(rename = "savedCostNOK")]
    pub saved_cost_nok: f64,
    #[serde(rename = "createdAt")]
    pub created_at: OffsetDateTime,
}

impl From<Trip> for TripResponse {
    fn from(t: Trip) -> Self {
        Self {
            id: t.id,
            origin: t.origin,
            destination: t.destination,
            travel_mode: t.travel_mode,
            vehicle_id: t.vehicle_id,
            distance_km: t.distance_km,
            duration_seconds: t.duration_seconds,
            emissions_co2e_kg: t.emissions_co2e_kg,
            saved_emissions_co2e_kg: t.saved_emissions_co2e_kg,
            cost_nok: t.cost_nok,
            saved_cost_nok: t.saved_cost_nok,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trip_request_accepts_mode_or_vehicle() {
        let by_mode: CreateTripRequest =
            serde_json::from_str(r#"{"origin":"A","destination":"B","mode":"walk"}"#).unwrap();
        assert_eq!(by_mode.mode.as_deref(), Some("walk"));
        assert!(by_mode.vehicle_id.is_none());

        let id = Uuid::new_v4();
        let by_vehicle: CreateTripRequest = serde_json::from_str(&format!(
            r#"{{"origin":"A","destination":"B","vehicleId":"{id}"}}"#
        ))
        .unwrap();
        assert!(by_vehicle.mode.is_none());
        assert_eq!(by_vehicle.vehicle_id, Some(id));
    }
}
