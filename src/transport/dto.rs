use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transport::repo::Vehicle;

#[derive(Debug, Deserialize)]
pub struct AddVehicleRequest {
    pub make: String,
    pub model: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub year: i32,
    #[serde(rename = "emissionsCO2ePerKm")]
    pub emissions_co2e_per_km: f64,
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub year: i32,
    #[serde(rename = "emissionsCO2ePerKm")]
    pub emissions_co2e_per_km: f64,
    pub default: bool,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            make: v.make,
            model: v.model,
            vehicle_type: v.vehicle_type,
            year: v.year,
            emissions_co2e_per_km: v.emissions_co2e_per_km,
            default: v.is_default,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self { status: "success" }
    }
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub query: String,
    #[serde(rename = "sessionToken")]
    pub session_token: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub metric: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub origin: String,
    pub destination: String,
    pub mode: String,
    #[serde(rename = "vehicleId")]
    pub vehicle_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn vehicle_response_uses_client_field_names() {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            make: "Toyota".into(),
            model: "Yaris".into(),
            vehicle_type: "car".into(),
            year: 2019,
            emissions_co2e_per_km: 0.118,
            is_default: true,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&VehicleResponse::from(vehicle)).unwrap();
        assert!(json.contains("\"type\":\"car\""));
        assert!(json.contains("\"emissionsCO2ePerKm\":0.118"));
        assert!(json.contains("\"default\":true"));
    }

    #[test]
    fn add_vehicle_request_parses_client_payload() {
        let json = r#"{
            "make": "Tesla", "model": "Model 3", "type": "electric_car",
            "year": 2022, "emissionsCO2ePerKm": 0.047
        }"#;
        let req: AddVehicleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.vehicle_type, "electric_car");
        assert!((req.emissions_co2e_per_km - 0.047).abs() < 1e-9);
    }
}
