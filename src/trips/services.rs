//! Trip estimation: distance/duration from the routing provider, emissions
//! and cost for the chosen mode, and savings against a reference drive.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::challenges;
use crate::config::EstimationConfig;
use crate::error::AppError;
use crate::routing::{RoutingClient, TravelMode};
use crate::state::AppState;
use crate::transport::repo::Vehicle;
use crate::trips::dto::CreateTripRequest;
use crate::trips::repo::{NewTrip, Trip};

#[derive(Debug, Clone, Serialize)]
pub struct TripEstimate {
    pub mode: TravelMode,
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
}

/// Factor in kg CO2e per km. A vehicle only contributes its own factor when
/// its type is routed as the requested mode.
fn emission_factor(cfg: &EstimationConfig, mode: TravelMode, vehicle: Option<&Vehicle>) -> f64 {
    if let Some(v) = vehicle {
        if v.vehicle_type().map_or(false, |t| t.travel_mode() == mode) {
            return v.emissions_co2e_per_km;
        }
    }
    match mode {
        TravelMode::Walk | TravelMode::Bike => 0.0,
        TravelMode::Transit => cfg.transit_emissions_per_km,
        TravelMode::Drive => cfg.average_drive_emissions_per_km,
    }
}

fn cost_per_km(cfg: &EstimationConfig, mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Walk | TravelMode::Bike => 0.0,
        TravelMode::Transit => cfg.transit_cost_nok_per_km,
        TravelMode::Drive => cfg.drive_cost_nok_per_km,
    }
}

fn validate_drive_vehicle(vehicle: Option<&Vehicle>) -> Result<&Vehicle, AppError> {
    let vehicle = vehicle.ok_or_else(|| {
        AppError::InvalidVehicle("a vehicle is required for drive trips".into())
    })?;
    if vehicle.vehicle_type()?.travel_mode() != TravelMode::Drive {
        return Err(AppError::InvalidVehicle(format!(
            "vehicle type {} cannot be driven",
            vehicle.vehicle_type
        )));
    }
    if vehicle.emissions_co2e_per_km <= 0.0 {
        return Err(AppError::InvalidVehicle(
            "vehicle emissions factor must be positive".into(),
        ));
    }
    Ok(vehicle)
}

/// Estimate one trip. Pure given the provider responses: distance and
/// duration come from the requested mode's route; the reference drive uses
/// the same origin/destination with the owner's default vehicle factor (or
/// the configured fleet average when there is none). Savings never go
/// negative.
pub async fn estimate_trip(
    routing: &dyn RoutingClient,
    cfg: &EstimationConfig,
    origin: &str,
    destination: &str,
    mode: TravelMode,
    vehicle: Option<&Vehicle>,
    default_vehicle: Option<&Vehicle>,
) -> Result<TripEstimate, AppError> {
    if mode == TravelMode::Drive {
        validate_drive_vehicle(vehicle)?;
    }

    let route = routing.route(origin, destination, mode).await?;
    let drive_route = if mode == TravelMode::Drive {
        route
    } else {
        routing.route(origin, destination, TravelMode::Drive).await?
    };

    let emissions_co2e_kg = route.distance_km * emission_factor(cfg, mode, vehicle);
    let baseline_factor = default_vehicle
        .map(|v| v.emissions_co2e_per_km)
        .unwrap_or(cfg.average_drive_emissions_per_km);
    let drive_emissions = drive_route.distance_km * baseline_factor;
    let saved_emissions_co2e_kg = (drive_emissions - emissions_co2e_kg).max(0.0);

    let cost_nok = route.distance_km * cost_per_km(cfg, mode);
    let drive_cost = drive_route.distance_km * cfg.drive_cost_nok_per_km;
    let saved_cost_nok = (drive_cost - cost_nok).max(0.0);

    debug!(
        %mode,
        distance_km = route.distance_km,
        emissions_co2e_kg,
        saved_emissions_co2e_kg,
        "trip estimated"
    );

    Ok(TripEstimate {
        mode,
        distance_km: route.distance_km,
        duration_seconds: route.duration_seconds,
        emissions_co2e_kg,
        saved_emissions_co2e_kg,
        cost_nok,
        saved_cost_nok,
    })
}

/// Pick the travel mode and the vehicle participating in the estimate from
/// a trip request: an explicit mode wins, otherwise the vehicle's type
/// decides. One of the two must be present.
fn resolve_mode(
    requested_mode: Option<&str>,
    vehicle: Option<&Vehicle>,
) -> Result<TravelMode, AppError> {
    match requested_mode {
        Some(m) => m
            .parse::<TravelMode>()
            .map_err(AppError::Validation),
        None => match vehicle {
            Some(v) => Ok(v.vehicle_type()?.travel_mode()),
            None => Err(AppError::Validation(
                "either mode or vehicleId must be given".into(),
            )),
        },
    }
}

/// Estimate, persist and return one trip for the user, advancing any of
/// their unfinished challenges.
pub async fn record_trip(
    state: &AppState,
    user_id: Uuid,
    req: &CreateTripRequest,
) -> Result<Trip, AppError> {
    let origin = req.origin.trim();
    let destination = req.destination.trim();
    if origin.is_empty() || destination.is_empty() {
        return Err(AppError::Validation(
            "origin and destination are required".into(),
        ));
    }

    let vehicle = match req.vehicle_id {
        Some(id) => Some(
            Vehicle::find_owned(&state.db, id, user_id)
                .await?
                .ok_or_else(|| {
                    AppError::InvalidVehicle("vehicle not found or not owned".into())
                })?,
        ),
        None => None,
    };
    let mode = resolve_mode(req.mode.as_deref(), vehicle.as_ref())?;
    let default_vehicle = Vehicle::default_for_owner(&state.db, user_id).await?;

    let estimate = estimate_trip(
        state.routing.as_ref(),
        &state.config.estimation,
        origin,
        destination,
        mode,
        vehicle.as_ref(),
        default_vehicle.as_ref(),
    )
    .await?;

    // Only remember the vehicle when it actually took part in the estimate.
    let vehicle_id = vehicle
        .as_ref()
        .filter(|v| v.vehicle_type().map_or(false, |t| t.travel_mode() == mode))
        .map(|v| v.id);

    let trip = Trip::insert(
        &state.db,
        NewTrip {
            user_id,
            origin,
            destination,
            travel_mode: mode.as_str(),
            vehicle_id,
            distance_km: estimate.distance_km,
            duration_seconds: estimate.duration_seconds,
            emissions_co2e_kg: estimate.emissions_co2e_kg,
            saved_emissions_co2e_kg: estimate.saved_emissions_co2e_kg,
            cost_nok: estimate.cost_nok,
            saved_cost_nok: estimate.saved_cost_nok,
        },
    )
    .await?;

    challenges::services::progress_after_trip(&state.db, user_id, &trip).await?;

    info!(user_id = %user_id, trip_id = %trip.id, %mode, "trip recorded");
    Ok(trip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouteSummary, RoutingError};
    use async_trait::async_trait;
    use time::OffsetDateTime;

    /// Fixed distances per mode; drive routes are slightly longer than the
    /// direct walking line, as a road network would be.
    struct FixedRouting {
        walk_km: f64,
        bike_km: f64,
        transit_km: f64,
        drive_km: f64,
    }

    impl FixedRouting {
        fn uniform(km: f64) -> Self {
            Self {
                walk_km: km,
                bike_km: km,
                transit_km: km,
                drive_km: km,
            }
        }
    }

    #[async_trait]
    impl RoutingClient for FixedRouting {
        async fn route(
            &self,
            _origin: &str,
            _destination: &str,
            mode: TravelMode,
        ) -> Result<RouteSummary, RoutingError> {
            let distance_km = match mode {
                TravelMode::Walk => self.walk_km,
                TravelMode::Bike => self.bike_km,
                TravelMode::Transit => self.transit_km,
                TravelMode::Drive => self.drive_km,
            };
            Ok(RouteSummary {
                distance_km,
                duration_seconds: distance_km * 120.0,
            })
        }

        async fn autocomplete(
            &self,
            _query: &str,
            _session_token: Uuid,
        ) -> Result<Vec<String>, RoutingError> {
            Ok(vec![])
        }
    }

    fn vehicle(vehicle_type: &str, factor: f64, is_default: bool) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            make: "Test".into(),
            model: "Test".into(),
            vehicle_type: vehicle_type.into(),
            year: 2020,
            emissions_co2e_per_km: factor,
            is_default,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn cfg() -> EstimationConfig {
        EstimationConfig::default()
    }

    #[tokio::test]
    async fn walk_has_zero_emissions_and_full_drive_savings() {
        let routing = FixedRouting {
            walk_km: 2.0,
            bike_km: 2.0,
            transit_km: 2.5,
            drive_km: 3.0,
        };
        let estimate = estimate_trip(
            &routing,
            &cfg(),
            "Bryggen",
            "Fantoft",
            TravelMode::Walk,
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(estimate.emissions_co2e_kg, 0.0);
        // No default vehicle: baseline is the fleet average over the drive route.
        let expected_saved = 3.0 * cfg().average_drive_emissions_per_km;
        assert!((estimate.saved_emissions_co2e_kg - expected_saved).abs() < 1e-9);
        assert_eq!(estimate.cost_nok, 0.0);
        let expected_cost_saving = 3.0 * cfg().drive_cost_nok_per_km;
        assert!((estimate.saved_cost_nok - expected_cost_saving).abs() < 1e-9);
    }

    #[tokio::test]
    async fn drive_uses_vehicle_factor_and_saves_nothing_against_itself() {
        let routing = FixedRouting::uniform(10.0);
        let car = vehicle("car", 0.15, true);
        let estimate = estimate_trip(
            &routing,
            &cfg(),
            "Bergen",
            "Voss",
            TravelMode::Drive,
            Some(&car),
            Some(&car),
        )
        .await
        .unwrap();

        assert!((estimate.emissions_co2e_kg - 1.5).abs() < 1e-9);
        assert_eq!(estimate.saved_emissions_co2e_kg, 0.0);
        assert_eq!(estimate.saved_cost_nok, 0.0);
    }

    #[tokio::test]
    async fn drive_without_vehicle_is_invalid() {
        let routing = FixedRouting::uniform(5.0);
        let err = estimate_trip(
            &routing,
            &cfg(),
            "A",
            "B",
            TravelMode::Drive,
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidVehicle(_)));
    }

    #[tokio::test]
    async fn drive_rejects_zero_factor_and_undrivable_vehicles() {
        let routing = FixedRouting::uniform(5.0);

        let broken = vehicle("car", 0.0, false);
        let err = estimate_trip(
            &routing,
            &cfg(),
            "A",
            "B",
            TravelMode::Drive,
            Some(&broken),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidVehicle(_)));

        let bicycle = vehicle("bicycle", 0.001, false);
        let err = estimate_trip(
            &routing,
            &cfg(),
            "A",
            "B",
            TravelMode::Drive,
            Some(&bicycle),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidVehicle(_)));
    }

    #[tokio::test]
    async fn transit_uses_per_person_constant() {
        let routing = FixedRouting::uniform(10.0);
        let estimate = estimate_trip(
            &routing,
            &cfg(),
            "A",
            "B",
            TravelMode::Transit,
            None,
            None,
        )
        .await
        .unwrap();

        assert!((estimate.emissions_co2e_kg - 0.89).abs() < 1e-9);
        let baseline = 10.0 * cfg().average_drive_emissions_per_km;
        assert!((estimate.saved_emissions_co2e_kg - (baseline - 0.89).max(0.0)).abs() < 1e-9);
        assert!((estimate.cost_nok - 10.0 * cfg().transit_cost_nok_per_km).abs() < 1e-9);
    }

    #[tokio::test]
    async fn bike_trip_with_matching_vehicle_uses_its_factor() {
        let routing = FixedRouting::uniform(4.0);
        let ebike = vehicle("electric_bike", 0.005, false);
        let estimate = estimate_trip(
            &routing,
            &cfg(),
            "A",
            "B",
            TravelMode::Bike,
            Some(&ebike),
            None,
        )
        .await
        .unwrap();
        assert!((estimate.emissions_co2e_kg - 0.02).abs() < 1e-9);
    }

    #[tokio::test]
    async fn savings_are_clamped_at_zero() {
        // Driving a clean car while the default is even cleaner: no negative savings.
        let routing = FixedRouting::uniform(10.0);
        let ev = vehicle("electric_car", 0.047, false);
        let cleaner_default = vehicle("electric_car", 0.02, true);
        let estimate = estimate_trip(
            &routing,
            &cfg(),
            "A",
            "B",
            TravelMode::Drive,
            Some(&ev),
            Some(&cleaner_default),
        )
        .await
        .unwrap();
        assert_eq!(estimate.saved_emissions_co2e_kg, 0.0);
    }

    #[test]
    fn mode_resolution_prefers_explicit_mode() {
        let car = vehicle("car", 0.12, true);
        assert_eq!(
            resolve_mode(Some("transit"), Some(&car)).unwrap(),
            TravelMode::Transit
        );
        assert_eq!(resolve_mode(None, Some(&car)).unwrap(), TravelMode::Drive);
        assert!(matches!(
            resolve_mode(None, None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            resolve_mode(Some("teleport"), None),
            Err(AppError::Validation(_))
        ));
    }
}
