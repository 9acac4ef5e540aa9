use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::AppError,
    routing::TravelMode,
    state::AppState,
    stats::StatisticsSnapshot,
    transport::{
        dto::{
            AddVehicleRequest, AutocompleteQuery, EstimateQuery, LeaderboardQuery, StatusResponse,
            VehicleResponse,
        },
        repo::Vehicle,
        services::{self, Leaderboard, LeaderboardMetric, LeaderboardPeriod},
    },
    trips,
};

pub fn transport_routes() -> Router<AppState> {
    Router::new()
        .route("/transport/vehicles", get(list_vehicles))
        .route("/transport/vehicles", post(add_vehicle))
        .route("/transport/vehicles/:id/default", put(set_default_vehicle))
        .route("/transport/vehicles/:id", delete(delete_vehicle))
        .route("/transport/statistics", get(get_statistics))
        .route("/transport/leaderboard", get(get_leaderboard))
        .route("/transport/tripestimate", get(get_trip_estimate))
        .route("/transport/autocomplete", get(autocomplete))
}

#[instrument(skip(state))]
pub async fn list_vehicles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let vehicles = Vehicle::list_by_owner(&state.db, user_id).await?;
    Ok(Json(
        vehicles.into_iter().map(VehicleResponse::from).collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn add_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleResponse>), AppError> {
    let vehicle = services::create_vehicle(
        &state.db,
        user_id,
        &payload.make,
        &payload.model,
        &payload.vehicle_type,
        payload.year,
        payload.emissions_co2e_per_km,
    )
    .await?;

    info!(user_id = %user_id, vehicle_id = %vehicle.id, "vehicle created");
    Ok((StatusCode::CREATED, Json(vehicle.into())))
}

#[instrument(skip(state))]
pub async fn set_default_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    Vehicle::set_default(&state.db, id, user_id).await?;
    info!(user_id = %user_id, vehicle_id = %id, "default vehicle changed");
    Ok(Json(StatusResponse::success()))
}

#[instrument(skip(state))]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    Vehicle::delete(&state.db, id, user_id).await?;
    info!(user_id = %user_id, vehicle_id = %id, "vehicle deleted");
    Ok(Json(StatusResponse::success()))
}

#[instrument(skip(state))]
pub async fn get_statistics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatisticsSnapshot>, AppError> {
    let snapshot = services::user_statistics(&state.db, user_id).await?;
    Ok(Json(snapshot))
}

#[instrument(skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<LeaderboardQuery>,
) -> Result<Json<Leaderboard>, AppError> {
    let metric = match q.metric.as_deref() {
        Some(m) => m.parse::<LeaderboardMetric>().map_err(AppError::Validation)?,
        None => LeaderboardMetric::TotalEmissions,
    };
    let period = match q.period.as_deref() {
        Some(p) => p.parse::<LeaderboardPeriod>().map_err(AppError::Validation)?,
        None => LeaderboardPeriod::Lifetime,
    };
    let leaderboard = services::leaderboard(&state.db, metric, period).await?;
    Ok(Json(leaderboard))
}

#[instrument(skip(state))]
pub async fn get_trip_estimate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<EstimateQuery>,
) -> Result<Json<trips::services::TripEstimate>, AppError> {
    let mode = q.mode.parse::<TravelMode>().map_err(AppError::Validation)?;
    let vehicle = match q.vehicle_id {
        Some(id) => Some(
            Vehicle::find_owned(&state.db, id, user_id)
                .await?
                .ok_or_else(|| {
                    AppError::InvalidVehicle("vehicle not found or not owned".into())
                })?,
        ),
        None => None,
    };
    let default_vehicle = Vehicle::default_for_owner(&state.db, user_id).await?;

    let estimate = trips::services::estimate_trip(
        state.routing.as_ref(),
        &state.config.estimation,
        q.origin.trim(),
        q.destination.trim(),
        mode,
        vehicle.as_ref(),
        default_vehicle.as_ref(),
    )
    .await?;
    Ok(Json(estimate))
}

#[instrument(skip(state))]
pub async fn autocomplete(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<AutocompleteQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let query = q.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query must not be empty".into()));
    }
    let suggestions = state.routing.autocomplete(query, q.session_token).await?;
    Ok(Json(suggestions))
}
