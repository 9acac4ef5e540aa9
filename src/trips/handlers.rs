use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::AppError,
    state::AppState,
    trips::{
        dto::{CreateTripRequest, Pagination, TripResponse},
        repo::Trip,
        services,
    },
};

pub fn trip_routes() -> Router<AppState> {
    Router::new()
        .route("/trips", post(create_trip))
        .route("/trips", get(list_trips))
}

#[instrument(skip(state, payload))]
pub async fn create_trip(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<TripResponse>), AppError> {
    let trip = services::record_trip(&state, user_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(trip.into())))
}

#[instrument(skip(state))]
pub async fn list_trips(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<TripResponse>>, AppError> {
    let trips = Trip::list_by_user(&state.db, user_id, p.limit, p.offset).await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}
