use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    cosmetics::{
        dto::{CosmeticResponse, PurchaseRequest},
        repo::Cosmetic,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn cosmetics_routes() -> Router<AppState> {
    Router::new()
        .route("/cosmetics/shop", get(get_shop))
        .route("/cosmetics/inventory", get(get_inventory))
        .route("/cosmetics/purchase", post(purchase_cosmetic))
        .route("/cosmetics/equip/:id", put(equip_cosmetic))
}

#[instrument(skip(state))]
pub async fn get_shop(
    State(state): State<AppState>,
) -> Result<Json<Vec<CosmeticResponse>>, AppError> {
    let cosmetics = Cosmetic::list_all(&state.db).await?;
    Ok(Json(
        cosmetics.into_iter().map(CosmeticResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_inventory(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<CosmeticResponse>>, AppError> {
    let cosmetics = Cosmetic::inventory(&state.db, user_id).await?;
    Ok(Json(
        cosmetics.into_iter().map(CosmeticResponse::from).collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn purchase_cosmetic(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Json<CosmeticResponse>, AppError> {
    let cosmetic = services::purchase(&state.db, user_id, &payload.name).await?;
    Ok(Json(cosmetic.into()))
}

#[instrument(skip(state))]
pub async fn equip_cosmetic(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CosmeticResponse>, AppError> {
    let cosmetic = services::equip(&state.db, user_id, id).await?;
    Ok(Json(cosmetic.into()))
}
