use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{AdminUser, AuthUser},
    challenges::{
        dto::{ChallengeResponse, CreateChallengeRequest, UserChallengeResponse},
        repo::{self, Challenge, ChallengeType},
    },
    error::AppError,
    state::AppState,
};

pub fn challenge_routes() -> Router<AppState> {
    Router::new()
        .route("/challenges", get(list_challenges))
        .route("/challenges", post(create_challenge))
        .route("/challenges/status", get(list_user_challenges))
}

#[instrument(skip(state))]
pub async fn list_challenges(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<ChallengeResponse>>, AppError> {
    let challenges = Challenge::list_all(&state.db).await?;
    Ok(Json(
        challenges.into_iter().map(ChallengeResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn list_user_challenges(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<UserChallengeResponse>>, AppError> {
    let statuses = repo::list_for_user(&state.db, user_id).await?;
    Ok(Json(
        statuses
            .into_iter()
            .map(UserChallengeResponse::from)
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_challenge(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Json(payload): Json<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<ChallengeResponse>), AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".into()));
    }
    if payload.target_value <= 0.0 {
        return Err(AppError::Validation("target value must be positive".into()));
    }
    let challenge_type = payload
        .challenge_type
        .parse::<ChallengeType>()
        .map_err(AppError::Validation)?;

    let challenge = Challenge::create(
        &state.db,
        payload.title.trim(),
        &payload.description,
        payload.reward_points,
        payload.duration_days,
        challenge_type,
        payload.target_value,
        &payload.metric_unit,
    )
    .await?;

    info!(admin_id = %admin_id, challenge_id = %challenge.id, "challenge created");
    Ok((StatusCode::CREATED, Json(challenge.into())))
}
