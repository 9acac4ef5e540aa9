use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::{repo::User, AdminUser},
    error::AppError,
    state::AppState,
    stats::{self, StatisticsSnapshot},
    trips::repo::Trip,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/statistics", get(get_statistics))
}

#[derive(Debug, Serialize)]
pub struct AdminStatistics {
    #[serde(rename = "totalUsers")]
    pub total_users: i64,
    #[serde(flatten)]
    pub totals: StatisticsSnapshot,
}

/// System-wide totals over every user's ledger.
#[instrument(skip(state))]
pub async fn get_statistics(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<AdminStatistics>, AppError> {
    let total_users = User::count(&state.db).await?;
    let trips = Trip::list_all(&state.db).await?;
    let totals = stats::summarize(&trips);

    Ok(Json(AdminStatistics {
        total_users,
        totals,
    }))
}
