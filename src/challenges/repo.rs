use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    /// Progress measured in saved emissions (kg CO2e).
    Metric,
    /// Progress measured in completed trips.
    Action,
}

impl ChallengeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeType::Metric => "metric",
            ChallengeType::Action => "action",
        }
    }
}

impl FromStr for ChallengeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(ChallengeType::Metric),
            "action" => Ok(ChallengeType::Action),
            other => Err(format!("unknown challenge type: {other}")),
        }
    }
}

pub const STATUS_NOT_STARTED: &str = "not_started";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub reward_points: i32,
    pub duration_days: i32,
    pub challenge_type: String,
    pub target_value: f64,
    pub metric_unit: String,
}

/// A user's status joined with its challenge definition.
#[derive(Debug, Clone, FromRow)]
pub struct UserChallenge {
    pub status_id: Uuid,
    pub challenge_id: Uuid,
    pub title: String,
    pub description: String,
    pub reward_points: i32,
    pub challenge_type: String,
    pub target_value: f64,
    pub metric_unit: String,
    pub status: String,
    pub current_value: f64,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
}

const CHALLENGE_COLUMNS: &str =
    "id, title, description, reward_points, duration_days, challenge_type, target_value, metric_unit";

const USER_CHALLENGE_SELECT: &str = "SELECT cs.id AS status_id, c.id AS challenge_id, c.title, c.description,
            c.reward_points, c.challenge_type, c.target_value, c.metric_unit,
            cs.status, cs.current_value, cs.started_at, cs.completed_at
     FROM challenge_statuses cs
     JOIN challenges c ON c.id = cs.challenge_id";

impl Challenge {
    pub async fn list_all(db: &PgPool) -> Result<Vec<Challenge>, AppError> {
        let rows = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges ORDER BY title"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &PgPool,
        title: &str,
        description: &str,
        reward_points: i32,
        duration_days: i32,
        challenge_type: ChallengeType,
        target_value: f64,
        metric_unit: &str,
    ) -> Result<Challenge, AppError> {
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "INSERT INTO challenges (title, description, reward_points, duration_days,
                                     challenge_type, target_value, metric_unit)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {CHALLENGE_COLUMNS}"
        ))
        .bind(title)
        .bind(description)
        .bind(reward_points)
        .bind(duration_days)
        .bind(challenge_type.as_str())
        .bind(target_value)
        .bind(metric_unit)
        .fetch_one(db)
        .await?;
        Ok(challenge)
    }
}

/// Give the user a not-started status for every existing challenge.
pub async fn assign_all_to_user(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO challenge_statuses (user_id, challenge_id)
         SELECT $1, id FROM challenges
         ON CONFLICT (user_id, challenge_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<UserChallenge>, AppError> {
    let rows = sqlx::query_as::<_, UserChallenge>(&format!(
        "{USER_CHALLENGE_SELECT} WHERE cs.user_id = $1 ORDER BY c.title"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_unfinished_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
) -> Result<Vec<UserChallenge>, AppError> {
    let rows = sqlx::query_as::<_, UserChallenge>(&format!(
        "{USER_CHALLENGE_SELECT} WHERE cs.user_id = $1 AND cs.status <> 'completed'
         FOR UPDATE OF cs"
    ))
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}
