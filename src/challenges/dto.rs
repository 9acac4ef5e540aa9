use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::challenges::repo::{Challenge, UserChallenge};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub reward_points: i32,
    pub duration_days: i32,
    pub challenge_type: String,
    pub target_value: f64,
    pub metric_unit: String,
}

impl From<Challenge> for ChallengeResponse {
    fn from(c: Challenge) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            reward_points: c.reward_points,
            duration_days: c.duration_days,
            challenge_type: c.challenge_type,
            target_value: c.target_value,
            metric_unit: c.metric_unit,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChallengeResponse {
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

impl From<UserChallenge> for UserChallengeResponse {
    fn from(uc: UserChallenge) -> Self {
        Self {
            challenge_id: uc.challenge_id,
            title: uc.title,
            description: uc.description,
            reward_points: uc.reward_points,
            challenge_type: uc.challenge_type,
            target_value: uc.target_value,
            metric_unit: uc.metric_unit,
            status: uc.status,
            current_value: uc.current_value,
            started_at: uc.started_at,
            completed_at: uc.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub reward_points: i32,
    pub duration_days: i32,
    pub challenge_type: String,
    pub target_value: f64,
    #[serde(default)]
    pub metric_unit: String,
}
