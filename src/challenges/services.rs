use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::challenges::repo::{
    self, ChallengeType, UserChallenge, STATUS_COMPLETED, STATUS_IN_PROGRESS,
};
use crate::error::AppError;
use crate::trips::repo::Trip;

/// New progress value and completion flag after applying one increment.
/// Completed values clamp to the target.
fn advance(current_value: f64, target_value: f64, delta: f64) -> (f64, bool) {
    let next = current_value + delta;
    if next >= target_value {
        (target_value, true)
    } else {
        (next, false)
    }
}

/// Advance every unfinished challenge of the user by the trip's
/// contribution. Metric challenges accumulate saved emissions, action
/// challenges count trips. Completion awards the challenge's points. The
/// whole progression commits atomically with row locks on the statuses.
pub async fn progress_after_trip(
    db: &PgPool,
    user_id: Uuid,
    trip: &Trip,
) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    let statuses = repo::list_unfinished_for_update(&mut tx, user_id).await?;
    for st in statuses {
        let delta = match challenge_type(&st)? {
            ChallengeType::Metric => trip.saved_emissions_co2e_kg,
            ChallengeType::Action => 1.0,
        };
        let (current_value, completed) = advance(st.current_value, st.target_value, delta);
        let status = if completed {
            STATUS_COMPLETED
        } else {
            STATUS_IN_PROGRESS
        };

        sqlx::query(
            "UPDATE challenge_statuses
             SET status = $1,
                 current_value = $2,
                 started_at = COALESCE(started_at, now()),
                 completed_at = CASE WHEN $3 THEN now() ELSE completed_at END
             WHERE id = $4",
        )
        .bind(status)
        .bind(current_value)
        .bind(completed)
        .bind(st.status_id)
        .execute(&mut *tx)
        .await?;

        if completed {
            sqlx::query("UPDATE users SET points = points + $1 WHERE id = $2")
                .bind(st.reward_points)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            info!(
                user_id = %user_id,
                challenge_id = %st.challenge_id,
                reward_points = st.reward_points,
                "challenge completed"
            );
        }
    }

    tx.commit().await?;
    Ok(())
}

fn challenge_type(st: &UserChallenge) -> Result<ChallengeType, AppError> {
    st.challenge_type
        .parse()
        .map_err(|e: String| AppError::Validation(e))
}
