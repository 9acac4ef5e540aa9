use std::str::FromStr;

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::stats::{self, StatisticsSnapshot};
use crate::transport::repo::{Vehicle, VehicleType};
use crate::trips::repo::Trip;

/// Create a vehicle for the given owner. The registry enforces a
/// non-negative emissions factor; the first vehicle becomes the default.
pub async fn create_vehicle(
    db: &PgPool,
    owner_id: Uuid,
    make: &str,
    model: &str,
    vehicle_type: &str,
    year: i32,
    emissions_co2e_per_km: f64,
) -> Result<Vehicle, AppError> {
    if emissions_co2e_per_km < 0.0 {
        return Err(AppError::InvalidVehicle(
            "emissions factor must not be negative".into(),
        ));
    }
    let vehicle_type = VehicleType::from_str(vehicle_type).map_err(AppError::Validation)?;

    Vehicle::insert(
        db,
        owner_id,
        make,
        model,
        vehicle_type,
        year,
        emissions_co2e_per_km,
    )
    .await
}

/// Fold the user's full trip ledger into a snapshot.
pub async fn user_statistics(db: &PgPool, user_id: Uuid) -> Result<StatisticsSnapshot, AppError> {
    let trips = Trip::list_all_by_user(db, user_id).await?;
    Ok(stats::summarize(&trips))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardMetric {
    TotalEmissions,
    TotalSavedEmissions,
    TotalDistanceKm,
    TotalDurationSeconds,
    AverageCo2ePerKm,
}

impl LeaderboardMetric {
    /// Aggregate expression and ranking direction. Lower is better for
    /// absolute and per-km emissions; higher is better for the rest.
    fn sql(self) -> (&'static str, &'static str) {
        match self {
            LeaderboardMetric::TotalEmissions => ("SUM(t.emissions_co2e_kg)", "ASC"),
            LeaderboardMetric::TotalSavedEmissions => ("SUM(t.saved_emissions_co2e_kg)", "DESC"),
            LeaderboardMetric::TotalDistanceKm => ("SUM(t.distance_km)", "DESC"),
            LeaderboardMetric::TotalDurationSeconds => ("SUM(t.duration_seconds)", "DESC"),
            LeaderboardMetric::AverageCo2ePerKm => (
                "COALESCE(AVG(t.emissions_co2e_kg / NULLIF(t.distance_km, 0)), 0)",
                "ASC",
            ),
        }
    }
}

impl FromStr for LeaderboardMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total_emissions" => Ok(LeaderboardMetric::TotalEmissions),
            "total_saved_emissions" => Ok(LeaderboardMetric::TotalSavedEmissions),
            "total_distance_km" => Ok(LeaderboardMetric::TotalDistanceKm),
            "total_duration_seconds" => Ok(LeaderboardMetric::TotalDurationSeconds),
            "average_co2e_per_km" => Ok(LeaderboardMetric::AverageCo2ePerKm),
            other => Err(format!("unknown leaderboard metric: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    Lifetime,
    PastYear,
    PastMonth,
    PastWeek,
}

impl LeaderboardPeriod {
    fn cutoff(self, now: OffsetDateTime) -> OffsetDateTime {
        match self {
            LeaderboardPeriod::Lifetime => OffsetDateTime::UNIX_EPOCH,
            LeaderboardPeriod::PastYear => now - time::Duration::days(365),
            LeaderboardPeriod::PastMonth => now - time::Duration::days(30),
            LeaderboardPeriod::PastWeek => now - time::Duration::weeks(1),
        }
    }
}

impl FromStr for LeaderboardPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lifetime" => Ok(LeaderboardPeriod::Lifetime),
            "past_year" => Ok(LeaderboardPeriod::PastYear),
            "past_month" => Ok(LeaderboardPeriod::PastMonth),
            "past_week" => Ok(LeaderboardPeriod::PastWeek),
            other => Err(format!("unknown leaderboard period: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaderboardRow {
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub metric: LeaderboardMetric,
    pub period: LeaderboardPeriod,
    pub rows: Vec<LeaderboardRow>,
}

/// Rank users that logged trips since the period cutoff by the given metric.
pub async fn leaderboard(
    db: &PgPool,
    metric: LeaderboardMetric,
    period: LeaderboardPeriod,
) -> Result<Leaderboard, AppError> {
    let since = period.cutoff(OffsetDateTime::now_utc());
    let (expr, order) = metric.sql();
    let sql = format!(
        "SELECT u.username, u.first_name, u.last_name, {expr} AS value
         FROM users u
         JOIN trips t ON t.user_id = u.id
         WHERE t.created_at >= $1
         GROUP BY u.id, u.username, u.first_name, u.last_name
         ORDER BY value {order}"
    );
    let rows = sqlx::query_as::<_, LeaderboardRow>(&sql)
        .bind(since)
        .fetch_all(db)
        .await?;

    Ok(Leaderboard {
        metric,
        period,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_parses_and_orders() {
        let m: LeaderboardMetric = "total_saved_emissions".parse().unwrap();
        assert_eq!(m, LeaderboardMetric::TotalSavedEmissions);
        assert_eq!(m.sql().1, "DESC");

        let m: LeaderboardMetric = "total_emissions".parse().unwrap();
        assert_eq!(m.sql().1, "ASC");

        assert!("step_count".parse::<LeaderboardMetric>().is_err());
    }

    #[test]
    fn period_cutoffs_are_ordered() {
        let now = OffsetDateTime::now_utc();
        let lifetime = LeaderboardPeriod::Lifetime.cutoff(now);
        let year = LeaderboardPeriod::PastYear.cutoff(now);
        let month = LeaderboardPeriod::PastMonth.cutoff(now);
        let week = LeaderboardPeriod::PastWeek.cutoff(now);
        assert!(lifetime < year);
        assert!(year < month);
        assert!(month < week);
        assert!(week < now);
    }

    #[test]
    fn average_metric_guards_zero_distance() {
        let (expr, _) = LeaderboardMetric::AverageCo2ePerKm.sql();
        assert!(expr.contains("NULLIF"));
    }
}
