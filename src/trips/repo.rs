use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// One persisted trip. Rows are append-only: there is no update or delete
/// surface, statistics always recompute from the full ledger.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub user_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub travel_mode: String,
    pub vehicle_id: Option<Uuid>,
    pub distance_km: f64,
    pub duration_seconds: f64,
    pub emissions_co2e_kg: f64,
    pub saved_emissions_co2e_kg: f64,
    pub cost_nok: f64,
    pub saved_cost_nok: f64,
    pub created_at: OffsetDateTime,
}

const TRIP_COLUMNS: &str = "id, user_id, origin, destination, travel_mode, vehicle_id, \
     distance_km, duration_seconds, emissions_co2e_kg, saved_emissions_co2e_kg, \
     cost_nok, saved_cost_nok, created_at";

pub struct NewTrip<'a> {
    pub user_id: Uuid,
    pub origin: &'a str,
    pub destination: &'a str,
    pub travel_mode: &'a str,
    pub vehicle_id: Option<Uuid>,
    pub distance_km: f64,
    pub duration_seconds: f64,
    pub emissions_co2e_kg: f64,
    pub saved_emissions_co2e_kg: f64,
    pub cost_nok: f64,
    pub saved_cost_nok: f64,
}

impl Trip {
    /// Persist one trip; id and created_at are assigned by the database.
    pub async fn insert(db: &PgPool, new: NewTrip<'_>) -> Result<Trip, AppError> {
        let trip = sqlx::query_as::<_, Trip>(&format!(
            "INSERT INTO trips (user_id, origin, destination, travel_mode, vehicle_id,
                                distance_km, duration_seconds, emissions_co2e_kg,
                                saved_emissions_co2e_kg, cost_nok, saved_cost_nok)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {TRIP_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.origin)
        .bind(new.destination)
        .bind(new.travel_mode)
        .bind(new.vehicle_id)
        .bind(new.distance_km)
        .bind(new.duration_seconds)
        .bind(new.emissions_co2e_kg)
        .bind(new.saved_emissions_co2e_kg)
        .bind(new.cost_nok)
        .bind(new.saved_cost_nok)
        .fetch_one(db)
        .await?;
        Ok(trip)
    }

    /// One page of a user's trips, newest first.
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Trip>, AppError> {
        let rows = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// The user's full ledger, for statistics aggregation.
    pub async fn list_all_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Trip>, AppError> {
        let rows = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Every trip in the system, for the admin summary.
    pub async fn list_all(db: &PgPool) -> Result<Vec<Trip>, AppError> {
        let rows = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn count(db: &PgPool) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trips")
            .fetch_one(db)
            .await?;
        Ok(count)
    }
}
