use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::routing::TravelMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bicycle,
    ElectricBike,
    ElectricScooter,
    Car,
    Motorcycle,
    ElectricCar,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Bicycle => "bicycle",
            VehicleType::ElectricBike => "electric_bike",
            VehicleType::ElectricScooter => "electric_scooter",
            VehicleType::Car => "car",
            VehicleType::Motorcycle => "motorcycle",
            VehicleType::ElectricCar => "electric_car",
        }
    }

    /// Mode a trip with this vehicle is routed as.
    pub fn travel_mode(self) -> TravelMode {
        match self {
            VehicleType::Bicycle | VehicleType::ElectricBike | VehicleType::ElectricScooter => {
                TravelMode::Bike
            }
            VehicleType::Car | VehicleType::Motorcycle | VehicleType::ElectricCar => {
                TravelMode::Drive
            }
        }
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bicycle" => Ok(VehicleType::Bicycle),
            "electric_bike" => Ok(VehicleType::ElectricBike),
            "electric_scooter" => Ok(VehicleType::ElectricScooter),
            "car" => Ok(VehicleType::Car),
            "motorcycle" => Ok(VehicleType::Motorcycle),
            "electric_car" => Ok(VehicleType::ElectricCar),
            other => Err(format!("unknown vehicle type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub make: String,
    pub model: String,
    pub vehicle_type: String,
    pub year: i32,
    pub emissions_co2e_per_km: f64,
    pub is_default: bool,
    pub created_at: OffsetDateTime,
}

const VEHICLE_COLUMNS: &str =
    "id, owner_id, make, model, vehicle_type, year, emissions_co2e_per_km, is_default, created_at";

impl Vehicle {
    pub fn vehicle_type(&self) -> Result<VehicleType, AppError> {
        self.vehicle_type
            .parse()
            .map_err(|e: String| AppError::Validation(e))
    }

    /// Insert a vehicle. The user's first vehicle becomes the default; the
    /// partial unique index on (owner_id) WHERE is_default backstops the
    /// invariant under concurrent inserts.
    pub async fn insert(
        db: &PgPool,
        owner_id: Uuid,
        make: &str,
        model: &str,
        vehicle_type: VehicleType,
        year: i32,
        emissions_co2e_per_km: f64,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "INSERT INTO vehicles (owner_id, make, model, vehicle_type, year, emissions_co2e_per_km, is_default)
             VALUES ($1, $2, $3, $4, $5, $6,
                     NOT EXISTS (SELECT 1 FROM vehicles WHERE owner_id = $1))
             RETURNING {VEHICLE_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(make)
        .bind(model)
        .bind(vehicle_type.as_str())
        .bind(year)
        .bind(emissions_co2e_per_km)
        .fetch_one(db)
        .await?;
        Ok(vehicle)
    }

    /// All vehicles of one owner, in creation order.
    pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let rows = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE owner_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_owned(
        db: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(db)
        .await?;
        Ok(vehicle)
    }

    pub async fn default_for_owner(
        db: &PgPool,
        owner_id: Uuid,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE owner_id = $1 AND is_default"
        ))
        .bind(owner_id)
        .fetch_optional(db)
        .await?;
        Ok(vehicle)
    }

    /// Move the default flag to the given vehicle. Clear-then-set runs in a
    /// single transaction so no interleaving request observes zero or two
    /// defaults for the owner.
    pub async fn set_default(db: &PgPool, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM vehicles WHERE id = $1 AND owner_id = $2 FOR UPDATE")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("vehicle".into()));
        }

        sqlx::query("UPDATE vehicles SET is_default = FALSE WHERE owner_id = $1 AND is_default")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE vehicles SET is_default = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a vehicle. When the default is deleted and other vehicles
    /// remain, the most-recently-created survivor is promoted in the same
    /// transaction.
    pub async fn delete(db: &PgPool, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        let row: Option<(bool,)> = sqlx::query_as(
            "SELECT is_default FROM vehicles WHERE id = $1 AND owner_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((was_default,)) = row else {
            return Err(AppError::NotFound("vehicle".into()));
        };

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if was_default {
            sqlx::query(
                "UPDATE vehicles SET is_default = TRUE
                 WHERE id = (SELECT id FROM vehicles WHERE owner_id = $1
                             ORDER BY created_at DESC LIMIT 1)",
            )
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_type_round_trips_through_str() {
        for t in [
            VehicleType::Bicycle,
            VehicleType::ElectricBike,
            VehicleType::ElectricScooter,
            VehicleType::Car,
            VehicleType::Motorcycle,
            VehicleType::ElectricCar,
        ] {
            assert_eq!(t.as_str().parse::<VehicleType>().unwrap(), t);
        }
        assert!("hovercraft".parse::<VehicleType>().is_err());
    }

    #[test]
    fn vehicle_type_maps_to_travel_mode() {
        assert_eq!(VehicleType::Bicycle.travel_mode(), TravelMode::Bike);
        assert_eq!(VehicleType::ElectricBike.travel_mode(), TravelMode::Bike);
        assert_eq!(VehicleType::Car.travel_mode(), TravelMode::Drive);
        assert_eq!(VehicleType::Motorcycle.travel_mode(), TravelMode::Drive);
        assert_eq!(VehicleType::ElectricCar.travel_mode(), TravelMode::Drive);
    }
}
