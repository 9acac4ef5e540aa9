use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmeticCategory {
    Border,
    ProfilePicture,
}

impl CosmeticCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            CosmeticCategory::Border => "border",
            CosmeticCategory::ProfilePicture => "profile_picture",
        }
    }

    /// Column on users holding the equipped cosmetic of this category.
    pub fn equipped_column(self) -> &'static str {
        match self {
            CosmeticCategory::Border => "equipped_border_id",
            CosmeticCategory::ProfilePicture => "equipped_profile_picture_id",
        }
    }
}

impl FromStr for CosmeticCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "border" => Ok(CosmeticCategory::Border),
            "profile_picture" => Ok(CosmeticCategory::ProfilePicture),
            other => Err(format!("unknown cosmetic category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cosmetic {
    pub id: Uuid,
    pub name: String,
    pub price_points: i32,
    pub description: String,
    pub image: String,
    pub category: String,
}

const COSMETIC_COLUMNS: &str = "id, name, price_points, description, image, category";

impl Cosmetic {
    pub fn category(&self) -> Result<CosmeticCategory, AppError> {
        self.category
            .parse()
            .map_err(|e: String| AppError::Validation(e))
    }

    pub async fn list_all(db: &PgPool) -> Result<Vec<Cosmetic>, AppError> {
        let rows = sqlx::query_as::<_, Cosmetic>(&format!(
            "SELECT {COSMETIC_COLUMNS} FROM cosmetics ORDER BY price_points, name"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_name(db: &PgPool, name: &str) -> Result<Option<Cosmetic>, AppError> {
        let cosmetic = sqlx::query_as::<_, Cosmetic>(&format!(
            "SELECT {COSMETIC_COLUMNS} FROM cosmetics WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(cosmetic)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Cosmetic>, AppError> {
        let cosmetic = sqlx::query_as::<_, Cosmetic>(&format!(
            "SELECT {COSMETIC_COLUMNS} FROM cosmetics WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(cosmetic)
    }

    /// Cosmetics the user owns, in shop order.
    pub async fn inventory(db: &PgPool, user_id: Uuid) -> Result<Vec<Cosmetic>, AppError> {
        let rows = sqlx::query_as::<_, Cosmetic>(
            "SELECT c.id, c.name, c.price_points, c.description, c.image, c.category
             FROM cosmetics c
             JOIN user_cosmetics uc ON uc.cosmetic_id = c.id
             WHERE uc.user_id = $1
             ORDER BY c.price_points, c.name",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn is_owned(db: &PgPool, user_id: Uuid, cosmetic_id: Uuid) -> Result<bool, AppError> {
        let (owned,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM user_cosmetics WHERE user_id = $1 AND cosmetic_id = $2)",
        )
        .bind(user_id)
        .bind(cosmetic_id)
        .fetch_one(db)
        .await?;
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        assert_eq!(
            "border".parse::<CosmeticCategory>().unwrap(),
            CosmeticCategory::Border
        );
        assert_eq!(
            "profile_picture".parse::<CosmeticCategory>().unwrap(),
            CosmeticCategory::ProfilePicture
        );
        assert!("hat".parse::<CosmeticCategory>().is_err());
    }

    #[test]
    fn categories_equip_into_distinct_columns() {
        assert_ne!(
            CosmeticCategory::Border.equipped_column(),
            CosmeticCategory::ProfilePicture.equipped_column()
        );
    }
}
