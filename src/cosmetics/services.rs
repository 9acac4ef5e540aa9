use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::cosmetics::repo::Cosmetic;
use crate::error::AppError;

/// Buy a cosmetic by name: checks ownership and balance, deducts the price
/// and records ownership in one transaction. The balance read takes a row
/// lock so two concurrent purchases cannot both spend the same points.
pub async fn purchase(db: &PgPool, user_id: Uuid, name: &str) -> Result<Cosmetic, AppError> {
    let cosmetic = Cosmetic::find_by_name(db, name)
        .await?
        .ok_or_else(|| AppError::NotFound("cosmetic".into()))?;

    let mut tx = db.begin().await?;

    let (points,): (i32,) = sqlx::query_as("SELECT points FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    let (owned,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM user_cosmetics WHERE user_id = $1 AND cosmetic_id = $2)",
    )
    .bind(user_id)
    .bind(cosmetic.id)
    .fetch_one(&mut *tx)
    .await?;
    if owned {
        return Err(AppError::Validation("cosmetic already owned".into()));
    }
    if points < cosmetic.price_points {
        return Err(AppError::Validation("not enough points".into()));
    }

    sqlx::query("UPDATE users SET points = points - $1 WHERE id = $2")
        .bind(cosmetic.price_points)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO user_cosmetics (user_id, cosmetic_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(cosmetic.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!(user_id = %user_id, cosmetic = %cosmetic.name, price = cosmetic.price_points, "cosmetic purchased");
    Ok(cosmetic)
}

/// Equip an owned cosmetic into the slot of its category, replacing any
/// previous selection.
pub async fn equip(db: &PgPool, user_id: Uuid, cosmetic_id: Uuid) -> Result<Cosmetic, AppError> {
    let cosmetic = Cosmetic::find_by_id(db, cosmetic_id)
        .await?
        .ok_or_else(|| AppError::NotFound("cosmetic".into()))?;

    if !Cosmetic::is_owned(db, user_id, cosmetic.id).await? {
        return Err(AppError::Validation("cosmetic not owned".into()));
    }

    let column = cosmetic.category()?.equipped_column();
    sqlx::query(&format!("UPDATE users SET {column} = $1 WHERE id = $2"))
        .bind(cosmetic.id)
        .bind(user_id)
        .execute(db)
        .await?;

    info!(user_id = %user_id, cosmetic = %cosmetic.name, "cosmetic equipped");
    Ok(cosmetic)
}
