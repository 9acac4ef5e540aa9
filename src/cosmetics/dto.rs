use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cosmetics::repo::Cosmetic;

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticResponse {
    pub id: Uuid,
    pub name: String,
    pub price_points: i32,
    pub description: String,
    pub image: String,
    pub category: String,
}

impl From<Cosmetic> for CosmeticResponse {
    fn from(c: Cosmetic) -> Self {
        Self {
            id: c.id,
            name: c.name,
            price_points: c.price_points,
            description: c.description,
            image: c.image,
            category: c.category,
        }
    }
}
