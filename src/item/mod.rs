mod repository;
mod service;

pub use repository::*;
pub use service::*;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::review::RatingAggregate;

/// Fixed set of catalog categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_category")]
pub enum Category {
    Electronics,
    Clothing,
    #[serde(rename = "Home & Garden")]
    #[sqlx(rename = "Home & Garden")]
    HomeAndGarden,
    #[serde(rename = "Sports & Outdoors")]
    #[sqlx(rename = "Sports & Outdoors")]
    SportsAndOutdoors,
    #[serde(rename = "Toys & Games")]
    #[sqlx(rename = "Toys & Games")]
    ToysAndGames,
    #[serde(rename = "Health & Beauty")]
    #[sqlx(rename = "Health & Beauty")]
    HealthAndBeauty,
    Automotive,
    Other,
}

/// Item as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Category,
    pub seller_id: Uuid,
    pub images: Vec<String>,
    /// Derived from item reviews.
    pub average_rating: f64,
    pub total_reviews: i64,
    #[serde(skip)]
    pub rating_sum: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn aggregate(&self) -> RatingAggregate {
        RatingAggregate {
            total_reviews: self.total_reviews,
            rating_sum: self.rating_sum,
        }
    }

    /// Overwrite derived rating fields from an aggregate.
    pub(crate) fn apply(&mut self, aggregate: RatingAggregate) {
        self.total_reviews = aggregate.total_reviews;
        self.rating_sum = aggregate.rating_sum;
        self.average_rating = aggregate.average();
    }
}

/// Fields a seller may change on an [`Item`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub images: Option<Vec<String>>,
}
