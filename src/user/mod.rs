mod cart;
mod repository;

pub use cart::*;
pub use repository::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::review::RatingAggregate;

/// User as saved on database.
///
/// Credentials live with the authentication service; only the marketplace
/// side of the account is kept here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip)]
    pub email: String,
    #[serde(skip)]
    pub contact_number: String,
    /// Derived from reviews received as a seller.
    pub average_rating: f64,
    pub total_reviews: i64,
    #[serde(skip)]
    pub rating_sum: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
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

/// One cart entry. Unique per item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub item_id: Uuid,
    pub quantity: i32,
}
