mod aggregate;
mod repository;
mod service;

pub use aggregate::*;
pub use repository::*;
pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entity a review is written about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReviewSubject {
    /// A user acting as a seller.
    Seller(Uuid),
    Item(Uuid),
}

impl ReviewSubject {
    pub fn id(&self) -> Uuid {
        match self {
            ReviewSubject::Seller(id) | ReviewSubject::Item(id) => *id,
        }
    }

    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ReviewSubject::Seller(_) => "seller",
            ReviewSubject::Item(_) => "item",
        }
    }
}

/// Review as saved on database. Reviews are append-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(reviewer_id: Uuid, rating: Rating, comment: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reviewer_id,
            rating: rating.get(),
            comment,
            created_at: Utc::now(),
        }
    }
}
