//! Rating aggregation shared by sellers and items.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Integer rating in `[1, 5]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ServerError;

    fn try_from(value: i64) -> Result<Self> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value as i32))
        } else {
            Err(ServerError::field(
                "rating",
                "range",
                "Rating must be between 1 and 5.",
            ))
        }
    }
}

/// Running count and sum of every rating received.
///
/// `average_rating` and `total_reviews` stored on users and items are always
/// derived from this value and never written on their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub total_reviews: i64,
    pub rating_sum: i64,
}

impl RatingAggregate {
    /// Account for one more rating.
    pub fn push(&mut self, rating: Rating) {
        self.total_reviews += 1;
        self.rating_sum += i64::from(rating.get());
    }

    /// Mean rating, `0` when nothing was rated yet.
    pub fn average(&self) -> f64 {
        if self.total_reviews == 0 {
            0.0
        } else {
            self.rating_sum as f64 / self.total_reviews as f64
        }
    }

    pub fn summary(&self) -> RatingSummary {
        RatingSummary {
            average_rating: self.average(),
            total_reviews: self.total_reviews,
        }
    }
}

/// Public view of an aggregate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: i64,
}
