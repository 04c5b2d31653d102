//! Review persistence port.

use async_trait::async_trait;

use crate::error::Result;
use crate::pagination::PageRequest;
use crate::review::{RatingAggregate, Review, ReviewSubject};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Append a review and fold it into the subject aggregate atomically.
    ///
    /// Returns `None` when the subject does not exist.
    async fn append(
        &self,
        subject: ReviewSubject,
        review: &Review,
    ) -> Result<Option<RatingAggregate>>;

    /// One page of reviews plus the subject review count.
    ///
    /// Returns `None` when the subject does not exist.
    async fn list(
        &self,
        subject: ReviewSubject,
        page: &PageRequest,
    ) -> Result<Option<(Vec<Review>, u64)>>;
}
