use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::pagination::{Page, PageRequest};
use crate::review::{Rating, RatingSummary, Review, ReviewRepository, ReviewSubject};

/// Outcome of a review submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReceipt {
    pub review: Review,
    #[serde(flatten)]
    pub summary: RatingSummary,
}

/// Review manager.
#[derive(Clone)]
pub struct ReviewService {
    repo: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    /// Create a new [`ReviewService`].
    pub fn new(repo: Arc<dyn ReviewRepository>) -> Self {
        Self { repo }
    }

    /// Append a review to a seller or an item and refresh its rating.
    ///
    /// A reviewer may review the same subject more than once.
    pub async fn append_review(
        &self,
        subject: ReviewSubject,
        reviewer_id: Uuid,
        rating: i64,
        comment: Option<String>,
    ) -> Result<ReviewReceipt> {
        let rating = Rating::try_from(rating)?;
        let comment = comment
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        let review = Review::new(reviewer_id, rating, comment);

        let Some(aggregate) = self.repo.append(subject, &review).await? else {
            return Err(not_found(subject));
        };

        metrics::counter!("reviews_total", "subject" => subject.kind()).increment(1);
        tracing::info!(
            subject = subject.kind(),
            subject_id = %subject.id(),
            %reviewer_id,
            rating = rating.get(),
            total_reviews = aggregate.total_reviews,
            "review appended"
        );

        Ok(ReviewReceipt {
            review,
            summary: aggregate.summary(),
        })
    }

    /// List reviews of a subject, oldest first unless asked otherwise.
    pub async fn list_reviews(
        &self,
        subject: ReviewSubject,
        page: PageRequest,
    ) -> Result<Page<Review>> {
        let Some((reviews, total)) = self.repo.list(subject, &page).await? else {
            return Err(not_found(subject));
        };

        Ok(Page::new(reviews, total, &page))
    }
}

fn not_found(subject: ReviewSubject) -> ServerError {
    match subject {
        ReviewSubject::Seller(_) => ServerError::NotFound("Seller not found."),
        ReviewSubject::Item(_) => ServerError::NotFound("Item not found."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::tests::{seed_item, seed_user};
    use crate::pagination::SortOrder;

    fn service(store: &Arc<MemoryStore>) -> ReviewService {
        ReviewService::new(store.clone())
    }

    #[tokio::test]
    async fn test_item_average() {
        let store = Arc::new(MemoryStore::default());
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 100).await;
        let reviews = service(&store);

        reviews
            .append_review(ReviewSubject::Item(item.id), Uuid::new_v4(), 5, Some("great".into()))
            .await
            .unwrap();
        let receipt = reviews
            .append_review(ReviewSubject::Item(item.id), Uuid::new_v4(), 3, None)
            .await
            .unwrap();

        assert_eq!(receipt.summary.average_rating, 4.0);
        assert_eq!(receipt.summary.total_reviews, 2);

        let stored = store.item(item.id).unwrap();
        assert_eq!(stored.average_rating, 4.0);
        assert_eq!(stored.total_reviews, 2);
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let store = Arc::new(MemoryStore::default());
        let seller = seed_user(&store, "seller").await;
        let reviews = service(&store);

        for rating in [0, 6] {
            let err = reviews
                .append_review(ReviewSubject::Seller(seller.id), Uuid::new_v4(), rating, None)
                .await
                .unwrap_err();
            assert!(matches!(err, ServerError::Validation(_)));
        }

        let stored = store.user(seller.id).unwrap();
        assert_eq!(stored.total_reviews, 0);
        assert_eq!(stored.average_rating, 0.0);
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let store = Arc::new(MemoryStore::default());
        let reviews = service(&store);

        let err = reviews
            .append_review(ReviewSubject::Item(Uuid::new_v4()), Uuid::new_v4(), 4, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));

        let err = reviews
            .list_reviews(ReviewSubject::Seller(Uuid::new_v4()), PageRequest::new(1, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_seller_reviews_pages() {
        let store = Arc::new(MemoryStore::default());
        let seller = seed_user(&store, "seller").await;
        let reviewer = Uuid::new_v4();
        let reviews = service(&store);

        for rating in [1, 2, 3, 4, 5, 5, 5] {
            reviews
                .append_review(ReviewSubject::Seller(seller.id), reviewer, rating, None)
                .await
                .unwrap();
        }

        let page = reviews
            .list_reviews(
                ReviewSubject::Seller(seller.id),
                PageRequest::new(1, 5).order(SortOrder::Oldest),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 2);
        assert_eq!(
            page.data.iter().map(|r| r.rating).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );

        let page = reviews
            .list_reviews(
                ReviewSubject::Seller(seller.id),
                PageRequest::new(1, 2).order(SortOrder::Newest),
            )
            .await
            .unwrap();
        assert_eq!(page.data.iter().map(|r| r.rating).collect::<Vec<_>>(), vec![5, 5]);

        let stored = store.user(seller.id).unwrap();
        assert_eq!(stored.total_reviews, 7);
        assert_eq!(stored.average_rating, 25.0 / 7.0);
    }

    #[tokio::test]
    async fn test_concurrent_reviews_are_not_lost() {
        let store = Arc::new(MemoryStore::default());
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 100).await;
        let reviews = service(&store);

        let tasks = (0..32).map(|n| {
            let reviews = reviews.clone();
            tokio::spawn(async move {
                reviews
                    .append_review(ReviewSubject::Item(item.id), Uuid::new_v4(), 1 + n % 5, None)
                    .await
            })
        });
        for task in tasks.collect::<Vec<_>>() {
            task.await.unwrap().unwrap();
        }

        let stored = store.item(item.id).unwrap();
        assert_eq!(stored.total_reviews, 32);
        let sum: i64 = (0..32).map(|n| 1 + n % 5).sum();
        assert_eq!(stored.average_rating, sum as f64 / 32.0);
    }
}
