//! Reviews-related HTTP API, for sellers and items.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::middleware::Caller;
use crate::pagination::{Page, PageQuery, SortOrder};
use crate::review::{Review, ReviewReceipt, ReviewSubject};
use crate::router::Valid;

const ITEM_LIMIT: u64 = 5;
const SELLER_LIMIT: u64 = 10;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    rating: i64,
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters long."))]
    comment: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /reviews/seller/{id}` reviews a seller.
        .route("/seller/{id}", get(list_seller).post(add_seller))
}

async fn append(
    state: &AppState,
    subject: ReviewSubject,
    caller: Caller,
    body: Body,
) -> Result<(StatusCode, Json<ReviewReceipt>)> {
    let receipt = state
        .reviews
        .append_review(subject, caller.id, body.rating, body.comment)
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn add_seller(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<ReviewReceipt>)> {
    append(&state, ReviewSubject::Seller(id), caller, body).await
}

async fn list_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Review>>> {
    let page = query.with_defaults(SELLER_LIMIT, SortOrder::Oldest);
    Ok(Json(
        state
            .reviews
            .list_reviews(ReviewSubject::Seller(id), page)
            .await?,
    ))
}

pub(super) async fn add_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<ReviewReceipt>)> {
    append(&state, ReviewSubject::Item(id), caller, body).await
}

pub(super) async fn list_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Review>>> {
    let page = query.with_defaults(ITEM_LIMIT, SortOrder::Oldest);
    Ok(Json(
        state
            .reviews
            .list_reviews(ReviewSubject::Item(id), page)
            .await?,
    ))
}
