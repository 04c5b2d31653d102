//! Items-related HTTP API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::item::{Category, Item, ItemChanges, NewItem};
use crate::middleware::Caller;
use crate::router::{Valid, amount, image_urls, reviews};

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct CreateBody {
    #[validate(length(min = 1, max = 120, message = "Name must be 1 to 120 characters long."))]
    name: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters long."))]
    description: Option<String>,
    #[validate(custom(function = "amount"))]
    price: Decimal,
    category: Category,
    #[serde(default)]
    #[validate(custom(function = "image_urls"))]
    images: Vec<String>,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct UpdateBody {
    #[validate(length(min = 1, max = 120, message = "Name must be 1 to 120 characters long."))]
    name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters long."))]
    description: Option<String>,
    #[validate(custom(function = "amount"))]
    price: Option<Decimal>,
    #[validate(custom(function = "image_urls"))]
    images: Option<Vec<String>>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(by_id).patch(update).delete(remove))
        // `POST /items/{id}/review` and `/reviews` both append a review.
        .route("/{id}/review", post(reviews::add_item))
        .route("/{id}/reviews", get(reviews::list_item).post(reviews::add_item))
}

async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<CreateBody>,
) -> Result<(StatusCode, Json<Item>)> {
    let item = state
        .items
        .create(caller.id, NewItem {
            name: body.name,
            description: body.description,
            price: body.price,
            category: body.category,
            images: body.images,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

async fn by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Item>> {
    Ok(Json(state.items.get(id).await?))
}

async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Valid(body): Valid<UpdateBody>,
) -> Result<Json<Item>> {
    let changes = ItemChanges {
        name: body.name,
        description: body.description,
        price: body.price,
        images: body.images,
    };

    Ok(Json(state.items.update(caller.id, id, changes).await?))
}

async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.items.delete(caller.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
