//! Cart-related HTTP API. Every route acts on the caller's own cart.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::middleware::Caller;
use crate::router::Valid;
use crate::user::{CartEntry, CartView};

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBody {
    item_id: Uuid,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 10000, message = "Quantity must be between 1 and 10000."))]
    quantity: i32,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct QuantityBody {
    #[validate(range(min = 1, max = 10000, message = "Quantity must be between 1 and 10000."))]
    quantity: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Count {
    count: usize,
}

fn one() -> i32 {
    1
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view).post(add).delete(clear))
        .route("/count", get(count))
        .route("/{item_id}", put(set_quantity).delete(remove))
}

async fn view(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<CartView>> {
    Ok(Json(state.cart.view(caller.id).await?))
}

async fn count(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Count>> {
    let count = state.cart.count(caller.id).await?;
    Ok(Json(Count { count }))
}

async fn add(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<AddBody>,
) -> Result<Json<Vec<CartEntry>>> {
    Ok(Json(
        state.cart.add(caller.id, body.item_id, body.quantity).await?,
    ))
}

async fn set_quantity(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(item_id): Path<Uuid>,
    Valid(body): Valid<QuantityBody>,
) -> Result<Json<Vec<CartEntry>>> {
    Ok(Json(
        state
            .cart
            .set_quantity(caller.id, item_id, body.quantity)
            .await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Vec<CartEntry>>> {
    Ok(Json(state.cart.remove(caller.id, item_id).await?))
}

async fn clear(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<StatusCode> {
    state.cart.clear(caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
