//! Orders-related HTTP API.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Result, ServerError};
use crate::middleware::Caller;
use crate::order::{LineRequest, Order, OrderStatus, OrderView, PlacedOrder};
use crate::pagination::{Page, PageQuery, SortOrder};
use crate::router::{Valid, amount};
use crate::AppState;

const DEFAULT_LIMIT: u64 = 10;

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBody {
    items: Vec<LineRequest>,
    #[validate(custom(function = "amount"))]
    total_amount: Option<Decimal>,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[validate(custom(function = "amount"))]
    total_amount: Option<Decimal>,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpBody {
    order_id: Uuid,
    #[validate(length(min = 1, message = "OTP is required."))]
    otp: String,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    order_id: Uuid,
    delivery_person_id: Uuid,
}

/// Seller listing query: pagination plus an optional `?status=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct SellerQuery {
    status: Option<OrderStatus>,
    page: Option<u64>,
    limit: Option<u64>,
    order: Option<SortOrder>,
}

impl SellerQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
            order: self.order,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /orders` places an order.
        .route("/", post(place))
        .route("/checkout", post(checkout))
        .route("/my-orders", get(my_orders))
        .route("/buyer/{id}", get(as_buyer))
        .route("/seller/{id}", get(as_seller))
        .route("/deliver", get(to_deliver))
        .route("/close", post(close))
        .route("/verify-delivery", post(verify_delivery))
        .route("/assign-delivery", post(assign_delivery))
        .route("/{id}", get(by_id))
}

async fn place(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<PlaceBody>,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let placed = state
        .orders
        .place_order(caller.id, body.items, body.total_amount)
        .await?;

    Ok((StatusCode::CREATED, Json(placed)))
}

async fn checkout(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<CheckoutBody>,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let placed = state.orders.checkout(caller.id, body.total_amount).await?;

    Ok((StatusCode::CREATED, Json(placed)))
}

async fn my_orders(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<OrderView>>> {
    let page = query.with_defaults(DEFAULT_LIMIT, SortOrder::Newest);
    let orders = state.orders.visible_to(caller.id, page).await?;
    Ok(Json(state.orders.populate(orders).await?))
}

async fn by_id(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderView>> {
    let order = state.orders.find_visible(caller.id, id).await?;
    Ok(Json(state.orders.populate_one(order).await?))
}

async fn as_buyer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<OrderView>>> {
    if id != caller.id {
        return Err(ServerError::Forbidden("Cannot list orders of another buyer."));
    }

    let page = query.with_defaults(DEFAULT_LIMIT, SortOrder::Newest);
    let orders = state.orders.as_buyer(caller.id, page).await?;
    Ok(Json(state.orders.populate(orders).await?))
}

async fn as_seller(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Query(query): Query<SellerQuery>,
) -> Result<Json<Page<OrderView>>> {
    if id != caller.id {
        return Err(ServerError::Forbidden("Cannot list orders of another seller."));
    }

    let page = query.page().with_defaults(DEFAULT_LIMIT, SortOrder::Newest);
    let orders = state.orders.for_seller(caller.id, query.status, page).await?;
    Ok(Json(state.orders.populate(orders).await?))
}

/// Pending orders containing the caller's items.
async fn to_deliver(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<OrderView>>> {
    let page = query.with_defaults(DEFAULT_LIMIT, SortOrder::Newest);
    let orders = state
        .orders
        .for_seller(caller.id, Some(OrderStatus::Pending), page)
        .await?;
    Ok(Json(state.orders.populate(orders).await?))
}

async fn close(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<OtpBody>,
) -> Result<Json<Order>> {
    let order = state
        .orders
        .close_order(caller.id, body.order_id, &body.otp)
        .await?;

    Ok(Json(order))
}

async fn verify_delivery(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<OtpBody>,
) -> Result<Json<Order>> {
    let order = state
        .orders
        .verify_and_deliver(caller.id, body.order_id, &body.otp)
        .await?;

    Ok(Json(order))
}

async fn assign_delivery(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Valid(body): Valid<AssignBody>,
) -> Result<Json<Order>> {
    let order = state
        .orders
        .assign_delivery(caller.id, body.order_id, body.delivery_person_id)
        .await?;

    Ok(Json(order))
}
