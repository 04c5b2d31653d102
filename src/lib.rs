//! Campus marketplace order lifecycle, delivery verification and reviews.

#![forbid(unsafe_code)]
#![deny(unused_mut)]
pub mod config;
mod crypto;
mod database;
pub mod error;
mod item;
mod middleware;
mod money;
mod order;
mod pagination;
mod review;
mod router;
pub mod telemetry;
mod token;
mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use error::ServerError;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

const BODY_LIMIT: usize = 16 * 1024;
const ACCESS_TOKEN_SECRET: &str = "ACCESS_TOKEN_SECRET";

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    token: Option<&str>,
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// In-memory state with a cheap bcrypt cost.
#[cfg(test)]
pub fn test_state() -> AppState {
    let config = Arc::new(config::Configuration::default());
    build_state(
        config,
        database::Database::memory(),
        token::TokenManager::new("https://market.campus.test", b"test-secret"),
        4,
        None,
    )
}

#[cfg(test)]
pub async fn test_user(state: &AppState, name: &str) -> uuid::Uuid {
    let user = user::User {
        id: uuid::Uuid::new_v4(),
        first_name: name.to_owned(),
        last_name: "Test".to_owned(),
        email: format!("{name}@campus.test"),
        created_at: chrono::Utc::now(),
        ..Default::default()
    };
    state.db.users.insert(&user).await.unwrap();
    user.id
}

#[cfg(test)]
pub async fn test_item(state: &AppState, seller_id: uuid::Uuid, price: i64) -> uuid::Uuid {
    state
        .items
        .create(seller_id, item::NewItem {
            name: format!("item {price}"),
            description: None,
            price: rust_decimal::Decimal::from(price),
            category: item::Category::Other,
            images: Vec::new(),
        })
        .await
        .unwrap()
        .id
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub token: token::TokenManager,
    pub orders: order::OrderService,
    pub reviews: review::ReviewService,
    pub items: item::ItemService,
    pub cart: user::CartService,
    pub metrics: Option<PrometheusHandle>,
}

fn build_state(
    config: Arc<config::Configuration>,
    db: database::Database,
    token: token::TokenManager,
    otp_cost: u32,
    metrics: Option<PrometheusHandle>,
) -> AppState {
    let hasher = crypto::OtpHasher::new(otp_cost);

    AppState {
        orders: order::OrderService::new(
            db.orders.clone(),
            db.items.clone(),
            db.users.clone(),
            hasher,
        ),
        reviews: review::ReviewService::new(db.reviews.clone()),
        items: item::ItemService::new(db.items.clone()),
        cart: user::CartService::new(db.users.clone(), db.items.clone()),
        config,
        db,
        token,
        metrics,
    }
}

fn cors(config: &config::Configuration) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    match config
        .frontend_url
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        // Credentialed requests need an exact origin.
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
            .vary([header::AUTHORIZATION]),
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(cors(&state.config));

    let protected = Router::new()
        .nest("/orders", router::orders::router())
        .nest("/items", router::items::router())
        .nest("/reviews", router::reviews::router())
        .nest("/cart", router::cart::router())
        .nest("/users", router::users::router())
        .route_layer(AxumMiddleware::from_fn_with_state(
            state.clone(),
            middleware::auth,
        ));

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        .route("/metrics", get(router::status::metrics))
        .merge(protected)
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    // read configuration file.  let it in memory.
    let config = config::Configuration::default()
        .path(std::env::var("CONFIG_PATH").unwrap_or_default().into())
        .read()?;

    let db = match config.postgres {
        Some(ref config) => {
            database::Database::postgres(
                &config.address,
                config
                    .username
                    .as_deref()
                    .unwrap_or(database::DEFAULT_CREDENTIALS),
                config
                    .password
                    .as_deref()
                    .unwrap_or(database::DEFAULT_CREDENTIALS),
                config
                    .database
                    .as_deref()
                    .unwrap_or(database::DEFAULT_DATABASE_NAME),
                config.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::warn!("missing `postgres` entry on `config.yaml` file, data is kept in memory");
            database::Database::memory()
        },
    };

    // handle jwt.
    let secret = config
        .token
        .as_ref()
        .and_then(|token| token.secret.clone())
        .or_else(|| std::env::var(ACCESS_TOKEN_SECRET).ok())
        .filter(|secret| !secret.is_empty())
        .ok_or("missing `token.secret` entry or `ACCESS_TOKEN_SECRET` environment variable")?;
    let mut token = token::TokenManager::new(&config.url, secret.as_bytes());

    if let Some(audience) = config.token.as_ref().and_then(|t| t.audience.as_ref()) {
        token.audience(audience);
    }

    let otp_cost = config.otp.cost;
    Ok(build_state(config, db, token, otp_cost, metrics))
}
