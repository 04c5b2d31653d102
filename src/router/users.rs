//! Users-related HTTP API.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::user::User;
use crate::AppState;
use crate::middleware::Caller;

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /users/@me` goes to `me`.
        .route("/@me", get(me))
        // `GET /users/{id}` goes to `get`.
        .route("/{id}", get(by_id))
}

/// Public seller profile with rating summary.
async fn by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<User>> {
    state
        .db
        .users
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or(ServerError::NotFound("User not found."))
}

async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<User>> {
    by_id(State(state), Path(caller.id)).await
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;

    use crate::*;

    #[tokio::test]
    async fn test_get_user_handler() {
        let state = test_state();
        let seller = test_user(&state, "seller").await;
        let token = state.token.create(seller).unwrap();

        for path in [format!("/users/{seller}"), "/users/@me".to_owned()] {
            let response =
                make_request(Some(&token), app(state.clone()), Method::GET, &path, String::default())
                    .await;
            assert_eq!(response.status(), StatusCode::OK);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let body: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body["id"], seller.to_string());
            assert_eq!(body["averageRating"], 0.0);
            assert!(body.get("email").is_none());
        }

        let path = format!("/users/{}", uuid::Uuid::new_v4());
        let response =
            make_request(Some(&token), app(state), Method::GET, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
