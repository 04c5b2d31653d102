//! Middlewares for routes.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::AppState;
use crate::error::{Result, ServerError};

const BEARER: &str = "Bearer ";
const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Authenticated user behind the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
}

/// Pull the raw token from `Authorization: Bearer` or the access token cookie.
fn access_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

/// Custom middleware for authentification.
pub async fn auth(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response> {
    let token = access_token(req.headers()).ok_or(ServerError::Unauthorized)?;
    let id = state.token.decode(token)?.user_id()?;

    if state.db.users.find_by_id(id).await?.is_none() {
        tracing::debug!(user_id = %id, "token subject has no marketplace account");
        return Err(ServerError::Unauthorized);
    }

    req.extensions_mut().insert(Caller { id });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_access_token_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(access_token(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=abc.def.ghi"),
        );
        assert_eq!(access_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer jkl.mno.pqr"));
        assert_eq!(access_token(&headers), Some("jkl.mno.pqr"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(access_token(&headers), Some("abc.def.ghi"));
    }
}
