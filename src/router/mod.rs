//! HTTP handlers.
pub mod cart;
pub mod items;
pub mod orders;
pub mod reviews;
pub mod status;
pub mod users;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::ServerError;
use crate::money::is_valid_amount;

const MAX_IMAGES: usize = 10;

/// JSON body checked with [`validator`] before reaching the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Money amounts must fit a `NUMERIC(12, 2)` column and be strictly positive.
pub(crate) fn amount(value: &Decimal) -> Result<(), ValidationError> {
    if is_valid_amount(value) {
        Ok(())
    } else {
        Err(ValidationError::new("range").with_message(
            "Amount must be between 0.01 and 9999999999.99 with at most 2 decimals.".into(),
        ))
    }
}

/// Item pictures are absolute http(s) links.
pub(crate) fn image_urls(images: &[String]) -> Result<(), ValidationError> {
    if images.len() > MAX_IMAGES {
        return Err(ValidationError::new("length")
            .with_message(format!("At most {MAX_IMAGES} images are allowed.").into()));
    }

    let valid = images.iter().all(|image| {
        url::Url::parse(image).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    });
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Images must be http(s) URLs.".into()))
    }
}
