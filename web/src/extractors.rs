//! Extractors for widget requests.
//!
//! - [`W2Query`]: the JSON document w2ui sends in the `request` query parameter
//!   (grid records, form load, dropdown search)
//! - [`W2Json`]: a JSON request body (grid save/remove/reorder, form save)
//!
//! Both reject with a 400 error envelope instead of axum's plain-text rejections.
//!
//! # Examples
//!
//! ```ignore
//! use w2kit_web::{AppError, W2Json, W2Query};
//!
//! async fn records(
//!     W2Query(request): W2Query<GridRequest>,
//! ) -> Result<Json<GridResponse<Todo>>, AppError> { ... }
//!
//! async fn remove(
//!     W2Json(request): W2Json<RemoveGridRequest>,
//! ) -> Result<Json<BaseResponse>, AppError> { ... }
//! ```

use crate::error::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use w2kit_core::{ProtocolError, protocol::parse_request};

/// Name of the query parameter carrying the widget's JSON request.
pub const REQUEST_PARAM: &str = "request";

#[derive(Debug, Deserialize)]
struct RequestParam {
    request: Option<String>,
}

/// A request decoded from the `request` query parameter.
#[derive(Debug, Clone)]
pub struct W2Query<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for W2Query<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(param) = Query::<RequestParam>::try_from_uri(&parts.uri)
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        let request = param.request.ok_or(ProtocolError::MissingRequest)?;
        Ok(Self(parse_request(&request)?))
    }
}

/// A request decoded from a JSON body.
///
/// The `Content-Type` header is not checked; w2ui posts JSON with whatever
/// header the page's fetch defaults produce.
#[derive(Debug, Clone)]
pub struct W2Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for W2Json<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::new(rejection.status(), rejection.body_text()))?;

        let value = serde_json::from_slice(&body).map_err(ProtocolError::from)?;
        Ok(Self(value))
    }
}
