//! Extractors that reject with the JSON error shape instead of axum's plain text.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error_responses::AppError;

/// JSON body parsed regardless of `Content-Type`; an empty or malformed body is a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            debug!(%rejection, "extractors: failed to read request body");
            AppError::BadRequest("Invalid request body".to_string())
        })?;

        serde_json::from_slice::<T>(&bytes)
            .map(JsonBody)
            .map_err(|err| {
                debug!(error = %err, "extractors: request body is not valid JSON");
                AppError::BadRequest("Invalid request body".to_string())
            })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Query<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map(|query| Query(query.0))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }
}
