use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::catalog::LanguageSelector;
use crate::response::AppError;

/// `axum::Json<T>` that rejects with an `AppError` body instead of plain text.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection_to_app_error(rejection)),
        }
    }
}

fn json_rejection_to_app_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            tracing::warn!(error = %e, "JSON data deserialization failed");
            // serde's message names the offending field, which is what an admin needs.
            AppError::bad_request("INVALID_REQUEST_BODY", &e.body_text())
        }
        JsonRejection::MissingJsonContentType(e) => {
            tracing::warn!(error = %e, "Missing or invalid JSON Content-Type");
            AppError::bad_request("INVALID_REQUEST_BODY", "Expected an application/json body")
        }
        other => {
            tracing::warn!(error = %other, "JSON body rejected");
            AppError::bad_request("INVALID_REQUEST_BODY", "Request body is not valid JSON")
        }
    }
}

/// The `?language=` filter. Missing or empty means `all`; anything outside
/// `all | sinhala | tamil | english` is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageFilter(pub LanguageSelector);

#[derive(serde::Deserialize)]
struct LanguageQuery {
    language: Option<String>,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for LanguageFilter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(query) =
            axum::extract::Query::<LanguageQuery>::from_request_parts(parts, state)
                .await
                .map_err(|rejection: QueryRejection| {
                    AppError::bad_request("INVALID_QUERY", &rejection.body_text())
                })?;

        match query.language.as_deref().map(str::trim) {
            None | Some("") => Ok(LanguageFilter(LanguageSelector::All)),
            Some(raw) => raw
                .parse::<LanguageSelector>()
                .map(LanguageFilter)
                .map_err(AppError::from),
        }
    }
}
