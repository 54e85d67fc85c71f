use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::catalog::{CatalogError, ImportError};
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

// Caller mistakes keep their message; serialization failures are ours and get redacted.
impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        let message = value.to_string();
        match value {
            CatalogError::InvalidReference { .. } => {
                AppError::bad_request("INVALID_REFERENCE", &message)
            }
            CatalogError::InvalidLanguage(_) => AppError::bad_request("INVALID_LANGUAGE", &message),
            CatalogError::Validation(_) => AppError::bad_request("VALIDATION_ERROR", &message),
            CatalogError::NotFound { .. } => AppError::not_found(&message),
            CatalogError::Import(inner) => inner.into(),
            CatalogError::Serialization(_) => AppError::internal(&message),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        let code = match value {
            ImportError::InvalidJson(_) => "IMPORT_INVALID_JSON",
            ImportError::MalformedFormat(_) => "IMPORT_MALFORMED",
            ImportError::UnsupportedVersion { .. } => "IMPORT_UNSUPPORTED_VERSION",
        };
        AppError::bad_request(code, &value.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::internal(&value.to_string())
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}
