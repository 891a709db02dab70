use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garden_core::{ErrorEnvelope, ValidationError};
use thiserror::Error;

/// Handler failure; `context` names the route, e.g. `"POST /api/messages"`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{context}: {source}")]
    Validation {
        context: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("{context}: {message}")]
    BadRequest {
        context: &'static str,
        message: String,
    },
    #[error("{context}: not found")]
    NotFound { context: &'static str },
    #[error("{context}: {message}")]
    Forbidden {
        context: &'static str,
        message: String,
    },
    #[error("{context}: backend unavailable")]
    Backend {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach a route context to a store failure. Policy denials become 403.
    pub fn store(context: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::Denied => Self::Forbidden {
                context,
                message: "write blocked by policy".to_string(),
            },
            source => Self::Backend { context, source },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Backend { source, .. } => log::error!("{self} ({source})"),
            _ => log::warn!("{self}"),
        }
        let body = ErrorEnvelope {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `.ctx("GET /api/flowers")?` on store and validation results.
pub trait Context<T> {
    fn ctx(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> Context<T> for Result<T, ValidationError> {
    fn ctx(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::Validation { context, source })
    }
}

impl<T> Context<T> for Result<T, StoreError> {
    fn ctx(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::store(context, source))
    }
}
