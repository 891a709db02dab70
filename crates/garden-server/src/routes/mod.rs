pub mod flowers;
pub mod messages;

use crate::error::ApiError;
use crate::store::GardenStore;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use garden_core::ValidationError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub type SharedStore = Arc<dyn GardenStore>;

#[derive(Serialize)]
pub struct Health {
    pub ok: bool,
}

pub async fn healthz() -> Json<Health> {
    Json(Health { ok: true })
}

/// Response middleware: nothing served here may be cached.
pub async fn no_store(mut res: Response) -> Response {
    res.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    res
}

/// JSON body or its `Default` when the body is empty.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(
    context: &'static str,
    body: &[u8],
) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest {
        context,
        message: format!("invalid JSON body ({e})"),
    })
}

pub(crate) fn parse_flower_id(context: &'static str, raw: &str) -> Result<String, ApiError> {
    match Uuid::parse_str(raw) {
        Ok(id) => Ok(id.to_string()),
        Err(_) => Err(ApiError::Validation {
            context,
            source: ValidationError::InvalidId {
                field: "id",
                value: raw.to_string(),
            },
        }),
    }
}

/// Server clock as an RFC 3339 UTC timestamp with millisecond precision.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
