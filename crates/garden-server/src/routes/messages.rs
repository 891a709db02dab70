use super::{now_timestamp, parse_body, SharedStore};
use crate::error::{ApiError, Context};
use crate::store::InsertEvent;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream};
use garden_core::constants::{
    MESSAGES_DEFAULT_LIMIT, MESSAGES_MAX_LIMIT, MESSAGE_TEXT_MAX, USER_FIELD_MAX,
};
use garden_core::text::{sanitize_optional, sanitize_required};
use garden_core::{MessageEnvelope, MessageRecord, MessagesEnvelope, NewMessage};
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
}

/// Requested page size: default when absent or unparseable, otherwise clamped.
pub fn parse_limit(raw: Option<&str>) -> usize {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) => n.clamp(1, MESSAGES_MAX_LIMIT as i64) as usize,
        None => MESSAGES_DEFAULT_LIMIT,
    }
}

pub async fn list(
    State(store): State<SharedStore>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MessagesEnvelope>, ApiError> {
    let limit = parse_limit(query.limit.as_deref());
    let messages = store
        .list_recent_messages(limit)
        .ctx("GET /api/messages")?;
    Ok(Json(MessagesEnvelope { ok: true, messages }))
}

pub async fn create(
    State(store): State<SharedStore>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageEnvelope>), ApiError> {
    const CTX: &str = "POST /api/messages";
    let input: NewMessage = parse_body(CTX, &body)?;
    let row = MessageRecord {
        id: Uuid::new_v4().to_string(),
        text: sanitize_required("text", &input.text, MESSAGE_TEXT_MAX).ctx(CTX)?,
        user_id: sanitize_optional("user_id", input.user_id.as_deref(), USER_FIELD_MAX).ctx(CTX)?,
        user_name: sanitize_optional("user_name", input.user_name.as_deref(), USER_FIELD_MAX)
            .ctx(CTX)?,
        created_at: now_timestamp(),
    };
    let message = store.insert_message(row).ctx(CTX)?;
    Ok((StatusCode::CREATED, Json(MessageEnvelope { ok: true, message })))
}

/// One `message` event per inserted message row.
pub async fn stream(
    State(store): State<SharedStore>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = store.subscribe_inserts();
    log::info!("[messages] realtime subscriber connected");
    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(InsertEvent::Messages(row)) => {
                    match Event::default().event("message").json_data(&row) {
                        Ok(event) => return Some((Ok(event), rx)),
                        Err(e) => {
                            log::warn!("[messages] dropping unencodable row {}: {e}", row.id)
                        }
                    }
                }
                Ok(InsertEvent::Flowers(_)) => {}
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("[messages] realtime subscriber lagged, skipped {skipped}");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}
