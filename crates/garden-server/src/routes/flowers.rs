use super::{now_timestamp, parse_body, parse_flower_id, SharedStore};
use crate::error::{ApiError, Context};
use crate::store::{FlowerChange, UpdateOutcome};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garden_core::constants::{FLOWERS_LIST_LIMIT, FLOWER_MESSAGE_MAX, USER_FIELD_MAX};
use garden_core::text::sanitize_optional;
use garden_core::{FlowerEnvelope, FlowerPatch, FlowerRecord, FlowersEnvelope, NewFlower};
use uuid::Uuid;

pub async fn list(State(store): State<SharedStore>) -> Result<Json<FlowersEnvelope>, ApiError> {
    let flowers = store
        .list_recent_flowers(FLOWERS_LIST_LIMIT)
        .ctx("GET /api/flowers")?;
    Ok(Json(FlowersEnvelope { ok: true, flowers }))
}

pub async fn create(
    State(store): State<SharedStore>,
    body: Bytes,
) -> Result<(StatusCode, Json<FlowerEnvelope>), ApiError> {
    const CTX: &str = "POST /api/flowers";
    let input: NewFlower = parse_body(CTX, &body)?;

    let row = FlowerRecord {
        id: Uuid::new_v4().to_string(),
        message: sanitize_optional("message", input.message.as_deref(), FLOWER_MESSAGE_MAX)
            .ctx(CTX)?,
        created_at: now_timestamp(),
        revived_at: None,
        wilted: Some(false),
        color: sanitize_optional("color", input.color.as_deref(), USER_FIELD_MAX).ctx(CTX)?,
        x: input.x,
        y: input.y,
        z: input.z,
        user_id: sanitize_optional("user_id", input.user_id.as_deref(), USER_FIELD_MAX).ctx(CTX)?,
        user_name: sanitize_optional("user_name", input.user_name.as_deref(), USER_FIELD_MAX)
            .ctx(CTX)?,
        family: sanitize_optional("family", input.family.as_deref(), USER_FIELD_MAX).ctx(CTX)?,
    };
    let flower = store.insert_flower(row).ctx(CTX)?;
    log::info!("[flowers] planted {}", flower.id);
    Ok((StatusCode::CREATED, Json(FlowerEnvelope { ok: true, flower })))
}

pub async fn update(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<FlowerEnvelope>, ApiError> {
    const CTX: &str = "PATCH /api/flowers/{id}";
    let id = parse_flower_id(CTX, &id)?;
    let patch: FlowerPatch = parse_body(CTX, &body)?;
    let message =
        sanitize_optional("message", patch.message.as_deref(), FLOWER_MESSAGE_MAX).ctx(CTX)?;
    apply(&store, CTX, &id, FlowerChange::Message(message), &patch)
}

pub async fn revive(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<FlowerEnvelope>, ApiError> {
    const CTX: &str = "POST /api/flowers/{id}/revive";
    let id = parse_flower_id(CTX, &id)?;
    let patch: FlowerPatch = parse_body(CTX, &body)?;
    let change = FlowerChange::Revive {
        at: now_timestamp(),
    };
    apply(&store, CTX, &id, change, &patch)
}

fn apply(
    store: &SharedStore,
    context: &'static str,
    id: &str,
    change: FlowerChange,
    patch: &FlowerPatch,
) -> Result<Json<FlowerEnvelope>, ApiError> {
    let actor = patch.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match store.update_flower(id, change, actor).ctx(context)? {
        UpdateOutcome::Updated(flower) => Ok(Json(FlowerEnvelope { ok: true, flower })),
        UpdateOutcome::NotFound => Err(ApiError::NotFound { context }),
        UpdateOutcome::Denied => Err(ApiError::Forbidden {
            context,
            message: "only the owner may change this flower".to_string(),
        }),
    }
}
