//! JSON REST handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use espnode_app::entity::Entity;
use espnode_proto::ApiMessage;
use espnode_proto::message::SwitchCommandRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /entities` — every entity's JSON document, in key order.
pub async fn list_entities(State(state): State<AppState>) -> Json<Vec<serde_json::Value>> {
    let mut documents = Vec::new();
    for entity in state.device.entities().await {
        documents.push(entity.render_json().await);
    }
    Json(documents)
}

/// `GET /{domain}/{object_id}` — one entity's JSON document.
pub async fn get_entity(
    State(state): State<AppState>,
    Path((domain, object_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entity = find_entity(&state, &domain, &object_id).await?;
    Ok(Json(entity.render_json().await))
}

/// `POST /switch/{object_id}/turn_on`
pub async fn turn_on(
    state: State<AppState>,
    path: Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    command_switch(state, path, true).await
}

/// `POST /switch/{object_id}/turn_off`
pub async fn turn_off(
    state: State<AppState>,
    path: Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    command_switch(state, path, false).await
}

/// Route a switch command through the same dispatch path the native
/// API uses, then return the resulting document.
async fn command_switch(
    State(state): State<AppState>,
    Path(object_id): Path<String>,
    value: bool,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entity = find_entity(&state, "switch", &object_id).await?;
    if let Some(key) = entity.core().key() {
        let command = ApiMessage::SwitchCommandRequest(SwitchCommandRequest {
            key: key.get(),
            state: value,
        });
        state.device.dispatch_command(&command).await;
    }
    Ok(Json(entity.render_json().await))
}

async fn find_entity(
    state: &AppState,
    domain: &str,
    object_id: &str,
) -> Result<Arc<dyn Entity>, ApiError> {
    state
        .device
        .entity_by_object_id(object_id)
        .await
        .filter(|entity| entity.core().domain() == domain)
        .ok_or_else(|| ApiError::EntityNotFound {
            domain: domain.to_string(),
            object_id: object_id.to_string(),
        })
}
