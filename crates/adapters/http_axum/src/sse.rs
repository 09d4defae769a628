//! Server-Sent Events stream for real-time updates.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use espnode_app::event_bus::Event;
use espnode_domain::key::EntityKey;
use espnode_proto::ApiMessage;

use crate::state::AppState;

/// `GET /events` — SSE stream of state changes and log lines.
///
/// Opens with one `state` event per entity (its current snapshot), so
/// a client needs no separate initial fetch, then follows the event
/// bus until the client disconnects.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    // Snapshot replay: subscribe first so nothing published while we
    // collect snapshots is lost, at worst a state is sent twice.
    let event_rx = state.device.bus().subscribe();

    let mut initial = Vec::new();
    for entity in state.device.entities().await {
        if let (Some(key), Some(snapshot)) = (entity.core().key(), entity.snapshot().await) {
            if let Some(event) = state_event(key, &snapshot) {
                initial.push(Ok(event));
            }
        }
    }

    let live = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(Event::StateChange { key, snapshot }) => state_event(key, &snapshot).map(Ok),
        Ok(Event::Log {
            level,
            tag,
            message,
            timestamp,
        }) => {
            let body = serde_json::json!({
                "level": level,
                "tag": tag,
                "message": message,
                "timestamp": timestamp,
            });
            Some(Ok(SseEvent::default().event("log").data(body.to_string())))
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(tokio_stream::iter(initial).chain(live)).keep_alive(KeepAlive::default())
}

/// Render a state snapshot as a `state` SSE event.
fn state_event(key: EntityKey, snapshot: &ApiMessage) -> Option<SseEvent> {
    let state = match snapshot {
        ApiMessage::BinarySensorStateResponse(s) => s.state,
        ApiMessage::SwitchStateResponse(s) => s.state,
        _ => return None,
    };
    let body = serde_json::json!({ "key": key.get(), "state": state });
    Some(SseEvent::default().event("state").data(body.to_string()))
}
