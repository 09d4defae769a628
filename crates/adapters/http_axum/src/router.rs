//! Axum router assembly.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Static routes come first; the `/{domain}/{object_id}` catch-all
/// serves any entity by its REST path. Includes a [`TraceLayer`] that
/// logs each request at `DEBUG` through the `tracing` ecosystem.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/entities", get(crate::api::list_entities))
        .route("/events", get(crate::sse::stream))
        .route("/switch/{object_id}/turn_on", post(crate::api::turn_on))
        .route("/switch/{object_id}/turn_off", post(crate::api::turn_off))
        .route("/{domain}/{object_id}", get(crate::api::get_entity))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use espnode_app::device::Device;
    use espnode_app::event_bus::EventBus;
    use espnode_domain::device::DeviceInfo;
    use espnode_entities::{BinarySensor, Switch};

    use super::*;

    async fn test_router() -> (Router, Arc<Switch>) {
        let mac = "AC:BC:32:89:0E:C9".parse().unwrap();
        let device = Device::new(DeviceInfo::new("testbench", mac), EventBus::new(16));
        let sensor = Arc::new(BinarySensor::new("Motion").with_device_class("motion"));
        let switch = Arc::new(Switch::new("Relay"));
        device.add_entity(sensor).await.unwrap();
        device.add_entity(switch.clone()).await.unwrap();
        (build(AppState::new(device)), switch)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let (app, _switch) = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_list_every_entity() {
        let (app, _switch) = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/entities")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let entities = json.as_array().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0]["id"], "binary_sensor-motion");
        assert_eq!(entities[1]["id"], "switch-relay");
    }

    #[tokio::test]
    async fn should_serve_single_entity_document() {
        let (app, _switch) = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/binary_sensor/motion")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["state"], "OFF");
        assert_eq!(json["value"], false);
    }

    #[tokio::test]
    async fn should_reject_wrong_domain_with_not_found() {
        let (app, _switch) = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/switch/motion")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_turn_switch_on_via_post() {
        let (app, switch) = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/switch/relay/turn_on")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(switch.state().await);
        let json = body_json(response).await;
        assert_eq!(json["state"], "ON");
    }

    #[tokio::test]
    async fn should_stream_events_as_sse() {
        let (app, _switch) = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/events")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "text/event-stream");
    }
}
