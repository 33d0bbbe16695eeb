use crate::dispatch::{DispatchError, Dispatcher, SendResult};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

pub const SEND_ROUTE: &str = "/api/send-whatsapp";
pub const HEALTH_ROUTE: &str = "/health";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    mode: &'static str,
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Error sending WhatsApp message: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(self.to_body())).into_response()
    }
}

/// Build the HTTP router around a shared dispatcher
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route(SEND_ROUTE, post(send_whatsapp))
        .route(HEALTH_ROUTE, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn send_whatsapp(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: Bytes,
) -> Result<Json<SendResult>, DispatchError> {
    dispatcher.send_raw(&body).await.map(Json)
}

async fn health(State(dispatcher): State<Arc<Dispatcher>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mode: dispatcher.mode_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whatsapp::ProviderError;

    #[test]
    fn test_validation_error_is_bad_request() {
        let response = DispatchError::Validation.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_body_is_bad_request() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let response = DispatchError::InvalidBody(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_error_is_internal_error() {
        let response = DispatchError::Provider(ProviderError::Unavailable).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_value(HealthResponse {
            status: "ok",
            mode: "demo",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "mode": "demo"}));
    }
}
