//! HTTP transport
//!
//! Routes:
//! - `GET /`: the dashboard, compiled into the binary
//! - `GET /health`: liveness
//! - `GET /api/status`: the current telemetry record
//! - `POST /api/update`: telemetry from the cooler, merged into the record
//! - `POST /api/command`: dashboard commands, published to the device topic
//!
//! Every request is handled on its own; the only shared state is the two
//! collaborators in `AppState`, which are safe for concurrent use.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::broker::{Command, CommandRequest, Publisher};
use crate::persistence::{Document, DocumentStore};
use crate::transport::message::{
    CommandResponse, HealthResponse, SERVER_TIMESTAMP_FIELD, UpdateResponse,
};
use crate::utils::error::{GatewayError, Result};

const DASHBOARD_HTML: &str = include_str!("../../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub publisher: Arc<dyn Publisher>,
    /// Logical path of the telemetry record.
    pub record: String,
    /// Topic commands are published to.
    pub command_topic: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/update", post(update))
        .route("/api/command", post(command))
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http",
                    %request_id,
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

async fn status(State(state): State<Arc<AppState>>) -> Result<Json<Document>> {
    match state.store.get(&state.record).await {
        Ok(doc) => Ok(Json(doc.unwrap_or_default())),
        Err(e) => {
            error!(record = %state.record, "Failed to read telemetry record: {e}");
            Err(e.into())
        }
    }
}

async fn update(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdateResponse>> {
    let mut report = match body {
        Ok(Json(Value::Object(report))) => report,
        Ok(Json(other)) => {
            debug!("Rejected telemetry that is not an object: {other}");
            return Err(GatewayError::InvalidTelemetry);
        }
        Err(rejection) => {
            debug!("Rejected telemetry body: {rejection}");
            return Err(GatewayError::InvalidTelemetry);
        }
    };

    let water = report.get("waterTemp").cloned().unwrap_or(Value::Null);
    let room = report.get("roomTemp").cloned().unwrap_or(Value::Null);

    report.insert(
        SERVER_TIMESTAMP_FIELD.to_string(),
        Value::from(chrono::Utc::now().timestamp_millis()),
    );

    if let Err(e) = state
        .store
        .merge(&state.record, report, SERVER_TIMESTAMP_FIELD)
        .await
    {
        error!(record = %state.record, "Telemetry sync error: {e}");
        return Err(e.into());
    }

    info!("Cooler sync: water {water} °C | room {room} °C");
    Ok(Json(UpdateResponse::success()))
}

async fn command(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<CommandResponse>> {
    // anything that is not an object counts as a command without a type
    let request = match body {
        Ok(Json(value @ Value::Object(_))) => {
            serde_json::from_value::<CommandRequest>(value).unwrap_or_default()
        }
        Ok(Json(other)) => {
            debug!("Command body is not an object: {other}");
            CommandRequest::default()
        }
        Err(rejection) => {
            debug!("Unreadable command body: {rejection}");
            CommandRequest::default()
        }
    };

    let command = Command::from(request);
    let Some(message) = command.to_message() else {
        debug!("Invalid command: {command:?}");
        return Err(GatewayError::InvalidCommand);
    };

    let payload = message.to_string();
    if let Err(e) = state.publisher.publish(&state.command_topic, &payload).await {
        error!(topic = %state.command_topic, "Failed to dispatch {payload}: {e}");
        return Err(e.into());
    }

    info!(topic = %state.command_topic, "MQTT command dispatched: {payload}");
    Ok(Json(CommandResponse { success: true }))
}
