//! HTTP ingest server for metric boards.
//!
//! Producers POST snapshot events; the server applies them to a single
//! dashboard session and serves the resulting render frames as JSON, so any
//! charting front-end can poll them.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use metricboard_core::{
    ConfigurationError, Dashboard, DashboardConfig, DashboardError, DashboardUpdate,
    MetricPayload, SnapshotEvent, WorldmapRenderModel,
};

/// Dashboard plus ingest counters, guarded together.
struct Session {
    dashboard: Dashboard,
    applied: u64,
    rejected: u64,
}

/// Shared server state.
struct AppState {
    session: Mutex<Session>,
}

#[derive(Serialize)]
struct EventResponse {
    success: bool,
    session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<DashboardUpdate>,
    /// Error message if the event was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    session_id: String,
    boards: usize,
    events_applied: u64,
    events_rejected: u64,
}

#[derive(Serialize)]
struct BoardFrame {
    board: String,
    event: String,
    tick: u64,
    payloads: std::collections::BTreeMap<String, MetricPayload>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn not_found(error: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error,
        }),
    )
}

fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::UnknownEvent { .. } => StatusCode::NOT_FOUND,
        DashboardError::PayloadMismatch { .. } => StatusCode::BAD_REQUEST,
        DashboardError::EmptyUpdate(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn handle_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<SnapshotEvent>,
) -> (StatusCode, Json<EventResponse>) {
    let mut session = state.session.lock().await;
    let session_id = session.dashboard.session_id().to_string();
    let name = event.event.clone();

    match session.dashboard.handle(event) {
        Ok(update) => {
            session.applied += 1;
            (
                StatusCode::OK,
                Json(EventResponse {
                    success: true,
                    session_id,
                    update: Some(update),
                    error: None,
                }),
            )
        }
        Err(err) => {
            session.rejected += 1;
            warn!("rejected event `{name}`: {err}");
            (
                status_for(&err),
                Json(EventResponse {
                    success: false,
                    session_id,
                    update: None,
                    error: Some(err.to_string()),
                }),
            )
        }
    }
}

async fn handle_board(
    State(state): State<Arc<AppState>>,
    Path(event): Path<String>,
) -> Result<Json<BoardFrame>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.session.lock().await;
    let board = session
        .dashboard
        .board(&event)
        .ok_or_else(|| not_found(format!("no board handles event `{event}`")))?;
    Ok(Json(BoardFrame {
        board: board.name().to_string(),
        tick: board.elapsed_ticks(),
        payloads: board.render_all(),
        event,
    }))
}

async fn handle_worldmap(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorldmapRenderModel>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.session.lock().await;
    session
        .dashboard
        .worldmap()
        .map(|map| Json(map.render().clone()))
        .ok_or_else(|| not_found("this dashboard has no worldmap".to_string()))
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let session = state.session.lock().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        session_id: session.dashboard.session_id().to_string(),
        boards: session.dashboard.boards().count(),
        events_applied: session.applied,
        events_rejected: session.rejected,
    })
}

async fn handle_reset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let mut session = state.session.lock().await;
    let previous = session.dashboard.session_id();
    session.dashboard.reset().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                success: false,
                error: e.to_string(),
            }),
        )
    })?;
    session.applied = 0;
    session.rejected = 0;
    info!(
        "session {previous} reset, now {}",
        session.dashboard.session_id()
    );
    Ok(Json(serde_json::json!({
        "success": true,
        "previous_session_id": previous.to_string(),
        "session_id": session.dashboard.session_id().to_string(),
    })))
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let session = state.session.lock().await;
    let events: Vec<String> = session
        .dashboard
        .event_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    drop(session);

    Json(serde_json::json!({
        "name": "metricboard server",
        "version": metricboard_core::VERSION,
        "events": events,
        "endpoints": {
            "/": "This API index",
            "/events": {
                "method": "POST",
                "description": "Apply a snapshot event",
                "body": "{\"event\": <name>, \"points\": {<metric>: <value>}} or {\"event\": <name>, \"entries\": [...]}",
            },
            "/boards/{event}": "Current render frames of the board fed by <event>",
            "/worldmap": "Current worldmap render model",
            "/session/reset": "POST: start a fresh dashboard session",
            "/health": "Health check and ingest counters",
        },
    }))
}

/// Build the axum router around a fresh dashboard session.
pub fn build_router(config: &DashboardConfig) -> Result<Router, ConfigurationError> {
    let state = Arc::new(AppState {
        session: Mutex::new(Session {
            dashboard: Dashboard::from_config(config)?,
            applied: 0,
            rejected: 0,
        }),
    });

    Ok(Router::new()
        .route("/", get(handle_index))
        .route("/events", post(handle_event))
        .route("/boards/{event}", get(handle_board))
        .route("/worldmap", get(handle_worldmap))
        .route("/session/reset", post(handle_reset))
        .route("/health", get(handle_health))
        .with_state(state))
}

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid dashboard configuration: {0}")]
    Config(#[from] ConfigurationError),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the HTTP ingest server until it fails.
pub async fn run_server(
    config: &DashboardConfig,
    host: &str,
    port: u16,
) -> Result<(), ServerError> {
    let app = build_router(config)?;
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricboard_core::{RegionEntry, presets};

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            session: Mutex::new(Session {
                dashboard: Dashboard::from_config(&presets::default_dashboard_config()).unwrap(),
                applied: 0,
                rejected: 0,
            }),
        })
    }

    fn points(event: &str, pairs: &[(&str, f64)]) -> SnapshotEvent {
        SnapshotEvent::points(
            event,
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
    }

    #[tokio::test]
    async fn test_event_applied_and_board_served() {
        let state = state();
        let (status, Json(resp)) = handle_event(
            State(state.clone()),
            Json(points(presets::EXPLORER_EVENT, &[(
                "archethic_mining_full_transaction_validation_duration",
                12.0,
            )])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(resp.success);
        assert!(resp.update.is_some());

        let event = presets::EXPLORER_EVENT.to_string();
        let Json(frame) = handle_board(State(state.clone()), Path(event)).await.unwrap();
        assert_eq!(frame.board, "explorer");
        assert_eq!(frame.tick, 5);
        match &frame.payloads["archethic_mining_full_transaction_validation_duration"] {
            MetricPayload::Series { ys, .. } => assert_eq!(ys.last(), Some(&12.0)),
            other => panic!("unexpected payload {other:?}"),
        }

        let Json(health) = handle_health(State(state)).await;
        assert_eq!(health.events_applied, 1);
        assert_eq!(health.events_rejected, 0);
    }

    #[tokio::test]
    async fn test_unknown_event_is_404() {
        let state = state();
        let (status, Json(resp)) =
            handle_event(State(state.clone()), Json(points("nope", &[]))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("nope"));

        let Json(health) = handle_health(State(state)).await;
        assert_eq!(health.events_rejected, 1);
    }

    #[tokio::test]
    async fn test_empty_worldmap_is_422_and_keeps_model() {
        let state = state();
        let (status, _) = handle_event(
            State(state.clone()),
            Json(SnapshotEvent::entries(
                presets::WORLDMAP_EVENT,
                vec![RegionEntry::new("F1", 4, true)],
            )),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = handle_event(
            State(state.clone()),
            Json(SnapshotEvent::entries(presets::WORLDMAP_EVENT, Vec::new())),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let Json(model) = handle_worldmap(State(state)).await.unwrap();
        assert_eq!(model.authorized_entries.len(), 1);
    }

    #[tokio::test]
    async fn test_board_lookup_unknown() {
        let err = handle_board(State(state()), Path("missing".to_string()))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_gives_new_session() {
        let state = state();
        handle_event(
            State(state.clone()),
            Json(points(presets::NODE_EVENT, &[("archethic_db_duration", 1.0)])),
        )
        .await;
        let before = state.session.lock().await.dashboard.session_id();

        let Json(body) = handle_reset(State(state.clone())).await.unwrap();
        assert_eq!(body["previous_session_id"], before.to_string());

        let session = state.session.lock().await;
        assert_ne!(session.dashboard.session_id(), before);
        assert_eq!(session.applied, 0);
        assert_eq!(
            session
                .dashboard
                .board(presets::NODE_EVENT)
                .unwrap()
                .elapsed_ticks(),
            0
        );
    }

    #[tokio::test]
    async fn test_index_lists_events() {
        let Json(index) = handle_index(State(state())).await;
        let events = index["events"].as_array().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(index["version"], metricboard_core::VERSION);
    }

    #[test]
    fn test_router_rejects_bad_config() {
        let mut cfg = presets::default_dashboard_config();
        cfg.boards.clear();
        assert!(matches!(
            build_router(&cfg),
            Err(ConfigurationError::EmptyDashboard)
        ));
    }
}
