//! HTTP + WebSocket API for Focuswatch
//!
//! Endpoints:
//! - GET /                      - Service info
//! - GET /health                - Health check
//! - POST /session/new          - Create session
//! - GET /session/{id}          - Current status
//! - DELETE /session/{id}       - End session
//! - POST /session/{id}/analyze - Analyze one frame
//! - GET /session/{id}/stats    - Session statistics
//! - WS /ws/analyze             - Duplex analysis, session lives as long as the socket
//! - WS /ws/{id}                - Duplex analysis on an existing session

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::config::MonitorConfig;
use crate::core::{
    prepare_frame, round2, FaceDetector, FramePayload, MonitorSession, SessionStatus,
    UnavailableDetector,
};
use crate::error::{MonitorError, Result};
use crate::types::{Alert, AlertKind, AttentionState, EmittedFrame, SessionStats};

type SharedSession = Arc<Mutex<MonitorSession>>;

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, SharedSession>>,
    pub config: MonitorConfig,
    pub detector: Arc<dyn FaceDetector>,
}

/// Create new session request (body optional)
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    /// Enables transition alerts for this session
    pub alert_cooldown_secs: Option<f64>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Successful frame analysis, the stable egress contract
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub focus_score: f64,
    pub raw_frame_score: f64,
    pub status: String,
    pub state: AttentionState,
    pub away_timer: f64,
    pub alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_alert: Option<AlertKind>,
    pub faces_detected: usize,
    pub eyes_detected: usize,
    /// Epoch seconds
    pub timestamp: f64,
}

impl From<&EmittedFrame> for AnalysisResponse {
    fn from(out: &EmittedFrame) -> Self {
        Self {
            success: true,
            focus_score: round2(out.smoothed_score),
            raw_frame_score: round2(out.raw_score),
            status: out.status.clone(),
            state: out.state,
            away_timer: round2(out.away_duration),
            alerts: out.alerts.clone(),
            transition_alert: out.transition_alert,
            faces_detected: out.faces_detected,
            eyes_detected: out.eyes_detected,
            timestamp: out.timestamp.timestamp_millis() as f64 / 1000.0,
        }
    }
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl From<&MonitorError> for ErrorEnvelope {
    fn from(err: &MonitorError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

/// Session statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub stats: SessionStats,
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = match &self {
            MonitorError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_input_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "API error");
        } else {
            warn!(code = self.code(), error = %self, "API error");
        }
        (status, Json(ErrorEnvelope::from(&self))).into_response()
    }
}

/// Create the API router with no server-side detector
pub fn create_router(config: MonitorConfig) -> Router {
    create_router_with_detector(config, Arc::new(UnavailableDetector))
}

/// Create the API router around a detector implementation
pub fn create_router_with_detector(config: MonitorConfig, detector: Arc<dyn FaceDetector>) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        config,
        detector,
    });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/analyze", post(analyze_frame))
        .route("/session/:id/stats", get(get_stats))
        .route("/ws/analyze", get(ws_fresh_session))
        .route("/ws/:id", get(ws_existing_session))
        .with_state(state)
}

/// Service info
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Focuswatch attention monitoring API",
        "version": crate::VERSION,
        "endpoints": {
            "health": "/health",
            "new_session": "/session/new",
            "analyze": "/session/{id}/analyze",
            "stats": "/session/{id}/stats",
            "websocket": "/ws/analyze",
        }
    }))
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<NewSessionResponse>> {
    let req: NewSessionRequest = if body.is_empty() {
        NewSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| MonitorError::InvalidInput(format!("Invalid JSON format: {}", e)))?
    };

    let mut tracker_config = state.config.tracker_config();
    if let Some(secs) = req.alert_cooldown_secs {
        let cooldown = Duration::try_from_secs_f64(secs).map_err(|_| {
            MonitorError::InvalidInput(format!(
                "alert_cooldown_secs must be a non-negative number of seconds, got {}",
                secs
            ))
        })?;
        tracker_config.alert_cooldown = Some(cooldown);
    }

    let session_id = generate_session_id();
    let session = MonitorSession::new(session_id.clone(), tracker_config);
    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), Arc::new(Mutex::new(session)));
    info!(session = %session_id, "session created");

    Ok(Json(NewSessionResponse {
        websocket_url: format!("/ws/{}", session_id),
        session_id,
    }))
}

async fn find_session(state: &AppState, id: &str) -> Result<SharedSession> {
    state
        .sessions
        .read()
        .await
        .get(id)
        .cloned()
        .ok_or_else(|| MonitorError::SessionNotFound(id.to_string()))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatus>> {
    let session = find_session(&state, &id).await?;
    let status = session.lock().await.status();
    Ok(Json(status))
}

/// End session
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let removed = state.sessions.write().await.remove(&id);
    match removed {
        Some(_) => {
            info!(session = %id, "session closed");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(MonitorError::SessionNotFound(id)),
    }
}

/// Analyze one frame (request/response)
async fn analyze_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<AnalysisResponse>> {
    let session = find_session(&state, &id).await?;
    let payload: FramePayload = serde_json::from_slice(&body)
        .map_err(|e| MonitorError::InvalidInput(format!("Invalid JSON format: {}", e)))?;
    let response = analyze(&state, &session, payload).await?;
    Ok(Json(response))
}

/// Get session statistics
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatsResponse>> {
    let session = find_session(&state, &id).await?;
    let stats = session.lock().await.stats();
    Ok(Json(StatsResponse {
        session_id: id,
        stats,
    }))
}

/// Decode + detect off the async runtime, then fold into the session
///
/// The session lock is held only for the tracker update, and the timestamp is
/// taken under it so a session always sees non-decreasing times.
async fn analyze(state: &AppState, session: &Mutex<MonitorSession>, payload: FramePayload) -> Result<AnalysisResponse> {
    let detector = Arc::clone(&state.detector);
    let max_bytes = state.config.frame.max_frame_bytes;
    let prepared = tokio::task::spawn_blocking(move || prepare_frame(&payload, detector.as_ref(), max_bytes))
        .await
        .map_err(|e| MonitorError::Internal(e.to_string()))??;

    let mut session = session.lock().await;
    let out = session.process(&prepared, Instant::now());
    Ok(AnalysisResponse::from(&out))
}

/// WebSocket with a private session
async fn ws_fresh_session(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let id = generate_session_id();
        info!(session = %id, "websocket connection established");
        let session = Mutex::new(MonitorSession::new(id.clone(), state.config.tracker_config()));
        handle_websocket(socket, &state, &session).await;
        info!(session = %id, "websocket connection closed");
    })
}

/// WebSocket bound to an existing session
async fn ws_existing_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse> {
    let session = find_session(&state, &id).await?;
    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, &state, &session).await;
    }))
}

/// One frame in flight: each message is answered before the next is read
async fn handle_websocket(socket: WebSocket, state: &AppState, session: &Mutex<MonitorSession>) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let reply = match handle_text_message(&text, state, session).await {
            Ok(response) => serde_json::to_string(&response),
            Err(e) => {
                warn!(code = e.code(), error = %e, "frame rejected");
                serde_json::to_string(&ErrorEnvelope::from(&e))
            }
        };
        let reply = match reply {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize reply");
                continue;
            }
        };
        if sender.send(Message::Text(reply)).await.is_err() {
            break;
        }
    }
}

async fn handle_text_message(text: &str, state: &AppState, session: &Mutex<MonitorSession>) -> Result<AnalysisResponse> {
    let payload: FramePayload = serde_json::from_str(text)
        .map_err(|_| MonitorError::InvalidInput("Invalid JSON format".into()))?;
    analyze(state, session, payload).await
}

/// Generate session ID
fn generate_session_id() -> String {
    format!("session_{}", uuid::Uuid::new_v4().simple())
}

/// Run the API server
pub async fn run_server(config: MonitorConfig) -> Result<()> {
    let addr = config.server.addr.clone();
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Focuswatch API running");
    info!("  POST /session/new          - Create session");
    info!("  POST /session/:id/analyze  - Analyze frame");
    info!("  GET  /session/:id/stats    - Session statistics");
    info!("  WS   /ws/analyze           - Live analysis");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use image::{ImageFormat, RgbImage};

    fn test_state() -> AppState {
        AppState {
            sessions: RwLock::new(HashMap::new()),
            config: MonitorConfig::default(),
            detector: Arc::new(UnavailableDetector),
        }
    }

    fn png_base64(width: u32, height: u32) -> String {
        let img = RgbImage::new(width, height);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        STANDARD.encode(buf.into_inner())
    }

    #[tokio::test]
    async fn test_socket_message_error_then_success() {
        let state = test_state();
        let session = Mutex::new(MonitorSession::new("ws", state.config.tracker_config()));

        let err = handle_text_message("{not json", &state, &session).await.unwrap_err();
        let envelope = serde_json::to_value(ErrorEnvelope::from(&err)).unwrap();
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["code"], "invalid_input");
        assert_eq!(envelope["error"], "invalid input: Invalid JSON format");
        assert_eq!(session.lock().await.status().frames_processed, 0);

        let frame = serde_json::json!({
            "frame": png_base64(640, 480),
            "detections": {
                "faces": [[224, 176, 192, 128]],
                "eyes": [[40, 40, 30, 24], [120, 40, 30, 24]]
            }
        })
        .to_string();
        let response = handle_text_message(&frame, &state, &session).await.unwrap();
        assert!(response.success);
        assert_eq!(response.state, AttentionState::Focused);
        assert_eq!(response.focus_score, 100.0);
        assert_eq!(session.lock().await.status().frames_processed, 1);
    }

    #[tokio::test]
    async fn test_socket_bad_frame_leaves_session_untouched() {
        let state = test_state();
        let session = Mutex::new(MonitorSession::new("ws", state.config.tracker_config()));

        let err = handle_text_message(r#"{"frame": ""}"#, &state, &session).await.unwrap_err();
        assert_eq!(err.code(), "invalid_frame");
        let status = session.lock().await.status();
        assert_eq!(status.frames_processed, 0);
        assert_eq!(status.focus_score, 100.0);
    }
}
