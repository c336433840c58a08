//! WebSocket server + REST endpoints for quest sessions.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::QuestConfig;
use crate::content;
use crate::error::{ConfigError, Result, SessionError};
use crate::quest::{SectionPatch, TagField};
use crate::session::{QuestSession, SessionEvent, SessionRegistry, SessionView};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
}

/// Build the Axum router with session REST routes and the event socket.
pub fn quest_routes(registry: Arc<SessionRegistry>, config: &QuestConfig) -> Result<Router> {
    let cors = cors_layer(config.allowed_origin.as_deref())?;
    let state = AppState { registry };

    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/content", get(get_content))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/start", post(start))
        .route("/api/sessions/{id}/exit", post(exit))
        .route("/api/sessions/{id}/reset", post(reset))
        .route("/api/sessions/{id}/next", post(next_page))
        .route("/api/sessions/{id}/prev", post(prev_page))
        .route("/api/sessions/{id}/advance", post(advance))
        .route("/api/sessions/{id}/retreat", post(retreat))
        .route(
            "/api/sessions/{id}/profile",
            axum::routing::patch(update_profile),
        )
        .route("/api/sessions/{id}/tags", post(toggle_tag))
        .route("/api/sessions/{id}/stack-draft", put(set_stack_draft))
        .route("/api/sessions/{id}/stacks", post(add_stack))
        .route("/api/sessions/{id}/snapshot", get(get_snapshot))
        .route("/ws/sessions/{id}", get(ws_handler))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state))
}

/// Bind the configured port on all interfaces.
pub async fn bind(config: &QuestConfig) -> Result<TcpListener> {
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(ConfigError::Io)?;
    Ok(listener)
}

fn cors_layer(origin: Option<&str>) -> std::result::Result<CorsLayer, ConfigError> {
    let allow_origin = match origin {
        Some(origin) => {
            let value =
                HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidValue {
                    key: "QUEST_ALLOWED_ORIGIN".into(),
                    message: e.to_string(),
                })?;
            AllowOrigin::exact(value)
        }
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Failures a handler can report.
#[derive(Debug)]
pub enum ApiError {
    InvalidId,
    Session(SessionError),
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidId => (StatusCode::BAD_REQUEST, "Invalid session ID".to_string()),
            Self::Session(e) => (status_for(e), e.to_string()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn status_for(e: &SessionError) -> StatusCode {
    match e {
        SessionError::NotFound { .. } => StatusCode::NOT_FOUND,
        SessionError::BlankTag => StatusCode::BAD_REQUEST,
        SessionError::CapacityReached { .. } => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::WizardInactive { .. }
        | SessionError::ResultsUnavailable { .. }
        | SessionError::Navigation(_) => StatusCode::CONFLICT,
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

async fn lookup(state: &AppState, id: &str) -> std::result::Result<Arc<QuestSession>, ApiError> {
    let id = Uuid::parse_str(id).map_err(|_| ApiError::InvalidId)?;
    Ok(state.registry.get(id).await?)
}

// ── Health / content ────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "quest-navigator",
        "sessions": state.registry.len().await
    }))
}

async fn get_content() -> impl IntoResponse {
    Json(content::bundle())
}

// ── Sessions ────────────────────────────────────────────────────────────

async fn create_session(
    State(state): State<AppState>,
) -> std::result::Result<(StatusCode, Json<SessionView>), ApiError> {
    let session = state.registry.create().await?;
    Ok((StatusCode::CREATED, Json(session.view().await)))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.view().await))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(session_id) = Uuid::parse_str(&id) else {
        return ApiError::InvalidId.into_response();
    };

    if state.registry.remove(session_id).await {
        (
            StatusCode::OK,
            Json(serde_json::json!({"status": "removed"})),
        )
            .into_response()
    } else {
        ApiError::from(SessionError::NotFound { id: session_id }).into_response()
    }
}

async fn start(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.start().await?))
}

async fn exit(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.exit().await?))
}

async fn reset(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.reset().await?))
}

async fn next_page(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.next_page().await?))
}

async fn prev_page(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.prev_page().await?))
}

async fn advance(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.advance().await?))
}

async fn retreat(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.retreat().await?))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<SectionPatch>,
) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.update_section(patch).await?))
}

#[derive(Deserialize)]
struct TagRequest {
    field: TagField,
    tag: String,
}

async fn toggle_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TagRequest>,
) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.toggle_tag(body.field, &body.tag).await?))
}

#[derive(Deserialize)]
struct StackDraftRequest {
    text: String,
}

async fn set_stack_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StackDraftRequest>,
) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.set_stack_draft(body.text).await?))
}

async fn add_stack(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    let session = lookup(&state, &id).await?;
    Ok(Json(session.add_custom_stack().await?))
}

async fn get_snapshot(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let session = match lookup(&state, &id).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    match session.snapshot().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

// ── WebSocket ───────────────────────────────────────────────────────────

/// Actions a WebSocket client can send (client → server).
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientAction {
    Start,
    Exit,
    Reset,
    Next,
    Prev,
    Advance,
    Retreat,
    UpdateSection { patch: SectionPatch },
    ToggleTag { field: TagField, tag: String },
    SetStackDraft { text: String },
    AddStack,
    /// Ask for a fresh `session_sync`.
    Sync,
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let session = match lookup(&state, &id).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    info!(session_id = %session.id(), "WebSocket client connecting");
    ws.on_upgrade(move |socket| handle_socket(socket, session))
}

async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, msg: &T) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize WS message");
            true
        }
    }
}

async fn send_sync(socket: &mut WebSocket, session: &QuestSession) -> bool {
    let sync = SessionEvent::SessionSync {
        session: session.view().await,
    };
    send_json(socket, &sync).await
}

async fn handle_socket(mut socket: WebSocket, session: Arc<QuestSession>) {
    let session_id = session.id();
    session.touch();

    // Subscribe before the initial sync so nothing slips between them
    let mut rx = session.subscribe();

    if !send_sync(&mut socket, &session).await {
        warn!(session_id = %session_id, "Failed to send initial sync, client disconnected");
        return;
    }

    loop {
        tokio::select! {
            // Forward session events to this client
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if !send_json(&mut socket, &event).await {
                            debug!(session_id = %session_id, "Client disconnected during send");
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(session_id = %session_id, missed = n, "WS client lagged behind broadcast");
                        if !send_sync(&mut socket, &session).await {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!(session_id = %session_id, "Broadcast channel closed");
                        break;
                    }
                }
            }

            // Receive actions from client
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        if !handle_client_message(&text, &session, &mut socket).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(session_id = %session_id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // Idle time counts from when the last client left
    session.touch();
    info!(session_id = %session_id, "WebSocket connection closed");
}

/// Apply one client action. Failures are reported to this client only.
/// Returns `false` if the socket went away.
async fn handle_client_message(text: &str, session: &QuestSession, socket: &mut WebSocket) -> bool {
    let action = match serde_json::from_str::<ClientAction>(text) {
        Ok(action) => action,
        Err(e) => {
            debug!(error = %e, text = text, "Unrecognized WS message from client");
            let reply = serde_json::json!({"type": "error", "message": format!("Invalid action: {e}")});
            return send_json(socket, &reply).await;
        }
    };

    let result = match action {
        ClientAction::Start => session.start().await,
        ClientAction::Exit => session.exit().await,
        ClientAction::Reset => session.reset().await,
        ClientAction::Next => session.next_page().await,
        ClientAction::Prev => session.prev_page().await,
        ClientAction::Advance => session.advance().await,
        ClientAction::Retreat => session.retreat().await,
        ClientAction::UpdateSection { patch } => session.update_section(patch).await,
        ClientAction::ToggleTag { field, tag } => session.toggle_tag(field, &tag).await,
        ClientAction::SetStackDraft { text } => session.set_stack_draft(text).await,
        ClientAction::AddStack => session.add_custom_stack().await,
        ClientAction::Sync => return send_sync(socket, session).await,
    };

    match result {
        Ok(_) => true,
        Err(e) => {
            warn!(session_id = %session.id(), error = %e, "WS action rejected");
            let reply = serde_json::json!({"type": "error", "message": e.to_string()});
            send_json(socket, &reply).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses() {
        assert_eq!(
            status_for(&SessionError::NotFound { id: Uuid::nil() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&SessionError::BlankTag), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&SessionError::CapacityReached { limit: 1 }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&SessionError::ResultsUnavailable {
                screen: crate::shell::Screen::Wizard
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn client_actions_parse() {
        let action: ClientAction = serde_json::from_str(
            r#"{"action":"toggle_tag","field":"compliance_standards","tag":"GDPR"}"#,
        )
        .unwrap();
        assert!(matches!(
            action,
            ClientAction::ToggleTag { field: TagField::ComplianceStandards, ref tag } if tag == "GDPR"
        ));

        let action: ClientAction = serde_json::from_str(
            r#"{"action":"update_section","patch":{"section":"team","headcount":250}}"#,
        )
        .unwrap();
        assert!(matches!(action, ClientAction::UpdateSection { .. }));

        assert!(serde_json::from_str::<ClientAction>(r#"{"action":"fly"}"#).is_err());
    }

    #[tokio::test]
    async fn bind_reports_a_taken_port() {
        let held = TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
        let config = QuestConfig {
            port: held.local_addr().unwrap().port(),
            ..QuestConfig::default()
        };
        assert!(matches!(
            bind(&config).await,
            Err(crate::error::Error::Config(ConfigError::Io(_)))
        ));
    }

    #[test]
    fn bad_origin_surfaces_through_router_construction() {
        let config = QuestConfig {
            allowed_origin: Some("bad\norigin".into()),
            ..QuestConfig::default()
        };
        let registry = SessionRegistry::new(&config);
        assert!(matches!(
            quest_routes(registry, &config),
            Err(crate::error::Error::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn bad_origin_is_a_config_error() {
        assert!(cors_layer(Some("http://ok.example")).is_ok());
        assert!(cors_layer(None).is_ok());
        assert!(matches!(
            cors_layer(Some("bad\norigin")),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
