//! REST API server for the dialogue router
//!
//! Exposes per-session routers via HTTP endpoints.
//! Integrates with frontend UI.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::backend::{CompletionBackend, GeminiSession, MockBackend};
use crate::error::RouterError;
use crate::models::ProfileField;
use crate::router::DialogueRouter;
use crate::state::ConversationState;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub session_id: String,
    /// "income" | "expenses" | "savings" | "debt" | "goal"
    pub field: String,
    pub value: Option<f64>,
    pub goal: Option<String>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

/// How new sessions obtain their completion backend
#[derive(Clone)]
pub enum BackendConfig {
    Gemini { api_key: String },
    Mock,
}

impl BackendConfig {
    fn build(&self) -> Box<dyn CompletionBackend> {
        match self {
            BackendConfig::Gemini { api_key } => Box::new(GeminiSession::new(api_key.clone())),
            BackendConfig::Mock => Box::new(MockBackend::new()),
        }
    }
}

/// One router per session. Distinct sessions share nothing and run in
/// parallel; turns within a session serialize on the router lock.
#[derive(Clone)]
pub struct ApiState {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<DialogueRouter>>>>>,
    backend_config: BackendConfig,
}

impl ApiState {
    pub fn new(backend_config: BackendConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            backend_config,
        }
    }

    async fn session(&self, session_id: Uuid) -> crate::Result<Arc<Mutex<DialogueRouter>>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(router) = sessions.get(&session_id) {
                return Ok(router.clone());
            }
        }

        let mut router =
            DialogueRouter::new(self.backend_config.build(), ConversationState::new());
        router.prime().await?;

        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(router)));

        Ok(entry.clone())
    }

    async fn existing_session(&self, session_id: Uuid) -> Option<Arc<Mutex<DialogueRouter>>> {
        self.sessions.read().await.get(&session_id).cloned()
    }
}

/// =============================
/// Helpers — Session Ids & Fields
/// =============================

fn stable_uuid_from_string(input: &str) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

fn parse_or_new_uuid(value: Option<&str>) -> Uuid {
    match value {
        Some(v) if !v.trim().is_empty() => {
            Uuid::parse_str(v).unwrap_or_else(|_| stable_uuid_from_string(v))
        }
        _ => Uuid::new_v4(),
    }
}

fn parse_session_uuid(value: &str) -> Uuid {
    Uuid::parse_str(value).unwrap_or_else(|_| stable_uuid_from_string(value))
}

fn parse_profile_field(field: &str) -> Option<ProfileField> {
    match field.to_lowercase().as_str() {
        "income" => Some(ProfileField::Income),
        "expenses" => Some(ProfileField::Expenses),
        "savings" => Some(ProfileField::Savings),
        "debt" => Some(ProfileField::Debt),
        _ => None,
    }
}

fn error_status(error: &RouterError) -> StatusCode {
    match error {
        RouterError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RouterError::BackendFailure(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let session_id = parse_or_new_uuid(req.session_id.as_deref());
    info!(%session_id, "Received chat request");

    let router = match state.session(session_id).await {
        Ok(router) => router,
        Err(e) => {
            return (
                error_status(&e),
                Json(ApiResponse::error(format!("Session setup failed: {}", e))),
            )
        }
    };

    let mut router = router.lock().await;
    match router.handle_turn(&req.message).await {
        Ok(answer) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "session_id": session_id,
                "answer": answer,
                "turns": router.state().turn_count(),
            }))),
        ),
        Err(e) => (
            error_status(&e),
            Json(ApiResponse::error(format!("Turn failed: {}", e))),
        ),
    }
}

/// =============================
/// Profile Endpoint
/// =============================

async fn update_profile(
    State(state): State<ApiState>,
    Json(req): Json<ProfileUpdateRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let session_id = parse_session_uuid(&req.session_id);

    let router = match state.session(session_id).await {
        Ok(router) => router,
        Err(e) => {
            return (
                error_status(&e),
                Json(ApiResponse::error(format!("Session setup failed: {}", e))),
            )
        }
    };

    let mut router = router.lock().await;

    if req.field.eq_ignore_ascii_case("goal") {
        let Some(goal) = req.goal.filter(|g| !g.trim().is_empty()) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Goal text is required".into())),
            );
        };
        router.add_goal(goal);
    } else {
        let Some(field) = parse_profile_field(&req.field) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!(
                    "Unknown profile field: {}",
                    req.field
                ))),
            );
        };
        let Some(value) = req.value else {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Numeric value is required".into())),
            );
        };
        router.update_profile(field, value);
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "session_id": session_id,
            "profile": router.state().profile(),
        }))),
    )
}

/// =============================
/// History Endpoint
/// =============================

async fn history(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    let session_id = parse_session_uuid(&session_id);

    let Some(router) = state.existing_session(session_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Session not found".into())),
        );
    };

    let router = router.lock().await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "session_id": session_id,
            "history": router.state().history(),
            "profile": router.state().profile(),
        }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/profile", post(update_profile))
        .route("/api/history/:session_id", get(history))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
