//! API routes for Debate Coach endpoints

use axum::{
    extract::{Extension, State},
    middleware,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coach_core::{practice_question, DebateTurn, FeedbackRecord, Position, PracticeQuestion};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_middleware;
use crate::state::AppState;
use crate::ws::ws_handler;

/// Records returned by the history endpoint
const HISTORY_LIMIT: u32 = 100;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentHealth>,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub database: ComponentStatus,
    pub completion_provider: ComponentStatus,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Single-page client
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Basic health check handler (lightweight)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        components: None,
    })
}

/// Health check with database connectivity
pub async fn health_detailed(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.db().is_healthy().await;

    Json(HealthResponse {
        status: if db_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        components: Some(ComponentHealth {
            database: ComponentStatus {
                status: if db_healthy { "healthy" } else { "unhealthy" }.to_string(),
                detail: None,
            },
            completion_provider: ComponentStatus {
                status: "configured".to_string(),
                detail: Some(state.coach().provider_name().to_string()),
            },
        }),
    })
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(username), Some(email), Some(password)) = (
        present(&req.username),
        present(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    let user = state.users().create(username, email, password).await?;
    let token = state.jwt_auth().issue(&user.id, &user.username)?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        username: user.username,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(username), Some(password)) = (present(&req.username), req.password.as_deref()) else {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    let user = state
        .users()
        .verify(username, password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let token = state.jwt_auth().issue(&user.id, &user.username)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        username: user.username,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StartDebateRequest {
    pub topic: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartDebateResponse {
    pub debate_id: Uuid,
    pub ai_position: Position,
    pub ai_message: String,
}

pub async fn start_debate(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<StartDebateRequest>,
) -> ApiResult<Json<StartDebateResponse>> {
    let (Some(topic), Some(position)) = (present(&req.topic), present(&req.position)) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    let opening = state.coach().start(topic, position)?;
    let debate_id = Uuid::new_v4();
    tracing::info!(debate_id = %debate_id, user_id = %user.user_id, topic = %topic, "Debate started");

    Ok(Json(StartDebateResponse {
        debate_id,
        ai_position: opening.ai_position,
        ai_message: opening.ai_message,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub topic: Option<String>,
    pub position: Option<String>,
    pub argument: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub debate_id: Uuid,
    pub feedback: FeedbackRecord,
    /// True when the model's reply could not be parsed and the canned
    /// feedback was substituted
    pub fallback: bool,
}

pub async fn analyze_debate(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let turn = DebateTurn::from_parts(
        Some(user.user_id.as_str()),
        req.topic.as_deref(),
        req.position.as_deref(),
        req.argument.as_deref(),
        Some(1),
    )?;

    let analysis = state.coach().analyze(&turn).await?;

    Ok(Json(AnalyzeResponse {
        debate_id: analysis.debate_id,
        fallback: analysis.outcome.is_fallback(),
        feedback: analysis.outcome.record,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct PracticeRequest {
    pub topic: Option<String>,
    pub difficulty: Option<String>,
}

pub async fn practice(
    Extension(user): Extension<AuthUser>,
    Json(req): Json<PracticeRequest>,
) -> Json<PracticeQuestion> {
    tracing::debug!(user_id = %user.user_id, "Practice question requested");
    Json(practice_question(present(&req.topic), present(&req.difficulty)))
}

/// One entry of a user's debate history
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub topic: String,
    pub position: Position,
    pub argument: String,
    pub feedback: FeedbackRecord,
    pub score: u8,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn debate_history(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let records = state.debates().list_for_user(&user.user_id, HISTORY_LIMIT).await?;

    Ok(Json(
        records
            .into_iter()
            .map(|r| HistoryEntry {
                id: r.id,
                topic: r.topic,
                position: r.position,
                argument: r.argument_text,
                feedback: r.feedback,
                score: r.score,
                created_at: r.created_at,
            })
            .collect(),
    ))
}

/// Build the API router, including authentication
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        // Public endpoints
        .route("/api/health", get(health))
        .route("/api/health/detailed", get(health_detailed))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        // Optional auth
        .route("/api/debate/start", post(start_debate))
        .route("/api/debate/analyze", post(analyze_debate))
        // Required auth
        .route("/api/practice/question", post(practice))
        .route("/api/debates/history", get(debate_history))
        // Real-time channel
        .route("/ws", get(ws_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present() {
        assert_eq!(present(&Some("  topic ".to_string())), Some("topic"));
        assert_eq!(present(&Some("   ".to_string())), None);
        assert_eq!(present(&None), None);
    }

    #[test]
    fn test_analyze_response_shape() {
        let response = AnalyzeResponse {
            debate_id: Uuid::nil(),
            feedback: coach_core::fallback_record("Topic", Position::For),
            fallback: true,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["fallback"], true);
        assert_eq!(json["feedback"].as_object().unwrap().len(), 7);
    }
}
