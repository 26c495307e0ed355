//! REST surface of the engine.
//!
//! Commands return 204 on success; reads return JSON. Error bodies are
//! `{"error": "<message>"}` with 404 for unknown entities, 409 for state
//! conflicts, 503 when the auth server is unreachable and 500 otherwise.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AgentServerError;
use crate::service::AgentService;
use crate::status::HealthReporter;

/// Optional tenant scoping header. Absent means no filtering.
pub const TENANT_HEADER: &str = "Tenant-UUID";

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<AgentService>,
    pub health: Arc<HealthReporter>,
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/agents", get(list_agents))
        .route("/agents/logoff", post(logoff_all))
        .route("/agents/relog", post(relog_all))
        .route("/agents/by-id/:id", get(get_agent_by_id))
        .route("/agents/by-id/:id/login", post(login_by_id))
        .route("/agents/by-id/:id/logoff", post(logoff_by_id))
        .route("/agents/by-id/:id/pause", post(pause_by_id))
        .route("/agents/by-id/:id/unpause", post(unpause_by_id))
        .route("/agents/by-id/:id/add", post(add_to_queue))
        .route("/agents/by-id/:id/remove", post(remove_from_queue))
        .route("/agents/by-number/:number", get(get_agent_by_number))
        .route("/agents/by-number/:number/login", post(login_by_number))
        .route("/agents/by-number/:number/logoff", post(logoff_by_number))
        .route("/agents/by-number/:number/pause", post(pause_by_number))
        .route("/agents/by-number/:number/unpause", post(unpause_by_number))
        .route("/status", get(health_check))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub extension: String,
    pub context: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PauseRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueueRequest {
    pub queue_id: i64,
}

impl IntoResponse for AgentServerError {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else if self.is_conflict() {
            StatusCode::CONFLICT
        } else if matches!(self, Self::AuthServerUnreachable(_)) {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

fn tenant_filter(headers: &HeaderMap) -> Option<Vec<Uuid>> {
    let value = headers.get(TENANT_HEADER)?.to_str().ok()?;
    let uuid = Uuid::parse_str(value.trim()).ok()?;
    Some(vec![uuid])
}

async fn list_agents(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AgentServerError> {
    let tenants = tenant_filter(&headers);
    let statuses = state.service.list_statuses(tenants.as_deref()).await?;
    Ok(Json(statuses))
}

async fn get_agent_by_id(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AgentServerError> {
    let tenants = tenant_filter(&headers);
    let status = state.service.status_by_id(id, tenants.as_deref()).await?;
    Ok(Json(status))
}

async fn get_agent_by_number(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(number): Path<String>,
) -> Result<impl IntoResponse, AgentServerError> {
    let tenants = tenant_filter(&headers);
    let status = state
        .service
        .status_by_number(&number, tenants.as_deref())
        .await?;
    Ok(Json(status))
}

async fn login_by_id(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<LoginRequest>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    state
        .service
        .login_by_id(id, &body.extension, &body.context, tenants.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn login_by_number(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(number): Path<String>,
    Json(body): Json<LoginRequest>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    state
        .service
        .login_by_number(&number, &body.extension, &body.context, tenants.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn logoff_by_id(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    state.service.logoff_by_id(id, tenants.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn logoff_by_number(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(number): Path<String>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    state
        .service
        .logoff_by_number(&number, tenants.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn logoff_all(State(state): State<ApiState>) -> Result<StatusCode, AgentServerError> {
    state.service.logoff_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn relog_all(State(state): State<ApiState>) -> Result<StatusCode, AgentServerError> {
    state.service.relog_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn pause_by_id(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    body: Option<Json<PauseRequest>>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    let reason = body.and_then(|Json(b)| b.reason);
    state
        .service
        .pause_by_id(id, reason.as_deref(), tenants.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn pause_by_number(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(number): Path<String>,
    body: Option<Json<PauseRequest>>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    let reason = body.and_then(|Json(b)| b.reason);
    state
        .service
        .pause_by_number(&number, reason.as_deref(), tenants.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unpause_by_id(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    state.service.unpause_by_id(id, tenants.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unpause_by_number(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(number): Path<String>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    state
        .service
        .unpause_by_number(&number, tenants.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_to_queue(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<QueueRequest>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    state
        .service
        .add_agent_to_queue(id, body.queue_id, tenants.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_from_queue(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<QueueRequest>,
) -> Result<StatusCode, AgentServerError> {
    let tenants = tenant_filter(&headers);
    state
        .service
        .remove_agent_from_queue(id, body.queue_id, tenants.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.health.summary())
}
