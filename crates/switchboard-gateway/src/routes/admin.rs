//! Admin surface: session, agents, settings, approvals, audit.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::str::FromStr;

use switchboard_core::{
    ApiError, ApprovalDecision, CapabilityType, PlanId, RequestId, RequestStatus,
};
use switchboard_kernel::settings::SAFE_MODE;

use crate::AppState;
use crate::error::GatewayResult;
use crate::routes::require_admin;
use crate::session::SESSION_COOKIE;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginBody {
    username: String,
    password: String,
}

pub(crate) async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> GatewayResult<impl IntoResponse> {
    let user = state.kernel.login(&body.username, &body.password).await?;
    let token = state.sessions.create(user.id);
    let cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/");
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "user": { "id": user.id, "username": user.username } })),
    ))
}

pub(crate) async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<impl IntoResponse> {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(crate::session::token_from_cookie_header)
    {
        state.sessions.remove(token);
    }
    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "ok": true })),
    ))
}

pub(crate) async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<Json<Value>> {
    let user_id = require_admin(&state, &headers)?;
    let user = state
        .kernel
        .store()
        .get_user(user_id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::authentication("session user no longer exists"))?;
    Ok(Json(json!({ "id": user.id, "username": user.username })))
}

pub(crate) async fn list_agents(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let agents = state.kernel.list_agents_with_capabilities().await?;
    Ok(Json(json!({ "agents": agents })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateAgentBody {
    name: String,
}

pub(crate) async fn create_agent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateAgentBody>,
) -> GatewayResult<impl IntoResponse> {
    require_admin(&state, &headers)?;
    let (agent, api_key) = state.kernel.create_agent(&body.name).await?;
    // The plaintext key appears exactly once, here.
    Ok((
        StatusCode::CREATED,
        Json(json!({ "agent": agent, "apiKey": api_key })),
    ))
}

pub(crate) async fn rotate_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let (agent, api_key) = state.kernel.rotate_agent_key(id.into()).await?;
    Ok(Json(json!({ "agentId": agent.id, "apiKey": api_key })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateCapabilityBody {
    enabled: bool,
    config: Option<Map<String, Value>>,
}

pub(crate) async fn update_capability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, capability_type)): Path<(i64, String)>,
    Json(body): Json<UpdateCapabilityBody>,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let capability_type = CapabilityType::from_str(&capability_type)
        .map_err(ApiError::validation)?;
    let capability = state
        .kernel
        .update_capability(id.into(), capability_type, body.enabled, body.config)
        .await?;
    Ok(Json(json!({ "capability": capability })))
}

pub(crate) async fn list_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let settings = state.kernel.list_settings().await?;
    Ok(Json(json!({ "settings": settings })))
}

pub(crate) async fn get_setting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let setting = state.kernel.get_setting(&key).await?;
    Ok(Json(json!(setting)))
}

pub(crate) async fn put_setting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let setting = state.kernel.update_setting(&key, value).await?;
    Ok(Json(json!(setting)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListRequestsQuery {
    status: Option<String>,
}

pub(crate) async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListRequestsQuery>,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let status = query
        .status
        .map(|raw| RequestStatus::from_str(&raw).map_err(ApiError::validation))
        .transpose()?;
    let requests = state.kernel.list_requests(status).await?;
    Ok(Json(json!({ "requests": requests })))
}

pub(crate) async fn request_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let (request, plans) = state.kernel.request_detail(RequestId(id)).await?;
    Ok(Json(json!({ "request": request, "plans": plans })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApproveBody {
    decision: String,
}

pub(crate) async fn approve_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<ApproveBody>,
) -> GatewayResult<Json<Value>> {
    let admin_id = require_admin(&state, &headers)?;
    let decision = match body.decision.as_str() {
        "approved" => ApprovalDecision::Approved,
        "rejected" => ApprovalDecision::Rejected,
        other => {
            return Err(ApiError::validation(format!(
                "decision must be `approved` or `rejected`, got `{other}`"
            ))
            .into());
        }
    };
    let request = state
        .kernel
        .approve_plan(admin_id, PlanId(id), decision)
        .await?;
    Ok(Json(json!({ "request": request })))
}

pub(crate) async fn get_safe_mode(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let enabled = state
        .kernel
        .store()
        .get_setting(SAFE_MODE)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    Ok(Json(json!({ "enabled": enabled })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SafeModeBody {
    enabled: bool,
}

pub(crate) async fn set_safe_mode(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SafeModeBody>,
) -> GatewayResult<Json<Value>> {
    let admin_id = require_admin(&state, &headers)?;
    state.kernel.set_safe_mode(admin_id, body.enabled).await?;
    Ok(Json(json!({ "enabled": body.enabled })))
}

pub(crate) async fn lockdown(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<Json<Value>> {
    let admin_id = require_admin(&state, &headers)?;
    let outcome = state.kernel.emergency_lockdown(admin_id).await?;
    Ok(Json(json!(outcome)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuditQuery {
    verify: Option<bool>,
}

pub(crate) async fn audit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AuditQuery>,
) -> GatewayResult<Json<Value>> {
    require_admin(&state, &headers)?;
    let events = state.kernel.list_audit_events().await?;
    let mut body = json!({ "events": events });
    if query.verify.unwrap_or(false) {
        let verification = state.kernel.verify_audit_chain().await?;
        body["verification"] = json!(verification);
    }
    Ok(Json(body))
}
