//! Route handlers and shared auth extraction.

pub mod admin;
pub mod agent;

use axum::http::HeaderMap;
use axum::http::header;

use switchboard_core::{Agent, ApiError, UserId};

use crate::AppState;
use crate::error::GatewayResult;
use crate::session::token_from_cookie_header;

/// Legacy agent key header, kept for older SDK clients.
const AGENT_KEY_HEADER: &str = "x-agent-key";

/// Resolve the admin behind the session cookie.
pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> GatewayResult<UserId> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
        .and_then(|token| state.sessions.get(token))
        .ok_or_else(|| ApiError::authentication("admin session required").into())
}

/// Resolve the agent behind the bearer key (or legacy header).
pub(crate) async fn require_agent(
    state: &AppState,
    headers: &HeaderMap,
) -> GatewayResult<Agent> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let legacy = headers.get(AGENT_KEY_HEADER).and_then(|v| v.to_str().ok());

    let Some(key) = bearer.or(legacy) else {
        return Err(ApiError::authentication("agent API key required").into());
    };
    Ok(state.kernel.authenticate_agent(key).await?)
}
