//! HTTP gateway for the Switchboard control plane.
//!
//! Thin by intent: every route parses the wire shape, authenticates the
//! caller (admin session cookie or agent bearer key), calls the kernel,
//! and maps the kernel's error taxonomy onto HTTP statuses. No business
//! logic lives here.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};

use switchboard_kernel::Kernel;

use crate::session::SessionStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The control plane core.
    pub kernel: Arc<Kernel>,
    /// Server-side admin sessions.
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Assemble gateway state around a kernel.
    #[must_use]
    pub fn new(kernel: Arc<Kernel>) -> Self {
        Self {
            kernel,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

/// Build the full route table.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Admin surface (session cookie).
        .route("/api/admin/login", post(routes::admin::login))
        .route("/api/admin/logout", post(routes::admin::logout))
        .route("/api/admin/me", get(routes::admin::me))
        .route("/api/admin/agents", get(routes::admin::list_agents))
        .route("/api/admin/agents", post(routes::admin::create_agent))
        .route(
            "/api/admin/agents/{id}/rotate-key",
            post(routes::admin::rotate_key),
        )
        .route(
            "/api/admin/agents/{id}/capabilities/{capability_type}",
            patch(routes::admin::update_capability),
        )
        .route("/api/admin/settings", get(routes::admin::list_settings))
        .route("/api/admin/settings/{key}", get(routes::admin::get_setting))
        .route("/api/admin/settings/{key}", put(routes::admin::put_setting))
        .route(
            "/api/admin/action-requests",
            get(routes::admin::list_requests),
        )
        .route(
            "/api/admin/action-requests/{id}",
            get(routes::admin::request_detail),
        )
        .route(
            "/api/admin/plans/{id}/approve",
            post(routes::admin::approve_plan),
        )
        .route("/api/admin/safe-mode", get(routes::admin::get_safe_mode))
        .route("/api/admin/safe-mode", post(routes::admin::set_safe_mode))
        .route("/api/admin/lockdown", post(routes::admin::lockdown))
        .route("/api/admin/audit", get(routes::admin::audit))
        // Agent surface (bearer key).
        .route(
            "/api/agent/action-requests",
            post(routes::agent::create_request),
        )
        .route(
            "/api/agent/action-requests/{id}/dry-run",
            post(routes::agent::dry_run),
        )
        .route("/api/agent/plans/{id}/execute", post(routes::agent::execute))
        .with_state(state)
}
