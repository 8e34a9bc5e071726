//! Agent surface: submit, dry-run, execute.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{Value, json};

use switchboard_core::{ActionInput, PlanId, RequestId};

use crate::AppState;
use crate::error::GatewayResult;
use crate::routes::require_agent;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRequestBody {
    #[serde(flatten)]
    input: ActionInput,
    reasoning: Option<String>,
}

pub(crate) async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateRequestBody>,
) -> GatewayResult<impl IntoResponse> {
    let agent = require_agent(&state, &headers).await?;
    let request = state
        .kernel
        .create_request(agent.id, body.input, body.reasoning)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "requestId": request.id,
            "status": request.status,
            "summary": request.summary,
        })),
    ))
}

pub(crate) async fn dry_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> GatewayResult<Json<Value>> {
    let agent = require_agent(&state, &headers).await?;
    let outcome = state.kernel.dry_run(agent.id, RequestId(id)).await?;
    Ok(Json(json!(outcome)))
}

pub(crate) async fn execute(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> GatewayResult<Json<Value>> {
    let agent = require_agent(&state, &headers).await?;
    let receipt = state.kernel.execute_plan(agent.id, PlanId(id)).await?;
    Ok(Json(json!({ "receipt": receipt })))
}
