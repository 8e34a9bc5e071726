//! The effector trait and its shared request/context types.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;

use switchboard_core::{AgentId, CapabilityType, PlanStep, RequestId, StepResult};

use crate::error::EffectorResult;

/// Policy context handed to every effector phase.
///
/// Built fresh per request from current settings, so policy changes take
/// effect for subsequent requests without restarts.
#[derive(Debug, Clone)]
pub struct EffectorContext {
    /// Absolute directory prefixes filesystem operations must stay under.
    pub allowed_roots: Vec<PathBuf>,
    /// Regex patterns a shell command must match to run.
    pub shell_allow_list: Vec<String>,
    /// Global kill switch: blocks destructive filesystem steps and
    /// non-baseline shell commands.
    pub safe_mode_enabled: bool,
    /// The requesting agent.
    pub agent_id: AgentId,
    /// The request being planned or executed.
    pub request_id: RequestId,
}

/// Result of `validate_request`.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Whether the input is acceptable.
    pub valid: bool,
    /// Problems found, empty when valid.
    pub errors: Vec<String>,
    /// The normalized request (`{operation, params}`) when valid.
    pub normalized: Option<Value>,
}

impl ValidationOutcome {
    /// A passing outcome with the normalized request.
    #[must_use]
    pub fn ok(normalized: Value) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            normalized: Some(normalized),
        }
    }

    /// A failing outcome with one or more errors.
    #[must_use]
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            normalized: None,
        }
    }

    /// A failing outcome with a single error.
    #[must_use]
    pub fn fail_with(error: impl Into<String>) -> Self {
        Self::fail(vec![error.into()])
    }
}

/// A capability effector.
#[async_trait]
pub trait Effector: Send + Sync {
    /// The capability family this effector implements.
    fn capability_type(&self) -> CapabilityType;

    /// Validate and normalize an agent-submitted operation.
    fn validate_request(&self, operation: &str, params: &Value) -> ValidationOutcome;

    /// Produce the concrete steps this request would take.
    ///
    /// Must not mutate anything; the only permitted I/O is reading
    /// existing file content to build diffs and previews.
    async fn dry_run(
        &self,
        ctx: &EffectorContext,
        normalized: &Value,
    ) -> EffectorResult<Vec<PlanStep>>;

    /// Execute approved steps, re-checking policy per step.
    ///
    /// Returns one result per step, in order. Policy refusals are
    /// `blocked` results, runtime problems are `failed` results; the
    /// method itself only errs when a step is uninterpretable.
    async fn execute(
        &self,
        ctx: &EffectorContext,
        steps: &[PlanStep],
    ) -> EffectorResult<Vec<StepResult>>;

    /// Default capability config for newly created grants.
    fn default_config(&self) -> Map<String, Value> {
        Map::new()
    }
}

/// Pull `operation` and `params` out of a normalized request.
pub(crate) fn split_normalized(normalized: &Value) -> (&str, &Value) {
    let operation = normalized
        .get("operation")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let params = normalized.get("params").unwrap_or(&Value::Null);
    (operation, params)
}
