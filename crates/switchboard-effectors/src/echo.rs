//! Echo effector: zero-risk round trip for tests and smoke checks.

use async_trait::async_trait;
use serde_json::{Value, json};

use switchboard_core::{CapabilityType, PlanStep, StepResult, StepType};

use crate::effector::{Effector, EffectorContext, ValidationOutcome, split_normalized};
use crate::error::{EffectorError, EffectorResult};

/// Returns its input message; exercises the full plan lifecycle with no
/// side effects.
#[derive(Debug, Default)]
pub struct EchoEffector;

impl EchoEffector {
    /// Create the effector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Effector for EchoEffector {
    fn capability_type(&self) -> CapabilityType {
        CapabilityType::Echo
    }

    fn validate_request(&self, operation: &str, params: &Value) -> ValidationOutcome {
        if operation != "echo" {
            return ValidationOutcome::fail_with(format!("unsupported echo operation: {operation}"));
        }
        match params.get("message").and_then(Value::as_str) {
            Some(message) => ValidationOutcome::ok(json!({
                "operation": "echo",
                "params": { "message": message },
            })),
            None => ValidationOutcome::fail_with("`message` is required and must be a string"),
        }
    }

    async fn dry_run(
        &self,
        _ctx: &EffectorContext,
        normalized: &Value,
    ) -> EffectorResult<Vec<PlanStep>> {
        let (operation, params) = split_normalized(normalized);
        if operation != "echo" {
            return Err(EffectorError::Validation(format!(
                "unsupported echo operation: {operation}"
            )));
        }
        let message = params["message"].as_str().unwrap_or_default();
        Ok(vec![
            PlanStep::new(StepType::Echo, "Echo the message back").with_input("message", message),
        ])
    }

    async fn execute(
        &self,
        _ctx: &EffectorContext,
        steps: &[PlanStep],
    ) -> EffectorResult<Vec<StepResult>> {
        Ok(steps
            .iter()
            .map(|step| {
                StepResult::success(&step.step_id, step.input_str("message").unwrap_or_default())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use switchboard_core::{AgentId, RequestId, StepStatus};
    use switchboard_risk::score_step;

    fn ctx() -> EffectorContext {
        EffectorContext {
            allowed_roots: vec![PathBuf::from("/tmp")],
            shell_allow_list: Vec::new(),
            safe_mode_enabled: true,
            agent_id: AgentId(1),
            request_id: RequestId(1),
        }
    }

    #[tokio::test]
    async fn test_echo_round_trip_is_zero_risk() {
        let effector = EchoEffector::new();
        let outcome = effector.validate_request("echo", &json!({"message": "ping"}));
        assert!(outcome.valid);

        let steps = effector
            .dry_run(&ctx(), &outcome.normalized.unwrap())
            .await
            .unwrap();
        assert_eq!(score_step(&steps[0]).score, 0);

        let results = effector.execute(&ctx(), &steps).await.unwrap();
        assert_eq!(results[0].status, StepStatus::Success);
        assert_eq!(results[0].output.as_deref(), Some("ping"));
    }
}
