//! Network effector: advisory access intents.
//!
//! This effector is not a firewall. It records which domains an agent
//! intends to reach so the intent is planned, approved, and audited like
//! any other action; execution records the intent and changes nothing.

use async_trait::async_trait;
use serde_json::{Value, json};

use switchboard_core::{CapabilityType, PlanStep, StepResult, StepType};

use crate::effector::{Effector, EffectorContext, ValidationOutcome, split_normalized};
use crate::error::{EffectorError, EffectorResult};

/// Advisory network access intents.
#[derive(Debug, Default)]
pub struct NetworkEffector;

impl NetworkEffector {
    /// Create the effector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Effector for NetworkEffector {
    fn capability_type(&self) -> CapabilityType {
        CapabilityType::Network
    }

    fn validate_request(&self, operation: &str, params: &Value) -> ValidationOutcome {
        if operation != "allow" {
            return ValidationOutcome::fail_with(format!(
                "unsupported network operation: {operation}"
            ));
        }

        let domains = match params.get("domains").and_then(Value::as_array) {
            Some(items) if !items.is_empty() => {
                let mut domains = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(d) if !d.is_empty() => domains.push(d.to_string()),
                        _ => {
                            return ValidationOutcome::fail_with(
                                "`domains` must be an array of non-empty strings",
                            );
                        }
                    }
                }
                domains
            }
            _ => {
                return ValidationOutcome::fail_with(
                    "`domains` is required and must be a non-empty array",
                );
            }
        };

        let purpose = params.get("purpose").and_then(Value::as_str);
        ValidationOutcome::ok(json!({
            "operation": "allow",
            "params": { "domains": domains, "purpose": purpose },
        }))
    }

    async fn dry_run(
        &self,
        _ctx: &EffectorContext,
        normalized: &Value,
    ) -> EffectorResult<Vec<PlanStep>> {
        let (operation, params) = split_normalized(normalized);
        if operation != "allow" {
            return Err(EffectorError::Validation(format!(
                "unsupported network operation: {operation}"
            )));
        }

        let domains = params["domains"].clone();
        let count = domains.as_array().map_or(0, Vec::len);
        let mut step = PlanStep::new(
            StepType::NetAllow,
            format!("Record network access intent for {count} domain(s)"),
        )
        .with_input("domains", domains);
        if let Some(purpose) = params["purpose"].as_str() {
            step = step.with_input("purpose", purpose);
        }
        Ok(vec![step])
    }

    async fn execute(
        &self,
        _ctx: &EffectorContext,
        steps: &[PlanStep],
    ) -> EffectorResult<Vec<StepResult>> {
        // Advisory by design: record the intent, touch nothing.
        Ok(steps
            .iter()
            .map(|step| {
                let count = step
                    .inputs
                    .get("domains")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                StepResult::success(
                    &step.step_id,
                    format!("Recorded access intent for {count} domain(s); no firewall change made"),
                )
            })
            .collect())
    }
}
