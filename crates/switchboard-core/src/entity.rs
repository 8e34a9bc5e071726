//! Persistent entities.
//!
//! All wire-facing structs serialize in camelCase. Optional fields are
//! omitted when absent so canonical-JSON hashing never sees explicit
//! nulls for fields a producer simply did not set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{
    AgentId, ApprovalDecision, ApprovalId, AuditEventId, CapabilityType, PlanId, ReceiptId,
    ReceiptStatus, RequestId, RequestStatus, StepStatus, StepType, Timestamp, UserId,
};

/// A registered agent, authenticated by a hashed API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Store-assigned id.
    pub id: AgentId,
    /// Unique display name.
    pub name: String,
    /// SHA-256 hex of the plaintext API key. The plaintext is shown once
    /// at creation or rotation and never persisted.
    pub api_key_hash: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last successful authenticated call, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<Timestamp>,
}

/// Per-agent grant of one capability family.
///
/// Unique by `(agent_id, capability_type)`. Absent or disabled means the
/// capability is blocked (default deny).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapability {
    /// Store-assigned id.
    pub id: i64,
    /// Owning agent.
    pub agent_id: AgentId,
    /// Capability family.
    #[serde(rename = "type")]
    pub capability_type: CapabilityType,
    /// Whether the grant is active.
    pub enabled: bool,
    /// Effector-specific configuration.
    pub config: Map<String, Value>,
}

/// A global key/value setting.
///
/// Recognized keys: `allowed_roots` (ordered list of absolute directory
/// paths), `shell_allowlist` (list of regex patterns), `safe_mode` (bool).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    /// Setting key.
    pub key: String,
    /// Setting value (shape depends on the key).
    pub value: Value,
}

/// The typed action an agent asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionInput {
    /// Capability family the action belongs to.
    #[serde(rename = "type")]
    pub capability_type: CapabilityType,
    /// Operation within the capability (e.g. `read`, `run`, `allow`).
    pub operation: String,
    /// Operation parameters, validated by the effector.
    pub params: Value,
}

/// An agent-submitted intent to perform a typed operation.
///
/// Not itself executable: execution requires a plan, an approval, and a
/// matching plan hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    /// Store-assigned id.
    pub id: RequestId,
    /// Submitting agent.
    pub agent_id: AgentId,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Short human-readable summary.
    pub summary: String,
    /// The requested action.
    pub input: ActionInput,
    /// Optional agent-supplied reasoning shown to the approving admin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_trace: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
}

/// One executable unit of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    /// UUIDv4 step identifier.
    pub step_id: String,
    /// Step type.
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Human-readable description of what the step would do.
    pub description: String,
    /// Structured step inputs (paths, commands, domains, ...).
    pub inputs: Map<String, Value>,
    /// Optional content preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Optional unified diff (filesystem writes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// Machine-readable risk flags contributing to the score.
    pub risk_flags: Vec<String>,
    /// Per-step risk score, 0..=100, set by the risk scorer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
}

impl PlanStep {
    /// Create a step with a fresh UUIDv4 id and no risk annotations.
    #[must_use]
    pub fn new(step_type: StepType, description: impl Into<String>) -> Self {
        Self {
            step_id: uuid::Uuid::new_v4().to_string(),
            step_type,
            description: description.into(),
            inputs: Map::new(),
            preview: None,
            diff: None,
            risk_flags: Vec::new(),
            risk_score: None,
        }
    }

    /// Add a structured input.
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    /// Add a risk flag (deduplicated).
    pub fn add_flag(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if !self.risk_flags.contains(&flag) {
            self.risk_flags.push(flag);
        }
    }

    /// Whether the step carries the given risk flag.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.risk_flags.iter().any(|f| f == flag)
    }

    /// String-typed input accessor.
    #[must_use]
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.inputs.get(key).and_then(Value::as_str)
    }
}

/// The concrete, inspectable sequence of steps an effector would take.
///
/// Immutable once persisted; `plan_hash` is the SHA-256 of the canonical
/// JSON of `steps` and is recomputed at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Store-assigned id.
    pub id: PlanId,
    /// Owning request.
    pub request_id: RequestId,
    /// Hex SHA-256 over the canonical JSON of `steps`.
    pub plan_hash: String,
    /// The steps, in execution order.
    pub steps: Vec<PlanStep>,
    /// Aggregate risk score, 0..=100.
    pub risk_score: u8,
    /// Creation time.
    pub created_at: Timestamp,
}

/// An admin's recorded decision on a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    /// Store-assigned id.
    pub id: ApprovalId,
    /// The decided plan.
    pub plan_id: PlanId,
    /// Deciding admin user.
    pub approved_by: UserId,
    /// The decision.
    pub decision: ApprovalDecision,
    /// Decision time.
    pub created_at: Timestamp,
}

/// Result of executing one plan step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// The executed step.
    pub step_id: String,
    /// Outcome.
    pub status: StepStatus,
    /// Captured output, truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error message when the step failed or was blocked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Captured stdout (shell steps), truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    /// Captured stderr (shell steps), truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    /// Completion time of the step.
    pub timestamp: Timestamp,
}

impl StepResult {
    /// A successful result with output.
    #[must_use]
    pub fn success(step_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Success,
            output: Some(output.into()),
            error: None,
            stdout: None,
            stderr: None,
            timestamp: crate::types::now_utc(),
        }
    }

    /// A failed result with an error message.
    #[must_use]
    pub fn failed(step_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Failed,
            output: None,
            error: Some(error.into()),
            stdout: None,
            stderr: None,
            timestamp: crate::types::now_utc(),
        }
    }

    /// A blocked result with the blocking reason.
    #[must_use]
    pub fn blocked(step_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Blocked,
            output: None,
            error: Some(reason.into()),
            stdout: None,
            stderr: None,
            timestamp: crate::types::now_utc(),
        }
    }
}

/// Record of a plan execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    /// Store-assigned id.
    pub id: ReceiptId,
    /// The executed plan.
    pub plan_id: PlanId,
    /// Aggregate outcome.
    pub status: ReceiptStatus,
    /// Per-step results, in step order.
    pub logs: Vec<StepResult>,
    /// Execution completion time.
    pub executed_at: Timestamp,
}

/// One entry of the append-only, hash-chained audit log.
///
/// `event_hash = sha256_hex(prev_hash + canonical_json(data))`, where
/// `data` is the full `{eventType, data, timestamp}` payload. The first
/// event links to the literal `"GENESIS"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Store-assigned id; ascending id order is chain order.
    pub id: AuditEventId,
    /// Hash of the previous event, or `"GENESIS"`.
    pub prev_hash: String,
    /// Hash binding this event to its predecessor.
    pub event_hash: String,
    /// Event type tag.
    pub event_type: String,
    /// The hashed payload: `{eventType, data, timestamp}`.
    pub data: Value,
    /// Insertion time.
    pub created_at: Timestamp,
}

/// An administrator account for the approval surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    /// Store-assigned id.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Creation time.
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::now_utc;

    #[test]
    fn test_plan_step_omits_absent_options() {
        let step = PlanStep::new(StepType::FsList, "list /tmp");
        let value = serde_json::to_value(&step).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("preview"));
        assert!(!obj.contains_key("diff"));
        assert!(!obj.contains_key("riskScore"));
        assert!(obj.contains_key("stepId"));
        assert_eq!(obj.get("type").unwrap(), "FS_LIST");
    }

    #[test]
    fn test_plan_step_flags_deduplicate() {
        let mut step = PlanStep::new(StepType::ShellRun, "run ls");
        step.add_flag("sudo");
        step.add_flag("sudo");
        assert_eq!(step.risk_flags.len(), 1);
        assert!(step.has_flag("sudo"));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = ActionRequest {
            id: RequestId(1),
            agent_id: AgentId(7),
            status: RequestStatus::Pending,
            summary: "read a file".into(),
            input: ActionInput {
                capability_type: CapabilityType::Filesystem,
                operation: "read".into(),
                params: serde_json::json!({"path": "/tmp/x"}),
            },
            reasoning_trace: None,
            created_at: now_utc(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["agentId"], 7);
        assert_eq!(value["input"]["type"], "filesystem");
        assert!(value.get("reasoningTrace").is_none());
    }
}
