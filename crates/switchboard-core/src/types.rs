//! Identifiers, enumerations, and the request status machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wall-clock UTC timestamp, serialized as an ISO-8601 string.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current wall-clock UTC time.
#[must_use]
pub fn now_utc() -> Timestamp {
    chrono::Utc::now()
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered agent.
    AgentId
);
entity_id!(
    /// Identifier of an action request.
    RequestId
);
entity_id!(
    /// Identifier of a plan.
    PlanId
);
entity_id!(
    /// Identifier of an approval decision.
    ApprovalId
);
entity_id!(
    /// Identifier of an execution receipt.
    ReceiptId
);
entity_id!(
    /// Identifier of an audit event. Ids are assigned in insertion order,
    /// so iterating by ascending id walks the hash chain.
    AuditEventId
);
entity_id!(
    /// Identifier of an admin user.
    UserId
);

/// The capability families an agent can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityType {
    /// Sandboxed filesystem operations.
    Filesystem,
    /// Allowlisted shell commands.
    Shell,
    /// Advisory network intents.
    Network,
    /// Test-only echo.
    Echo,
}

impl CapabilityType {
    /// Stable string form used in store keys and audit payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::Shell => "shell",
            Self::Network => "network",
            Self::Echo => "echo",
        }
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filesystem" => Ok(Self::Filesystem),
            "shell" => Ok(Self::Shell),
            "network" => Ok(Self::Network),
            "echo" => Ok(Self::Echo),
            other => Err(format!("unknown capability type: {other}")),
        }
    }
}

/// Lifecycle of an action request.
///
/// Transitions only along
/// `pending -> planned -> (approved | rejected) -> (executed | failed)`.
/// `rejected` and `failed` are terminal, as is `executed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Submitted, not yet planned.
    Pending,
    /// A plan exists and awaits a decision.
    Planned,
    /// Plan approved by an admin; execution may proceed.
    Approved,
    /// Plan rejected by an admin.
    Rejected,
    /// Execution completed with at least one successful step.
    Executed,
    /// Execution completed with no successful step.
    Failed,
}

impl RequestStatus {
    /// Whether no further transition is allowed out of this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Executed | Self::Failed)
    }

    /// Stable string form (matches the serialized representation).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Planned => "planned",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Executed => "executed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "planned" => Ok(Self::Planned),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "executed" => Ok(Self::Executed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// The typed unit of work inside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    /// Read a file.
    FsRead,
    /// Write (create or overwrite) a file.
    FsWrite,
    /// Delete a file or directory.
    FsDelete,
    /// List a directory.
    FsList,
    /// Move or rename a path.
    FsMove,
    /// Run a shell command.
    ShellRun,
    /// Record a network access intent (advisory).
    NetAllow,
    /// Echo back input (test-only effector).
    Echo,
}

impl StepType {
    /// Whether executing the step mutates state outside the control plane.
    #[must_use]
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::FsWrite | Self::FsDelete | Self::FsMove)
    }
}

/// An admin's decision on a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    /// The plan may be executed.
    Approved,
    /// The plan may not be executed.
    Rejected,
}

/// Outcome of a whole plan execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Every step succeeded.
    Success,
    /// No step succeeded.
    Failure,
    /// Some steps succeeded, some did not.
    PartialFailure,
}

/// Outcome of a single executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The step ran and succeeded.
    Success,
    /// The step ran and failed (or could not be started).
    Failed,
    /// Policy prevented the step from running at all.
    Blocked,
}
