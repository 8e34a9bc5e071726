//! Core types for the Switchboard control plane.
//!
//! Switchboard mediates privileged actions requested by autonomous agents:
//! every action becomes an inspectable plan, plans require human approval,
//! and execution is bonded to the approved plan by a SHA-256 hash. This
//! crate holds the data model shared by every other crate — entity types,
//! integer id newtypes, status machines, and the error taxonomy the wire
//! surface maps onto HTTP.
//!
//! Wire-facing structs serialize in camelCase so that canonical-JSON hashes
//! (`planHash`, `eventHash`) are portable and verifiable by third parties.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod entity;
pub mod error;
pub mod types;

pub use entity::{
    ActionInput, ActionRequest, AdminUser, Agent, AgentCapability, Approval, AuditEvent,
    ExecutionReceipt, Plan, PlanStep, Setting, StepResult,
};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use types::{
    AgentId, ApprovalDecision, ApprovalId, AuditEventId, CapabilityType, PlanId, ReceiptId,
    ReceiptStatus, RequestId, RequestStatus, StepStatus, StepType, Timestamp, UserId, now_utc,
};
