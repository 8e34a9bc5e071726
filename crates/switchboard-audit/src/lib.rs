//! Tamper-evident audit logging.
//!
//! Every state transition in the control plane appends exactly one event
//! to an append-only log. Each event's hash covers the previous event's
//! hash, so any mutation, deletion, or reordering of stored events breaks
//! the chain and is detectable by [`AuditLog::verify`]:
//!
//! ```text
//! event_hash = sha256_hex(prev_hash + canonical_json({eventType, data, timestamp}))
//! ```
//!
//! The first event links to the literal `"GENESIS"`. Appends are
//! serialized behind a single-writer mutex so concurrent handlers always
//! produce a linear `prev_hash -> event_hash` chain with no gaps.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::Mutex;

use switchboard_core::{AuditEvent, now_utc};
use switchboard_crypto::{canonical_json, sha256_hex};
use switchboard_storage::{StorageError, Store};

/// The `prev_hash` of the first chain entry.
pub const GENESIS: &str = "GENESIS";

/// Event types emitted by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventType {
    /// An admin logged in.
    AdminLogin,
    /// An agent was created.
    AgentCreated,
    /// An agent's API key was rotated.
    AgentKeyRotated,
    /// A capability grant changed.
    CapabilityUpdated,
    /// A setting changed.
    SettingUpdated,
    /// Safe mode was toggled.
    SafeModeChanged,
    /// Emergency lockdown fired.
    EmergencyLockdown,
    /// An agent submitted an action request.
    RequestCreated,
    /// A dry run produced a plan.
    DryRunComplete,
    /// An admin decided on a plan.
    PlanDecision,
    /// A plan was executed (successfully or not).
    PlanExecuted,
}

impl AuditEventType {
    /// The stable wire tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdminLogin => "ADMIN_LOGIN",
            Self::AgentCreated => "AGENT_CREATED",
            Self::AgentKeyRotated => "AGENT_KEY_ROTATED",
            Self::CapabilityUpdated => "CAPABILITY_UPDATED",
            Self::SettingUpdated => "SETTING_UPDATED",
            Self::SafeModeChanged => "SAFE_MODE_CHANGED",
            Self::EmergencyLockdown => "EMERGENCY_LOCKDOWN",
            Self::RequestCreated => "REQUEST_CREATED",
            Self::DryRunComplete => "DRY_RUN_COMPLETE",
            Self::PlanDecision => "PLAN_DECISION",
            Self::PlanExecuted => "PLAN_EXECUTED",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The underlying store failed.
    #[error("audit storage failed: {0}")]
    Storage(#[from] StorageError),

    /// Event data could not be serialized for hashing.
    #[error("audit serialization failed: {0}")]
    Serialization(String),
}

/// Result alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Outcome of a full chain verification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerification {
    /// Whether every link and every hash checked out.
    pub valid: bool,
    /// Number of events examined.
    pub length: usize,
    /// Id of the first event that failed, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_at: Option<i64>,
}

/// The append-only audit log.
pub struct AuditLog {
    store: Arc<Store>,
    /// Single-writer lane: appends must be serialized to keep the chain
    /// linear without serializing unrelated request handling.
    append_lock: Mutex<()>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

impl AuditLog {
    /// Build an audit log over the given store.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            append_lock: Mutex::new(()),
        }
    }

    /// Append one event.
    ///
    /// The stored `data` field is the full hashed payload
    /// `{eventType, data, timestamp}`, so a verifier needs nothing but the
    /// row itself and its predecessor's hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if persistence fails. Nothing is
    /// written in that case; the chain stays intact.
    pub async fn append(&self, event_type: AuditEventType, data: Value) -> AuditResult<AuditEvent> {
        let _guard = self.append_lock.lock().await;

        let prev_hash = self
            .store
            .last_audit_event()
            .await?
            .map_or_else(|| GENESIS.to_string(), |e| e.event_hash);

        let payload = json!({
            "eventType": event_type.as_str(),
            "data": data,
            "timestamp": now_utc(),
        });
        let event_hash = sha256_hex(&format!("{prev_hash}{}", canonical_json(&payload)));

        let event = self
            .store
            .insert_audit_event(&prev_hash, &event_hash, event_type.as_str(), payload)
            .await?;
        tracing::debug!(event_type = %event_type, id = %event.id, "audit event appended");
        Ok(event)
    }

    /// Re-derive every link and hash in the chain.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if events cannot be read.
    pub async fn verify(&self) -> AuditResult<ChainVerification> {
        let events = self.store.list_audit_events().await?;
        let mut expected_prev = GENESIS.to_string();

        for event in &events {
            let recomputed =
                sha256_hex(&format!("{}{}", event.prev_hash, canonical_json(&event.data)));
            if event.prev_hash != expected_prev || recomputed != event.event_hash {
                tracing::warn!(id = %event.id, "audit chain verification failed");
                return Ok(ChainVerification {
                    valid: false,
                    length: events.len(),
                    broken_at: Some(event.id.0),
                });
            }
            expected_prev = event.event_hash.clone();
        }

        Ok(ChainVerification {
            valid: true,
            length: events.len(),
            broken_at: None,
        })
    }

    /// All events, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if events cannot be read.
    pub async fn list(&self) -> AuditResult<Vec<AuditEvent>> {
        Ok(self.store.list_audit_events().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> AuditLog {
        AuditLog::new(Arc::new(Store::in_memory()))
    }

    #[tokio::test]
    async fn test_first_event_links_to_genesis() {
        let log = log();
        let event = log
            .append(AuditEventType::AgentCreated, json!({"agentId": 1}))
            .await
            .unwrap();
        assert_eq!(event.prev_hash, GENESIS);
        assert_eq!(event.event_type, "AGENT_CREATED");
        assert_eq!(event.data["data"]["agentId"], 1);
    }

    #[tokio::test]
    async fn test_chain_links_and_verifies() {
        let log = log();
        let first = log
            .append(AuditEventType::RequestCreated, json!({"requestId": 1}))
            .await
            .unwrap();
        let second = log
            .append(AuditEventType::DryRunComplete, json!({"planId": 1}))
            .await
            .unwrap();
        assert_eq!(second.prev_hash, first.event_hash);

        let verification = log.verify().await.unwrap();
        assert!(verification.valid);
        assert_eq!(verification.length, 2);
    }

    #[tokio::test]
    async fn test_hash_matches_specified_formula() {
        let log = log();
        let event = log
            .append(AuditEventType::SettingUpdated, json!({"key": "safe_mode"}))
            .await
            .unwrap();
        let expected = sha256_hex(&format!("{GENESIS}{}", canonical_json(&event.data)));
        assert_eq!(event.event_hash, expected);
    }

    #[tokio::test]
    async fn test_forged_event_breaks_verification() {
        let store = Arc::new(Store::in_memory());
        let log = AuditLog::new(Arc::clone(&store));
        log.append(AuditEventType::AgentCreated, json!({"agentId": 1}))
            .await
            .unwrap();
        let earlier = log
            .append(AuditEventType::AgentKeyRotated, json!({"agentId": 1}))
            .await
            .unwrap();
        log.append(AuditEventType::SafeModeChanged, json!({"enabled": true}))
            .await
            .unwrap();

        // Write an event behind the log's back: it reuses an old prev_hash
        // and carries altered data, so both the link and the hash fail.
        let mut forged = earlier.clone();
        forged.data["data"]["agentId"] = json!(999);
        store
            .insert_audit_event(
                &forged.prev_hash,
                &forged.event_hash,
                &forged.event_type,
                forged.data.clone(),
            )
            .await
            .unwrap();

        let verification = log.verify().await.unwrap();
        assert!(!verification.valid);
        assert!(verification.broken_at.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_appends_stay_linear() {
        let log = Arc::new(log());
        let mut handles = Vec::new();
        for i in 0..16 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                log.append(AuditEventType::RequestCreated, json!({"i": i}))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let verification = log.verify().await.unwrap();
        assert!(verification.valid);
        assert_eq!(verification.length, 16);
    }
}
