//! Admin-surface operations: agents, capabilities, settings, audit views.

use serde::Serialize;
use serde_json::{Map, Value, json};

use switchboard_audit::{AuditEventType, ChainVerification};
use switchboard_core::{
    ActionRequest, AdminUser, Agent, AgentCapability, AgentId, ApiError, ApiResult, AuditEvent,
    CapabilityType, Plan, RequestId, RequestStatus, Setting,
};
use switchboard_crypto::{generate_api_key, hash_api_key, hash_password};

use crate::Kernel;
use crate::error::{map_audit, map_storage};
use crate::settings::validate_setting;

/// An agent joined with its capability grants, for the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentWithCapabilities {
    /// The agent.
    #[serde(flatten)]
    pub agent: Agent,
    /// Its capability grants.
    pub capabilities: Vec<AgentCapability>,
}

impl Kernel {
    /// Create an agent and return it with its one-time plaintext key.
    ///
    /// # Errors
    ///
    /// Returns CONFLICT when the name is taken.
    pub async fn create_agent(&self, name: &str) -> ApiResult<(Agent, String)> {
        if name.trim().is_empty() {
            return Err(ApiError::validation("agent name must not be empty"));
        }
        let plaintext = generate_api_key();
        let agent = self
            .store()
            .insert_agent(name.trim(), &hash_api_key(&plaintext))
            .await
            .map_err(map_storage)?;

        self.audit()
            .append(
                AuditEventType::AgentCreated,
                json!({ "agentId": agent.id, "name": agent.name }),
            )
            .await
            .map_err(map_audit)?;
        tracing::info!(agent = %agent.name, id = %agent.id, "agent created");
        Ok((agent, plaintext))
    }

    /// Replace an agent's API key; returns the new plaintext once.
    ///
    /// # Errors
    ///
    /// Returns NOT_FOUND for an unknown agent.
    pub async fn rotate_agent_key(&self, agent_id: AgentId) -> ApiResult<(Agent, String)> {
        let mut agent = self
            .store()
            .get_agent(agent_id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::not_found(format!("agent {agent_id}")))?;

        let plaintext = generate_api_key();
        agent.api_key_hash = hash_api_key(&plaintext);
        self.store().update_agent(&agent).await.map_err(map_storage)?;

        self.audit()
            .append(
                AuditEventType::AgentKeyRotated,
                json!({ "agentId": agent.id, "name": agent.name }),
            )
            .await
            .map_err(map_audit)?;
        Ok((agent, plaintext))
    }

    /// All agents with their capability grants.
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if the store fails.
    pub async fn list_agents_with_capabilities(&self) -> ApiResult<Vec<AgentWithCapabilities>> {
        let agents = self.store().list_agents().await.map_err(map_storage)?;
        let mut out = Vec::with_capacity(agents.len());
        for agent in agents {
            let capabilities = self
                .store()
                .list_capabilities(agent.id)
                .await
                .map_err(map_storage)?;
            out.push(AgentWithCapabilities {
                agent,
                capabilities,
            });
        }
        Ok(out)
    }

    /// Enable or disable a capability for an agent, optionally replacing
    /// its config. Missing config falls back to the effector default.
    ///
    /// # Errors
    ///
    /// Returns NOT_FOUND for an unknown agent.
    pub async fn update_capability(
        &self,
        agent_id: AgentId,
        capability_type: CapabilityType,
        enabled: bool,
        config: Option<Map<String, Value>>,
    ) -> ApiResult<AgentCapability> {
        self.store()
            .get_agent(agent_id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::not_found(format!("agent {agent_id}")))?;

        let config = match config {
            Some(config) => config,
            None => match self
                .store()
                .get_capability(agent_id, capability_type)
                .await
                .map_err(map_storage)?
            {
                Some(existing) => existing.config,
                None => self
                    .registry()
                    .get(capability_type)
                    .map(|e| e.default_config())
                    .unwrap_or_default(),
            },
        };

        let capability = self
            .store()
            .upsert_capability(agent_id, capability_type, enabled, config)
            .await
            .map_err(map_storage)?;

        self.audit()
            .append(
                AuditEventType::CapabilityUpdated,
                json!({
                    "agentId": agent_id,
                    "type": capability_type.as_str(),
                    "enabled": enabled,
                }),
            )
            .await
            .map_err(map_audit)?;
        Ok(capability)
    }

    /// Upsert a setting after shape validation.
    ///
    /// # Errors
    ///
    /// Returns VALIDATION when a recognized key carries the wrong shape.
    pub async fn update_setting(&self, key: &str, value: Value) -> ApiResult<Setting> {
        validate_setting(key, &value)?;
        self.store()
            .set_setting(key, &value)
            .await
            .map_err(map_storage)?;
        self.audit()
            .append(
                AuditEventType::SettingUpdated,
                json!({ "key": key, "value": value }),
            )
            .await
            .map_err(map_audit)?;
        Ok(Setting {
            key: key.to_string(),
            value,
        })
    }

    /// All settings.
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if the store fails.
    pub async fn list_settings(&self) -> ApiResult<Vec<Setting>> {
        self.store().list_settings().await.map_err(map_storage)
    }

    /// One setting by key.
    ///
    /// # Errors
    ///
    /// Returns NOT_FOUND when the key is unset.
    pub async fn get_setting(&self, key: &str) -> ApiResult<Setting> {
        let value = self
            .store()
            .get_setting(key)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::not_found(format!("setting {key}")))?;
        Ok(Setting {
            key: key.to_string(),
            value,
        })
    }

    /// Requests for the admin view, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if the store fails.
    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> ApiResult<Vec<ActionRequest>> {
        self.store().list_requests(status).await.map_err(map_storage)
    }

    /// A request with all of its plans.
    ///
    /// # Errors
    ///
    /// Returns NOT_FOUND for an unknown request.
    pub async fn request_detail(
        &self,
        request_id: RequestId,
    ) -> ApiResult<(ActionRequest, Vec<Plan>)> {
        let request = self
            .store()
            .get_request(request_id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::not_found(format!("request {request_id}")))?;
        let plans = self
            .store()
            .list_plans_for_request(request_id)
            .await
            .map_err(map_storage)?;
        Ok((request, plans))
    }

    /// All audit events, chain order.
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if the store fails.
    pub async fn list_audit_events(&self) -> ApiResult<Vec<AuditEvent>> {
        self.audit().list().await.map_err(map_audit)
    }

    /// Verify the audit chain end to end.
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if events cannot be read.
    pub async fn verify_audit_chain(&self) -> ApiResult<ChainVerification> {
        self.audit().verify().await.map_err(map_audit)
    }

    /// Ensure an admin account exists, creating it when missing.
    ///
    /// Used by startup seeding; does not audit (the process is booting).
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if hashing or the store fails.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> ApiResult<AdminUser> {
        if let Some(existing) = self
            .store()
            .find_user_by_username(username)
            .await
            .map_err(map_storage)?
        {
            return Ok(existing);
        }
        let hash = hash_password(password).map_err(|e| ApiError::internal(e.to_string()))?;
        self.store()
            .insert_user(username, &hash)
            .await
            .map_err(map_storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use switchboard_core::ErrorKind;
    use switchboard_storage::Store;

    fn kernel() -> Kernel {
        Kernel::new(Arc::new(Store::in_memory()))
    }

    #[tokio::test]
    async fn test_create_agent_returns_plaintext_once() {
        let kernel = kernel();
        let (agent, key) = kernel.create_agent("scout").await.unwrap();
        assert!(key.starts_with("sk_agent_"));
        assert_ne!(agent.api_key_hash, key);

        let err = kernel.create_agent("scout").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_rotate_key_invalidates_old_key() {
        let kernel = kernel();
        let (agent, old_key) = kernel.create_agent("scout").await.unwrap();
        let (rotated, new_key) = kernel.rotate_agent_key(agent.id).await.unwrap();
        assert_ne!(old_key, new_key);
        assert_ne!(agent.api_key_hash, rotated.api_key_hash);

        assert!(kernel.authenticate_agent(&old_key).await.is_err());
        assert!(kernel.authenticate_agent(&new_key).await.is_ok());
    }

    #[tokio::test]
    async fn test_capability_update_audits() {
        let kernel = kernel();
        let (agent, _) = kernel.create_agent("scout").await.unwrap();
        let capability = kernel
            .update_capability(agent.id, CapabilityType::Filesystem, true, None)
            .await
            .unwrap();
        assert!(capability.enabled);

        let events = kernel.audit().list().await.unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["AGENT_CREATED", "CAPABILITY_UPDATED"]);
    }

    #[tokio::test]
    async fn test_update_setting_rejects_bad_shape() {
        let kernel = kernel();
        let err = kernel
            .update_setting("safe_mode", json!("definitely"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        // Nothing persisted, nothing audited.
        assert!(kernel.store().get_setting("safe_mode").await.unwrap().is_none());
        assert!(kernel.audit().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let kernel = kernel();
        let first = kernel.ensure_admin("admin", "pw").await.unwrap();
        let second = kernel.ensure_admin("admin", "other").await.unwrap();
        assert_eq!(first.id, second.id);
    }
}
