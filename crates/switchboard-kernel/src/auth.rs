//! Agent and admin authentication.

use serde_json::json;

use switchboard_audit::AuditEventType;
use switchboard_core::{AdminUser, Agent, ApiError, ApiResult, now_utc};
use switchboard_crypto::{verify_api_key, verify_password};

use crate::Kernel;
use crate::error::{map_audit, map_storage};

impl Kernel {
    /// Authenticate an agent by its plaintext API key.
    ///
    /// Hashes the presented key and scans all agents, comparing digests
    /// in constant time. The linear scan is deliberate for the
    /// local-first workload. Refreshes `last_seen_at` on success.
    ///
    /// # Errors
    ///
    /// Returns AUTHENTICATION when no agent matches.
    pub async fn authenticate_agent(&self, presented_key: &str) -> ApiResult<Agent> {
        let agents = self.store().list_agents().await.map_err(map_storage)?;
        let matched = agents
            .into_iter()
            .find(|agent| verify_api_key(presented_key, &agent.api_key_hash));

        let Some(mut agent) = matched else {
            return Err(ApiError::authentication("invalid agent API key"));
        };

        agent.last_seen_at = Some(now_utc());
        self.store().update_agent(&agent).await.map_err(map_storage)?;
        Ok(agent)
    }

    /// Authenticate an admin by username and password.
    ///
    /// Emits `ADMIN_LOGIN` on success.
    ///
    /// # Errors
    ///
    /// Returns AUTHENTICATION on unknown user or wrong password.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AdminUser> {
        let user = self
            .store()
            .find_user_by_username(username)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::authentication("invalid credentials"))?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        if !valid {
            return Err(ApiError::authentication("invalid credentials"));
        }

        self.audit()
            .append(
                AuditEventType::AdminLogin,
                json!({ "userId": user.id, "username": user.username }),
            )
            .await
            .map_err(map_audit)?;
        tracing::info!(username = %user.username, "admin logged in");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use switchboard_crypto::{generate_api_key, hash_api_key, hash_password};
    use switchboard_storage::Store;

    async fn kernel_with_agent() -> (Kernel, String) {
        let store = Arc::new(Store::in_memory());
        let key = generate_api_key();
        store
            .insert_agent("scout", &hash_api_key(&key))
            .await
            .unwrap();
        (Kernel::new(store), key)
    }

    #[tokio::test]
    async fn test_agent_auth_round_trip() {
        let (kernel, key) = kernel_with_agent().await;
        let agent = kernel.authenticate_agent(&key).await.unwrap();
        assert_eq!(agent.name, "scout");
        assert!(agent.last_seen_at.is_some());
    }

    #[tokio::test]
    async fn test_agent_auth_rejects_wrong_key() {
        let (kernel, _key) = kernel_with_agent().await;
        let err = kernel
            .authenticate_agent("sk_agent_0000000000000000")
            .await
            .unwrap_err();
        assert_eq!(err.kind, switchboard_core::ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_admin_login_audits() {
        let store = Arc::new(Store::in_memory());
        store
            .insert_user("admin", &hash_password("pw").unwrap())
            .await
            .unwrap();
        let kernel = Kernel::new(store);

        assert!(kernel.login("admin", "wrong").await.is_err());
        let user = kernel.login("admin", "pw").await.unwrap();
        assert_eq!(user.username, "admin");

        let events = kernel.audit().list().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "ADMIN_LOGIN");
    }
}
