//! Shared fixtures for the integration suite.

#![deny(unsafe_code)]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use switchboard_core::{AdminUser, Agent, CapabilityType};
use switchboard_kernel::Kernel;
use switchboard_kernel::settings::{ALLOWED_ROOTS, SAFE_MODE, SHELL_ALLOWLIST};
use switchboard_storage::Store;

/// A kernel wired to an in-memory store with one agent, one admin, and a
/// temp-dir sandbox as the only allowed root.
pub struct TestBed {
    /// The assembled kernel.
    pub kernel: Kernel,
    /// The seeded agent (all capabilities enabled).
    pub agent: Agent,
    /// The agent's plaintext API key.
    pub agent_key: String,
    /// The seeded admin.
    pub admin: AdminUser,
    /// The sandbox directory; dropped with the bed.
    pub sandbox: TempDir,
}

impl TestBed {
    /// Build a fresh bed. Shell allowlist defaults to `.*` (everything
    /// matches); tighten per test via `update_setting`.
    pub async fn new() -> Self {
        let sandbox = tempfile::tempdir().expect("tempdir");
        let kernel = Kernel::new(Arc::new(Store::in_memory()));

        let (agent, agent_key) = kernel.create_agent("integration-agent").await.unwrap();
        for capability in [
            CapabilityType::Filesystem,
            CapabilityType::Shell,
            CapabilityType::Network,
            CapabilityType::Echo,
        ] {
            kernel
                .update_capability(agent.id, capability, true, None)
                .await
                .unwrap();
        }

        kernel
            .update_setting(ALLOWED_ROOTS, json!([sandbox.path().display().to_string()]))
            .await
            .unwrap();
        kernel
            .update_setting(SHELL_ALLOWLIST, json!([".*"]))
            .await
            .unwrap();
        kernel.update_setting(SAFE_MODE, json!(false)).await.unwrap();

        let admin = kernel.ensure_admin("admin", "correct horse").await.unwrap();

        Self {
            kernel,
            agent,
            agent_key,
            admin,
            sandbox,
        }
    }

    /// Absolute path of a file inside the sandbox.
    #[must_use]
    pub fn sandbox_file(&self, name: &str) -> String {
        self.sandbox.path().join(name).display().to_string()
    }
}
