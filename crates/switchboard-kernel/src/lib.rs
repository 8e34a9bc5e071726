//! The Switchboard kernel: everything between the wire and the effectors.
//!
//! The [`Kernel`] owns the store, the audit log, the effector registry,
//! and the rate-limit policy, and drives the request state machine:
//!
//! ```text
//! pending -> planned -> (approved | rejected) -> (executed | failed)
//! ```
//!
//! Validation and state errors surface to the caller without mutating
//! anything; every successful transition emits exactly one audit event;
//! execution is gated on ownership, approval, and a recomputed plan hash.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod admin;
mod auth;
mod error;
mod orchestrator;
mod ratelimit;
pub mod settings;

pub use admin::AgentWithCapabilities;
pub use orchestrator::{DryRunOutcome, LockdownOutcome};
pub use ratelimit::{NoopRateLimiter, RateLimiter};
pub use settings::Settings;

use std::sync::Arc;

use switchboard_audit::AuditLog;
use switchboard_effectors::EffectorRegistry;
use switchboard_storage::Store;

/// The assembled control plane core.
pub struct Kernel {
    store: Arc<Store>,
    audit: Arc<AuditLog>,
    registry: Arc<EffectorRegistry>,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel").finish_non_exhaustive()
    }
}

impl Kernel {
    /// Assemble a kernel with the built-in effectors and no rate limiting.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_parts(
            store,
            Arc::new(EffectorRegistry::with_builtins()),
            Arc::new(NoopRateLimiter),
        )
    }

    /// Assemble a kernel from explicit parts.
    #[must_use]
    pub fn with_parts(
        store: Arc<Store>,
        registry: Arc<EffectorRegistry>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        let audit = Arc::new(AuditLog::new(Arc::clone(&store)));
        Self {
            store,
            audit,
            registry,
            rate_limiter,
        }
    }

    /// The entity store.
    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The audit log.
    #[must_use]
    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// The effector registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<EffectorRegistry> {
        &self.registry
    }
}
