//! Rate-limit policy seam.
//!
//! The control plane enforces rate limits as a policy collaborator: the
//! kernel asks, the policy answers. The default implementation never
//! limits; deployments can plug in a real policy without touching the
//! orchestrator. Note the check is read-then-act and so racy by one
//! request window — the consequence is one extra pending request, never
//! unauthorized execution, which is gated again at execute time.

use switchboard_core::{AgentId, ApiResult};

/// Decides whether an agent may submit another request right now.
pub trait RateLimiter: Send + Sync {
    /// Returns RATE_LIMIT when the agent should be throttled.
    ///
    /// # Errors
    ///
    /// Implementations return [`switchboard_core::ApiError`] with kind
    /// `RateLimit` to throttle.
    fn check(&self, agent_id: AgentId) -> ApiResult<()>;
}

/// The default policy: never limits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check(&self, _agent_id: AgentId) -> ApiResult<()> {
        Ok(())
    }
}
