//! The request orchestrator: request -> plan -> approval -> execution.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use switchboard_audit::AuditEventType;
use switchboard_core::{
    ActionInput, ActionRequest, AgentId, ApiError, ApiResult, ApprovalDecision, CapabilityType,
    ExecutionReceipt, PlanId, PlanStep, ReceiptStatus, RequestId, RequestStatus, StepStatus,
    UserId,
};
use switchboard_crypto::{canonical_json, sha256_hex};
use switchboard_effectors::{Effector, EffectorContext};
use switchboard_risk::{RiskSummary, score_plan, score_step};

use crate::Kernel;
use crate::error::{map_audit, map_effector, map_storage};
use crate::settings::{SAFE_MODE, Settings};

/// What a dry run hands back to the agent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunOutcome {
    /// The persisted plan id.
    pub plan_id: PlanId,
    /// The annotated steps, exactly as hashed and stored.
    pub steps: Vec<PlanStep>,
    /// Aggregate risk score.
    pub risk_score: u8,
    /// Aggregate risk view.
    pub risk_summary: RiskSummary,
}

/// Result of an emergency lockdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockdownOutcome {
    /// How many agents had their keys revoked.
    pub agents_affected: usize,
    /// Safe mode state after lockdown (always true).
    pub safe_mode: bool,
}

/// SHA-256 over the canonical JSON of the step list.
fn plan_hash_of(steps: &[PlanStep]) -> ApiResult<String> {
    let value = serde_json::to_value(steps)
        .map_err(|e| ApiError::internal(format!("step serialization failed: {e}")))?;
    Ok(sha256_hex(&canonical_json(&value)))
}

/// Short human-readable line for the admin request list.
fn summarize(action: &ActionInput) -> String {
    let detail = match action.capability_type {
        CapabilityType::Filesystem => action
            .params
            .get("path")
            .or_else(|| action.params.get("from"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string(),
        CapabilityType::Shell => action
            .params
            .get("command")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string(),
        CapabilityType::Network => {
            let count = action
                .params
                .get("domains")
                .and_then(serde_json::Value::as_array)
                .map_or(0, Vec::len);
            format!("{count} domain(s)")
        }
        CapabilityType::Echo => String::new(),
    };
    let base = format!("{} {}", action.capability_type, action.operation);
    if detail.is_empty() {
        base
    } else {
        format!("{base} {detail}")
    }
}

impl Kernel {
    /// The effector for a capability the agent is allowed to use.
    async fn require_capability(
        &self,
        agent_id: AgentId,
        capability_type: CapabilityType,
    ) -> ApiResult<Arc<dyn Effector>> {
        let effector = self.registry().get(capability_type).ok_or_else(|| {
            ApiError::authorization(format!("capability {capability_type} is not available"))
        })?;
        let enabled = self
            .store()
            .get_capability(agent_id, capability_type)
            .await
            .map_err(map_storage)?
            .is_some_and(|c| c.enabled);
        if !enabled {
            return Err(ApiError::authorization(format!(
                "capability {capability_type} is not enabled for this agent"
            )));
        }
        Ok(effector)
    }

    async fn effector_context(
        &self,
        agent_id: AgentId,
        request_id: RequestId,
    ) -> ApiResult<EffectorContext> {
        let settings = Settings::load(self.store()).await?;
        Ok(EffectorContext {
            allowed_roots: settings.allowed_roots,
            shell_allow_list: settings.shell_allowlist,
            safe_mode_enabled: settings.safe_mode,
            agent_id,
            request_id,
        })
    }

    /// Accept an action request from an agent.
    ///
    /// Validation failures reject the request without persisting anything.
    ///
    /// # Errors
    ///
    /// AUTHORIZATION when the capability is absent or disabled,
    /// RATE_LIMIT per policy, VALIDATION on bad input.
    pub async fn create_request(
        &self,
        agent_id: AgentId,
        action: ActionInput,
        reasoning_trace: Option<String>,
    ) -> ApiResult<ActionRequest> {
        self.rate_limiter.check(agent_id)?;
        let effector = self
            .require_capability(agent_id, action.capability_type)
            .await?;

        let outcome = effector.validate_request(&action.operation, &action.params);
        if !outcome.valid {
            return Err(ApiError::validation(outcome.errors.join("; ")));
        }

        let summary = summarize(&action);
        let request = self
            .store()
            .insert_request(agent_id, &summary, action, reasoning_trace)
            .await
            .map_err(map_storage)?;

        self.audit()
            .append(
                AuditEventType::RequestCreated,
                json!({
                    "requestId": request.id,
                    "agentId": agent_id,
                    "type": request.input.capability_type.as_str(),
                    "operation": request.input.operation,
                }),
            )
            .await
            .map_err(map_audit)?;
        tracing::info!(request = %request.id, agent = %agent_id, "action request created");
        Ok(request)
    }

    /// Plan a request: run the effector's dry run, annotate risk, hash
    /// the steps, persist the plan, and move the request to `planned`.
    ///
    /// A repeated dry run supersedes the earlier plan.
    ///
    /// # Errors
    ///
    /// NOT_FOUND, AUTHORIZATION (wrong agent or capability now disabled),
    /// STATE (already decided or terminal), VALIDATION.
    pub async fn dry_run(&self, agent_id: AgentId, request_id: RequestId) -> ApiResult<DryRunOutcome> {
        let request = self
            .store()
            .get_request(request_id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::not_found(format!("request {request_id}")))?;
        if request.agent_id != agent_id {
            return Err(ApiError::authorization("request belongs to another agent"));
        }
        if !matches!(
            request.status,
            RequestStatus::Pending | RequestStatus::Planned
        ) {
            return Err(ApiError::state(format!(
                "cannot dry-run a request in status {}",
                request.status
            )));
        }

        let effector = self
            .require_capability(agent_id, request.input.capability_type)
            .await?;
        let outcome =
            effector.validate_request(&request.input.operation, &request.input.params);
        let Some(normalized) = outcome.normalized else {
            return Err(ApiError::validation(outcome.errors.join("; ")));
        };

        let ctx = self.effector_context(agent_id, request_id).await?;
        // Effector code runs in its own task so a panic surfaces as
        // INTERNAL instead of tearing down the handler.
        let mut steps = {
            let effector = Arc::clone(&effector);
            let ctx = ctx.clone();
            let normalized = normalized.clone();
            match tokio::spawn(async move { effector.dry_run(&ctx, &normalized).await }).await {
                Ok(outcome) => outcome.map_err(map_effector)?,
                Err(e) => {
                    return Err(ApiError::internal(format!("effector panicked: {e}")));
                }
            }
        };

        for step in &mut steps {
            let scored = score_step(step);
            for flag in scored.flags {
                step.add_flag(flag);
            }
            step.risk_score = Some(scored.score);
        }

        let plan_hash = plan_hash_of(&steps)?;
        let risk_summary = score_plan(&steps);
        let plan = self
            .store()
            .insert_plan(
                request_id,
                &plan_hash,
                steps.clone(),
                risk_summary.total_risk_score,
            )
            .await
            .map_err(map_storage)?;

        let moved = self
            .store()
            .transition_request(request_id, request.status, RequestStatus::Planned)
            .await
            .map_err(map_storage)?;
        if moved.is_none() {
            return Err(ApiError::state("request status changed concurrently"));
        }

        self.audit()
            .append(
                AuditEventType::DryRunComplete,
                json!({
                    "requestId": request_id,
                    "planId": plan.id,
                    "planHash": plan.plan_hash,
                    "riskScore": risk_summary.total_risk_score,
                    "stepCount": plan.steps.len(),
                }),
            )
            .await
            .map_err(map_audit)?;

        Ok(DryRunOutcome {
            plan_id: plan.id,
            steps,
            risk_score: risk_summary.total_risk_score,
            risk_summary,
        })
    }

    /// Record an admin decision on a plan and move its request to
    /// `approved` or `rejected`.
    ///
    /// # Errors
    ///
    /// NOT_FOUND for an unknown plan, CONFLICT when the plan was already
    /// decided, STATE when the request never reached `planned`.
    pub async fn approve_plan(
        &self,
        admin_user_id: UserId,
        plan_id: PlanId,
        decision: ApprovalDecision,
    ) -> ApiResult<ActionRequest> {
        let plan = self
            .store()
            .get_plan(plan_id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::not_found(format!("plan {plan_id}")))?;
        let request = self
            .store()
            .get_request(plan.request_id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::internal("plan has no owning request"))?;

        match request.status {
            RequestStatus::Planned => {}
            RequestStatus::Approved | RequestStatus::Rejected => {
                return Err(ApiError::conflict(format!(
                    "plan was already decided (request is {})",
                    request.status
                )));
            }
            other => {
                return Err(ApiError::state(format!(
                    "cannot decide a request in status {other}"
                )));
            }
        }

        let next = match decision {
            ApprovalDecision::Approved => RequestStatus::Approved,
            ApprovalDecision::Rejected => RequestStatus::Rejected,
        };
        let moved = self
            .store()
            .transition_request(request.id, RequestStatus::Planned, next)
            .await
            .map_err(map_storage)?;
        let Some(updated) = moved else {
            // Another decision raced us between the read and the swap.
            return Err(ApiError::conflict("plan was already decided"));
        };

        self.store()
            .insert_approval(plan_id, admin_user_id, decision)
            .await
            .map_err(map_storage)?;

        self.audit()
            .append(
                AuditEventType::PlanDecision,
                json!({
                    "planId": plan_id,
                    "requestId": request.id,
                    "decision": decision,
                    "approvedBy": admin_user_id,
                }),
            )
            .await
            .map_err(map_audit)?;
        tracing::info!(plan = %plan_id, ?decision, "plan decision recorded");
        Ok(updated)
    }

    /// Execute an approved plan.
    ///
    /// The plan hash is recomputed from the stored steps after the plan
    /// row is fetched; any divergence from the hash bonded at planning
    /// time is an INTEGRITY failure and nothing executes.
    ///
    /// # Errors
    ///
    /// NOT_FOUND, AUTHORIZATION, STATE (not approved), INTEGRITY
    /// (tampered steps), INTERNAL (effector failure; a failure receipt is
    /// still recorded).
    pub async fn execute_plan(
        &self,
        agent_id: AgentId,
        plan_id: PlanId,
    ) -> ApiResult<ExecutionReceipt> {
        let plan = self
            .store()
            .get_plan(plan_id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::not_found(format!("plan {plan_id}")))?;
        let request = self
            .store()
            .get_request(plan.request_id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| ApiError::internal("plan has no owning request"))?;

        if request.agent_id != agent_id {
            return Err(ApiError::authorization("plan belongs to another agent"));
        }
        if request.status != RequestStatus::Approved {
            return Err(ApiError::state(format!(
                "plan is not approved (request is {})",
                request.status
            )));
        }

        let recomputed = plan_hash_of(&plan.steps)?;
        if recomputed != plan.plan_hash {
            tracing::warn!(plan = %plan_id, "plan hash mismatch at execution");
            return Err(ApiError::integrity("plan hash mismatch"));
        }

        let effector = self
            .require_capability(agent_id, request.input.capability_type)
            .await?;
        let ctx = self.effector_context(agent_id, request.id).await?;

        let outcome: Result<Vec<switchboard_core::StepResult>, String> = {
            let effector = Arc::clone(&effector);
            let ctx = ctx.clone();
            let steps = plan.steps.clone();
            match tokio::spawn(async move { effector.execute(&ctx, &steps).await }).await {
                Ok(Ok(results)) => Ok(results),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(format!("effector panicked: {e}")),
            }
        };
        let results = match outcome {
            Ok(results) => results,
            Err(e) => {
                // Execution blew up: the trail still gets a receipt and an
                // audit event before the error surfaces.
                let receipt = self
                    .store()
                    .insert_receipt(plan_id, ReceiptStatus::Failure, Vec::new())
                    .await
                    .map_err(map_storage)?;
                self.store()
                    .transition_request(
                        request.id,
                        RequestStatus::Approved,
                        RequestStatus::Failed,
                    )
                    .await
                    .map_err(map_storage)?;
                self.audit()
                    .append(
                        AuditEventType::PlanExecuted,
                        json!({
                            "planId": plan_id,
                            "requestId": request.id,
                            "receiptId": receipt.id,
                            "status": ReceiptStatus::Failure,
                            "error": e,
                        }),
                    )
                    .await
                    .map_err(map_audit)?;
                return Err(ApiError::internal(e));
            }
        };

        let any_success = results.iter().any(|r| r.status == StepStatus::Success);
        let all_success = results.iter().all(|r| r.status == StepStatus::Success);
        let receipt_status = if all_success {
            ReceiptStatus::Success
        } else if any_success {
            ReceiptStatus::PartialFailure
        } else {
            ReceiptStatus::Failure
        };
        let next_status = if any_success {
            RequestStatus::Executed
        } else {
            RequestStatus::Failed
        };

        let receipt = self
            .store()
            .insert_receipt(plan_id, receipt_status, results)
            .await
            .map_err(map_storage)?;
        self.store()
            .transition_request(request.id, RequestStatus::Approved, next_status)
            .await
            .map_err(map_storage)?;

        self.audit()
            .append(
                AuditEventType::PlanExecuted,
                json!({
                    "planId": plan_id,
                    "requestId": request.id,
                    "receiptId": receipt.id,
                    "status": receipt_status,
                    "stepCount": receipt.logs.len(),
                }),
            )
            .await
            .map_err(map_audit)?;
        tracing::info!(plan = %plan_id, status = ?receipt_status, "plan executed");
        Ok(receipt)
    }

    /// Toggle safe mode.
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if the store or audit log fails.
    pub async fn set_safe_mode(&self, admin_user_id: UserId, enabled: bool) -> ApiResult<()> {
        self.store()
            .set_setting(SAFE_MODE, &json!(enabled))
            .await
            .map_err(map_storage)?;
        self.audit()
            .append(
                AuditEventType::SafeModeChanged,
                json!({ "enabled": enabled, "changedBy": admin_user_id }),
            )
            .await
            .map_err(map_audit)?;
        tracing::warn!(enabled, "safe mode changed");
        Ok(())
    }

    /// Emergency lockdown: enable safe mode and revoke every agent key.
    ///
    /// The fresh keys are generated and hashed but the plaintexts are
    /// dropped on the floor — existing agents are locked out until an
    /// admin rotates their keys individually.
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if the store or audit log fails.
    pub async fn emergency_lockdown(&self, admin_user_id: UserId) -> ApiResult<LockdownOutcome> {
        self.store()
            .set_setting(SAFE_MODE, &json!(true))
            .await
            .map_err(map_storage)?;

        let agents = self.store().list_agents().await.map_err(map_storage)?;
        let mut affected = 0;
        for mut agent in agents {
            let revoked = switchboard_crypto::generate_api_key();
            agent.api_key_hash = switchboard_crypto::hash_api_key(&revoked);
            self.store().update_agent(&agent).await.map_err(map_storage)?;
            affected += 1;
        }

        self.audit()
            .append(
                AuditEventType::EmergencyLockdown,
                json!({
                    "severity": "critical",
                    "agentsAffected": affected,
                    "triggeredBy": admin_user_id,
                }),
            )
            .await
            .map_err(map_audit)?;
        tracing::error!(agents_affected = affected, "emergency lockdown engaged");

        Ok(LockdownOutcome {
            agents_affected: affected,
            safe_mode: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Arc;
    use switchboard_core::ErrorKind;
    use switchboard_storage::Store;

    use crate::settings::ALLOWED_ROOTS;

    async fn kernel_with_sandbox(root: &std::path::Path) -> (Kernel, AgentId, UserId) {
        let store = Arc::new(Store::in_memory());
        let kernel = Kernel::new(store);
        let (agent, _) = kernel.create_agent("scout").await.unwrap();
        kernel
            .update_capability(agent.id, CapabilityType::Filesystem, true, None)
            .await
            .unwrap();
        kernel
            .update_setting(ALLOWED_ROOTS, json!([root.display().to_string()]))
            .await
            .unwrap();
        let admin = kernel.ensure_admin("admin", "pw").await.unwrap();
        (kernel, agent.id, admin.id)
    }

    fn read_action(path: &std::path::Path) -> ActionInput {
        ActionInput {
            capability_type: CapabilityType::Filesystem,
            operation: "read".into(),
            params: json!({"path": path.display().to_string()}),
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle_read() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.txt");
        std::fs::write(&file, "hello").unwrap();
        let (kernel, agent_id, admin_id) = kernel_with_sandbox(dir.path()).await;

        let request = kernel
            .create_request(agent_id, read_action(&file), None)
            .await
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        let outcome = kernel.dry_run(agent_id, request.id).await.unwrap();
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.risk_score, 5);
        assert_eq!(
            kernel.store().get_request(request.id).await.unwrap().unwrap().status,
            RequestStatus::Planned
        );

        kernel
            .approve_plan(admin_id, outcome.plan_id, ApprovalDecision::Approved)
            .await
            .unwrap();

        let receipt = kernel.execute_plan(agent_id, outcome.plan_id).await.unwrap();
        assert_eq!(receipt.status, ReceiptStatus::Success);
        assert!(receipt.logs[0].output.as_deref().unwrap().starts_with("hello"));
        assert_eq!(
            kernel.store().get_request(request.id).await.unwrap().unwrap().status,
            RequestStatus::Executed
        );

        let types: Vec<String> = kernel
            .audit()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert!(types.ends_with(&[
            "REQUEST_CREATED".to_string(),
            "DRY_RUN_COMPLETE".to_string(),
            "PLAN_DECISION".to_string(),
            "PLAN_EXECUTED".to_string(),
        ]));
    }

    #[tokio::test]
    async fn test_capability_gate() {
        let dir = tempfile::tempdir().unwrap();
        let (kernel, agent_id, _) = kernel_with_sandbox(dir.path()).await;

        let action = ActionInput {
            capability_type: CapabilityType::Shell,
            operation: "run".into(),
            params: json!({"command": "ls"}),
        };
        let err = kernel.create_request(agent_id, action, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_validation_rejects_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let (kernel, agent_id, _) = kernel_with_sandbox(dir.path()).await;

        let action = ActionInput {
            capability_type: CapabilityType::Filesystem,
            operation: "read".into(),
            params: json!({}),
        };
        let err = kernel.create_request(agent_id, action, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(kernel.list_requests(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_requires_approval() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.txt");
        std::fs::write(&file, "hello").unwrap();
        let (kernel, agent_id, _) = kernel_with_sandbox(dir.path()).await;

        let request = kernel
            .create_request(agent_id, read_action(&file), None)
            .await
            .unwrap();
        let outcome = kernel.dry_run(agent_id, request.id).await.unwrap();

        let err = kernel.execute_plan(agent_id, outcome.plan_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::State);
    }

    #[tokio::test]
    async fn test_double_decision_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.txt");
        std::fs::write(&file, "hello").unwrap();
        let (kernel, agent_id, admin_id) = kernel_with_sandbox(dir.path()).await;

        let request = kernel
            .create_request(agent_id, read_action(&file), None)
            .await
            .unwrap();
        let outcome = kernel.dry_run(agent_id, request.id).await.unwrap();
        kernel
            .approve_plan(admin_id, outcome.plan_id, ApprovalDecision::Approved)
            .await
            .unwrap();

        let err = kernel
            .approve_plan(admin_id, outcome.plan_id, ApprovalDecision::Approved)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_tampered_plan_is_integrity_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.txt");
        std::fs::write(&file, "hello").unwrap();
        let (kernel, agent_id, admin_id) = kernel_with_sandbox(dir.path()).await;

        let request = kernel
            .create_request(agent_id, read_action(&file), None)
            .await
            .unwrap();
        let outcome = kernel.dry_run(agent_id, request.id).await.unwrap();
        kernel
            .approve_plan(admin_id, outcome.plan_id, ApprovalDecision::Approved)
            .await
            .unwrap();

        // Tamper with the stored steps behind the orchestrator's back.
        let mut plan = kernel.store().get_plan(outcome.plan_id).await.unwrap().unwrap();
        plan.steps[0].description = "Read something else entirely".into();
        kernel.store().put_plan(&plan).await.unwrap();

        let audit_len_before = kernel.audit().list().await.unwrap().len();
        let err = kernel.execute_plan(agent_id, outcome.plan_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Integrity);

        // Request untouched, no receipt, no audit event for the attempt.
        assert_eq!(
            kernel.store().get_request(request.id).await.unwrap().unwrap().status,
            RequestStatus::Approved
        );
        assert!(
            kernel
                .store()
                .list_receipts_for_plan(outcome.plan_id)
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(kernel.audit().list().await.unwrap().len(), audit_len_before);
    }

    #[tokio::test]
    async fn test_lockdown_rotates_keys_and_sets_safe_mode() {
        let dir = tempfile::tempdir().unwrap();
        let (kernel, agent_id, admin_id) = kernel_with_sandbox(dir.path()).await;
        let before = kernel.store().get_agent(agent_id).await.unwrap().unwrap();

        let outcome = kernel.emergency_lockdown(admin_id).await.unwrap();
        assert_eq!(outcome.agents_affected, 1);

        let after = kernel.store().get_agent(agent_id).await.unwrap().unwrap();
        assert_ne!(before.api_key_hash, after.api_key_hash);

        let settings = Settings::load(kernel.store()).await.unwrap();
        assert!(settings.safe_mode);

        let events = kernel.audit().list().await.unwrap();
        let lockdown = events.last().unwrap();
        assert_eq!(lockdown.event_type, "EMERGENCY_LOCKDOWN");
        assert_eq!(lockdown.data["data"]["severity"], "critical");
        assert_eq!(lockdown.data["data"]["agentsAffected"], 1);
        assert!(kernel.verify_audit_chain().await.unwrap().valid);
    }

    #[tokio::test]
    async fn test_summary_lines() {
        let action = ActionInput {
            capability_type: CapabilityType::Filesystem,
            operation: "read".into(),
            params: json!({"path": "/tmp/sbx/x.txt"}),
        };
        assert_eq!(summarize(&action), "filesystem read /tmp/sbx/x.txt");

        let action = ActionInput {
            capability_type: CapabilityType::Network,
            operation: "allow".into(),
            params: json!({"domains": ["a.com", "b.com"]}),
        };
        assert_eq!(summarize(&action), "network allow 2 domain(s)");

        let action = ActionInput {
            capability_type: CapabilityType::Echo,
            operation: "echo".into(),
            params: Value::Null,
        };
        assert_eq!(summarize(&action), "echo echo");
    }
}
