//! The typed entity store.
//!
//! Every entity lives as a JSON value under its own namespace, keyed by
//! its decimal id. Ids are handed out by a sequence namespace and are
//! strictly monotonic per entity. Cross-entity scans (capability lookups,
//! latest plan, audit head) are linear — acceptable for the single-node,
//! local-first workload this store serves.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use switchboard_core::{
    ActionInput, ActionRequest, AdminUser, Agent, AgentCapability, AgentId, Approval,
    ApprovalDecision, ApprovalId, AuditEvent, AuditEventId, CapabilityType, ExecutionReceipt,
    Plan, PlanId, PlanStep, ReceiptId, ReceiptStatus, RequestId, RequestStatus, Setting,
    StepResult, UserId, now_utc,
};

use crate::error::{StorageError, StorageResult};
use crate::kv::{KvStore, MemoryKvStore, SurrealKvStore};

mod ns {
    pub const SEQ: &str = "seq";
    pub const AGENTS: &str = "agents";
    pub const CAPABILITIES: &str = "capabilities";
    pub const REQUESTS: &str = "requests";
    pub const PLANS: &str = "plans";
    pub const APPROVALS: &str = "approvals";
    pub const RECEIPTS: &str = "receipts";
    pub const SETTINGS: &str = "settings";
    pub const AUDIT: &str = "audit";
    pub const USERS: &str = "users";
}

/// The persistent entity store.
pub struct Store {
    kv: Arc<dyn KvStore>,
    /// Serializes id assignment, uniqueness checks, and conditional
    /// status transitions. Plain reads and unconditional writes do not
    /// take it.
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Build a store over an existing KV backend.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// In-memory store for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    /// Open a persistent store at the given directory path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the backend fails to open.
    pub fn open(path: impl AsRef<std::path::Path>) -> StorageResult<Self> {
        Ok(Self::new(Arc::new(SurrealKvStore::open(path)?)))
    }

    // -- JSON helpers --

    async fn put_json<T: Serialize>(&self, namespace: &str, key: &str, value: &T) -> StorageResult<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(namespace, key, bytes).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        namespace: &str,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let bytes = self.kv.get(namespace, key).await?;
        bytes
            .map(|b| {
                serde_json::from_slice(&b).map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .transpose()
    }

    /// All entities in a namespace, ascending by numeric key (= id order).
    async fn list_all<T: DeserializeOwned>(&self, namespace: &str) -> StorageResult<Vec<T>> {
        let mut ids: Vec<i64> = self
            .kv
            .list_keys(namespace)
            .await?
            .into_iter()
            .filter_map(|k| k.parse::<i64>().ok())
            .collect();
        ids.sort_unstable();

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entity) = self.get_json::<T>(namespace, &id.to_string()).await? {
                out.push(entity);
            }
        }
        Ok(out)
    }

    /// Next id for an entity. Callers must hold `write_lock`.
    async fn next_id_inner(&self, entity: &str) -> StorageResult<i64> {
        let current = self
            .kv
            .get(ns::SEQ, entity)
            .await?
            .and_then(|b| String::from_utf8(b).ok())
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(0);
        let next = current
            .checked_add(1)
            .ok_or_else(|| StorageError::Internal(format!("sequence overflow for {entity}")))?;
        self.kv
            .set(ns::SEQ, entity, next.to_string().into_bytes())
            .await?;
        Ok(next)
    }

    // -- Agents --

    /// Create an agent. The name must be unique.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] when the name is taken.
    pub async fn insert_agent(&self, name: &str, api_key_hash: &str) -> StorageResult<Agent> {
        let _guard = self.write_lock.lock().await;
        let existing: Vec<Agent> = self.list_all(ns::AGENTS).await?;
        if existing.iter().any(|a| a.name == name) {
            return Err(StorageError::Conflict(format!(
                "agent name already exists: {name}"
            )));
        }
        let agent = Agent {
            id: AgentId(self.next_id_inner("agents").await?),
            name: name.to_string(),
            api_key_hash: api_key_hash.to_string(),
            created_at: now_utc(),
            last_seen_at: None,
        };
        self.put_json(ns::AGENTS, &agent.id.to_string(), &agent)
            .await?;
        Ok(agent)
    }

    /// Fetch an agent by id.
    pub async fn get_agent(&self, id: AgentId) -> StorageResult<Option<Agent>> {
        self.get_json(ns::AGENTS, &id.to_string()).await
    }

    /// All agents, ascending by id.
    pub async fn list_agents(&self) -> StorageResult<Vec<Agent>> {
        self.list_all(ns::AGENTS).await
    }

    /// Overwrite an agent record (key rotation, last-seen refresh).
    pub async fn update_agent(&self, agent: &Agent) -> StorageResult<()> {
        self.put_json(ns::AGENTS, &agent.id.to_string(), agent).await
    }

    // -- Capabilities --

    fn capability_key(agent_id: AgentId, capability_type: CapabilityType) -> String {
        format!("{agent_id}:{capability_type}")
    }

    /// Create or update the `(agent, type)` capability grant.
    pub async fn upsert_capability(
        &self,
        agent_id: AgentId,
        capability_type: CapabilityType,
        enabled: bool,
        config: serde_json::Map<String, Value>,
    ) -> StorageResult<AgentCapability> {
        let _guard = self.write_lock.lock().await;
        let key = Self::capability_key(agent_id, capability_type);
        let existing: Option<AgentCapability> = self.get_json(ns::CAPABILITIES, &key).await?;
        let id = match existing {
            Some(cap) => cap.id,
            None => self.next_id_inner("capabilities").await?,
        };
        let capability = AgentCapability {
            id,
            agent_id,
            capability_type,
            enabled,
            config,
        };
        self.put_json(ns::CAPABILITIES, &key, &capability).await?;
        Ok(capability)
    }

    /// The `(agent, type)` grant, if present.
    pub async fn get_capability(
        &self,
        agent_id: AgentId,
        capability_type: CapabilityType,
    ) -> StorageResult<Option<AgentCapability>> {
        self.get_json(ns::CAPABILITIES, &Self::capability_key(agent_id, capability_type))
            .await
    }

    /// All grants for one agent.
    pub async fn list_capabilities(&self, agent_id: AgentId) -> StorageResult<Vec<AgentCapability>> {
        let keys = self.kv.list_keys(ns::CAPABILITIES).await?;
        let prefix = format!("{agent_id}:");
        let mut out = Vec::new();
        for key in keys {
            if key.starts_with(&prefix) {
                if let Some(cap) = self.get_json::<AgentCapability>(ns::CAPABILITIES, &key).await? {
                    out.push(cap);
                }
            }
        }
        out.sort_by_key(|c| c.id);
        Ok(out)
    }

    // -- Action requests --

    /// Persist a new request in `pending` state.
    pub async fn insert_request(
        &self,
        agent_id: AgentId,
        summary: &str,
        input: ActionInput,
        reasoning_trace: Option<String>,
    ) -> StorageResult<ActionRequest> {
        let _guard = self.write_lock.lock().await;
        let request = ActionRequest {
            id: RequestId(self.next_id_inner("requests").await?),
            agent_id,
            status: RequestStatus::Pending,
            summary: summary.to_string(),
            input,
            reasoning_trace,
            created_at: now_utc(),
        };
        self.put_json(ns::REQUESTS, &request.id.to_string(), &request)
            .await?;
        Ok(request)
    }

    /// Fetch a request by id.
    pub async fn get_request(&self, id: RequestId) -> StorageResult<Option<ActionRequest>> {
        self.get_json(ns::REQUESTS, &id.to_string()).await
    }

    /// All requests, optionally filtered by status, ascending by id.
    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> StorageResult<Vec<ActionRequest>> {
        let mut requests: Vec<ActionRequest> = self.list_all(ns::REQUESTS).await?;
        if let Some(status) = status {
            requests.retain(|r| r.status == status);
        }
        Ok(requests)
    }

    /// Conditionally move a request from `expected` to `next`.
    ///
    /// Returns the updated request, or `Ok(None)` when the request is no
    /// longer in `expected` (the compare-and-swap failed). The check and
    /// the write are serialized, so concurrent transitions cannot both
    /// succeed.
    pub async fn transition_request(
        &self,
        id: RequestId,
        expected: RequestStatus,
        next: RequestStatus,
    ) -> StorageResult<Option<ActionRequest>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut request) = self.get_json::<ActionRequest>(ns::REQUESTS, &id.to_string()).await?
        else {
            return Err(StorageError::NotFound(format!("request {id}")));
        };
        if request.status != expected {
            return Ok(None);
        }
        request.status = next;
        self.put_json(ns::REQUESTS, &request.id.to_string(), &request)
            .await?;
        Ok(Some(request))
    }

    // -- Plans --

    /// Persist a new plan.
    pub async fn insert_plan(
        &self,
        request_id: RequestId,
        plan_hash: &str,
        steps: Vec<PlanStep>,
        risk_score: u8,
    ) -> StorageResult<Plan> {
        let _guard = self.write_lock.lock().await;
        let plan = Plan {
            id: PlanId(self.next_id_inner("plans").await?),
            request_id,
            plan_hash: plan_hash.to_string(),
            steps,
            risk_score,
            created_at: now_utc(),
        };
        self.put_json(ns::PLANS, &plan.id.to_string(), &plan).await?;
        Ok(plan)
    }

    /// Fetch a plan by id.
    pub async fn get_plan(&self, id: PlanId) -> StorageResult<Option<Plan>> {
        self.get_json(ns::PLANS, &id.to_string()).await
    }

    /// Overwrite a stored plan verbatim.
    ///
    /// The orchestrator never rewrites plans; this exists for tooling and
    /// for integrity tests that simulate tampering with stored steps.
    pub async fn put_plan(&self, plan: &Plan) -> StorageResult<()> {
        self.put_json(ns::PLANS, &plan.id.to_string(), plan).await
    }

    /// All plans for a request, ascending by id.
    pub async fn list_plans_for_request(&self, request_id: RequestId) -> StorageResult<Vec<Plan>> {
        let mut plans: Vec<Plan> = self.list_all(ns::PLANS).await?;
        plans.retain(|p| p.request_id == request_id);
        Ok(plans)
    }

    /// The most recent plan for a request, if any. Later plans supersede
    /// earlier ones.
    pub async fn latest_plan_for_request(
        &self,
        request_id: RequestId,
    ) -> StorageResult<Option<Plan>> {
        Ok(self.list_plans_for_request(request_id).await?.pop())
    }

    // -- Approvals --

    /// Record an admin decision.
    pub async fn insert_approval(
        &self,
        plan_id: PlanId,
        approved_by: UserId,
        decision: ApprovalDecision,
    ) -> StorageResult<Approval> {
        let _guard = self.write_lock.lock().await;
        let approval = Approval {
            id: ApprovalId(self.next_id_inner("approvals").await?),
            plan_id,
            approved_by,
            decision,
            created_at: now_utc(),
        };
        self.put_json(ns::APPROVALS, &approval.id.to_string(), &approval)
            .await?;
        Ok(approval)
    }

    /// All decisions recorded for a plan, ascending by id.
    pub async fn list_approvals_for_plan(&self, plan_id: PlanId) -> StorageResult<Vec<Approval>> {
        let mut approvals: Vec<Approval> = self.list_all(ns::APPROVALS).await?;
        approvals.retain(|a| a.plan_id == plan_id);
        Ok(approvals)
    }

    // -- Receipts --

    /// Record an execution receipt.
    pub async fn insert_receipt(
        &self,
        plan_id: PlanId,
        status: ReceiptStatus,
        logs: Vec<StepResult>,
    ) -> StorageResult<ExecutionReceipt> {
        let _guard = self.write_lock.lock().await;
        let receipt = ExecutionReceipt {
            id: ReceiptId(self.next_id_inner("receipts").await?),
            plan_id,
            status,
            logs,
            executed_at: now_utc(),
        };
        self.put_json(ns::RECEIPTS, &receipt.id.to_string(), &receipt)
            .await?;
        Ok(receipt)
    }

    /// All receipts for a plan, ascending by id.
    pub async fn list_receipts_for_plan(
        &self,
        plan_id: PlanId,
    ) -> StorageResult<Vec<ExecutionReceipt>> {
        let mut receipts: Vec<ExecutionReceipt> = self.list_all(ns::RECEIPTS).await?;
        receipts.retain(|r| r.plan_id == plan_id);
        Ok(receipts)
    }

    // -- Settings --

    /// A setting value, if set.
    pub async fn get_setting(&self, key: &str) -> StorageResult<Option<Value>> {
        self.get_json(ns::SETTINGS, key).await
    }

    /// Upsert a setting.
    pub async fn set_setting(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.put_json(ns::SETTINGS, key, value).await
    }

    /// All settings, sorted by key.
    pub async fn list_settings(&self) -> StorageResult<Vec<Setting>> {
        let mut keys = self.kv.list_keys(ns::SETTINGS).await?;
        keys.sort_unstable();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get_json::<Value>(ns::SETTINGS, &key).await? {
                out.push(Setting { key, value });
            }
        }
        Ok(out)
    }

    // -- Audit events --

    /// Append an audit event row. Chain hashing is the audit crate's job;
    /// the store only assigns the id and persists.
    pub async fn insert_audit_event(
        &self,
        prev_hash: &str,
        event_hash: &str,
        event_type: &str,
        data: Value,
    ) -> StorageResult<AuditEvent> {
        let _guard = self.write_lock.lock().await;
        let event = AuditEvent {
            id: AuditEventId(self.next_id_inner("audit").await?),
            prev_hash: prev_hash.to_string(),
            event_hash: event_hash.to_string(),
            event_type: event_type.to_string(),
            data,
            created_at: now_utc(),
        };
        self.put_json(ns::AUDIT, &event.id.to_string(), &event)
            .await?;
        Ok(event)
    }

    /// The most recently inserted audit event, if any.
    pub async fn last_audit_event(&self) -> StorageResult<Option<AuditEvent>> {
        let max_id = self
            .kv
            .list_keys(ns::AUDIT)
            .await?
            .into_iter()
            .filter_map(|k| k.parse::<i64>().ok())
            .max();
        match max_id {
            Some(id) => self.get_json(ns::AUDIT, &id.to_string()).await,
            None => Ok(None),
        }
    }

    /// All audit events, ascending by id (= chain order).
    pub async fn list_audit_events(&self) -> StorageResult<Vec<AuditEvent>> {
        self.list_all(ns::AUDIT).await
    }

    // -- Admin users --

    /// Create an admin user. The username must be unique.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] when the username is taken.
    pub async fn insert_user(&self, username: &str, password_hash: &str) -> StorageResult<AdminUser> {
        let _guard = self.write_lock.lock().await;
        let existing: Vec<AdminUser> = self.list_all(ns::USERS).await?;
        if existing.iter().any(|u| u.username == username) {
            return Err(StorageError::Conflict(format!(
                "username already exists: {username}"
            )));
        }
        let user = AdminUser {
            id: UserId(self.next_id_inner("users").await?),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now_utc(),
        };
        self.put_json(ns::USERS, &user.id.to_string(), &user).await?;
        Ok(user)
    }

    /// Fetch an admin user by id.
    pub async fn get_user(&self, id: UserId) -> StorageResult<Option<AdminUser>> {
        self.get_json(ns::USERS, &id.to_string()).await
    }

    /// Look up an admin user by username.
    pub async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<AdminUser>> {
        let users: Vec<AdminUser> = self.list_all(ns::USERS).await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    /// Number of admin users (used by first-start seeding).
    pub async fn count_users(&self) -> StorageResult<usize> {
        Ok(self.kv.list_keys(ns::USERS).await?.len())
    }
}
