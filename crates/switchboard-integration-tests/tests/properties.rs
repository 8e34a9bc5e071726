//! Cross-crate invariants, exercised through real lifecycles.

use serde_json::json;

use switchboard_audit::GENESIS;
use switchboard_core::{ActionInput, ApprovalDecision, CapabilityType, RequestStatus};
use switchboard_crypto::{canonical_json, sha256_hex};
use switchboard_integration_tests::TestBed;
use switchboard_risk::flags;

fn fs_action(operation: &str, params: serde_json::Value) -> ActionInput {
    ActionInput {
        capability_type: CapabilityType::Filesystem,
        operation: operation.into(),
        params,
    }
}

/// Drive a few lifecycles so the store holds real data.
async fn populate(bed: &TestBed) {
    let read_path = bed.sandbox_file("a.txt");
    std::fs::write(&read_path, "alpha").unwrap();

    // Executed read.
    let request = bed
        .kernel
        .create_request(bed.agent.id, fs_action("read", json!({"path": read_path})), None)
        .await
        .unwrap();
    let outcome = bed.kernel.dry_run(bed.agent.id, request.id).await.unwrap();
    bed.kernel
        .approve_plan(bed.admin.id, outcome.plan_id, ApprovalDecision::Approved)
        .await
        .unwrap();
    bed.kernel
        .execute_plan(bed.agent.id, outcome.plan_id)
        .await
        .unwrap();

    // Rejected write.
    let request = bed
        .kernel
        .create_request(
            bed.agent.id,
            fs_action(
                "write",
                json!({"path": bed.sandbox_file("b.txt"), "content": "beta"}),
            ),
            None,
        )
        .await
        .unwrap();
    let outcome = bed.kernel.dry_run(bed.agent.id, request.id).await.unwrap();
    bed.kernel
        .approve_plan(bed.admin.id, outcome.plan_id, ApprovalDecision::Rejected)
        .await
        .unwrap();

    // Denied escape attempt, left planned.
    let request = bed
        .kernel
        .create_request(bed.agent.id, fs_action("read", json!({"path": "/etc/shadow"})), None)
        .await
        .unwrap();
    bed.kernel.dry_run(bed.agent.id, request.id).await.unwrap();
}

/// Property 1: adjacent audit events chain by hash, starting at GENESIS.
#[tokio::test]
async fn property_audit_chain_adjacency() {
    let bed = TestBed::new().await;
    populate(&bed).await;

    let events = bed.kernel.audit().list().await.unwrap();
    assert!(!events.is_empty());
    assert_eq!(events[0].prev_hash, GENESIS);
    for pair in events.windows(2) {
        assert_eq!(pair[1].prev_hash, pair[0].event_hash);
    }
    for event in &events {
        let recomputed =
            sha256_hex(&format!("{}{}", event.prev_hash, canonical_json(&event.data)));
        assert_eq!(recomputed, event.event_hash);
    }
}

/// Property 2: every stored plan's hash matches its stored steps.
#[tokio::test]
async fn property_plan_hashes_match_steps() {
    let bed = TestBed::new().await;
    populate(&bed).await;

    let requests = bed.kernel.list_requests(None).await.unwrap();
    let mut plans_seen = 0;
    for request in requests {
        for plan in bed
            .kernel
            .store()
            .list_plans_for_request(request.id)
            .await
            .unwrap()
        {
            let value = serde_json::to_value(&plan.steps).unwrap();
            assert_eq!(sha256_hex(&canonical_json(&value)), plan.plan_hash);
            plans_seen += 1;
        }
    }
    assert!(plans_seen >= 3);
}

/// Property 5: statuses observed over a lifecycle form a prefix of
/// `pending -> planned -> approved -> executed`.
#[tokio::test]
async fn property_status_transitions_are_ordered() {
    let bed = TestBed::new().await;
    let path = bed.sandbox_file("seq.txt");
    std::fs::write(&path, "x").unwrap();

    let mut observed = Vec::new();
    let request = bed
        .kernel
        .create_request(bed.agent.id, fs_action("read", json!({"path": path})), None)
        .await
        .unwrap();
    observed.push(request.status);

    let outcome = bed.kernel.dry_run(bed.agent.id, request.id).await.unwrap();
    observed.push(
        bed.kernel
            .store()
            .get_request(request.id)
            .await
            .unwrap()
            .unwrap()
            .status,
    );

    let updated = bed
        .kernel
        .approve_plan(bed.admin.id, outcome.plan_id, ApprovalDecision::Approved)
        .await
        .unwrap();
    observed.push(updated.status);

    bed.kernel
        .execute_plan(bed.agent.id, outcome.plan_id)
        .await
        .unwrap();
    observed.push(
        bed.kernel
            .store()
            .get_request(request.id)
            .await
            .unwrap()
            .unwrap()
            .status,
    );

    assert_eq!(
        observed,
        vec![
            RequestStatus::Pending,
            RequestStatus::Planned,
            RequestStatus::Approved,
            RequestStatus::Executed,
        ]
    );
}

/// Property 6: every filesystem step either resolves under an allowed
/// root or carries `path_denied`.
#[tokio::test]
async fn property_fs_steps_sandboxed_or_denied() {
    let bed = TestBed::new().await;
    populate(&bed).await;

    let root = bed.sandbox.path().to_path_buf();
    let requests = bed.kernel.list_requests(None).await.unwrap();
    for request in requests {
        for plan in bed
            .kernel
            .store()
            .list_plans_for_request(request.id)
            .await
            .unwrap()
        {
            for step in &plan.steps {
                let Some(path) = step.input_str("path") else {
                    continue;
                };
                let resolved = switchboard_effectors::sandbox::resolve_absolute(path);
                assert!(
                    resolved.starts_with(&root) || step.has_flag(flags::PATH_DENIED),
                    "step path {path} escapes the sandbox without a denial flag"
                );
            }
        }
    }
}

/// Terminal statuses stay terminal: a rejected request cannot be re-planned
/// or executed.
#[tokio::test]
async fn property_rejected_is_terminal() {
    let bed = TestBed::new().await;
    let path = bed.sandbox_file("t.txt");
    std::fs::write(&path, "x").unwrap();

    let request = bed
        .kernel
        .create_request(bed.agent.id, fs_action("read", json!({"path": path})), None)
        .await
        .unwrap();
    let outcome = bed.kernel.dry_run(bed.agent.id, request.id).await.unwrap();
    bed.kernel
        .approve_plan(bed.admin.id, outcome.plan_id, ApprovalDecision::Rejected)
        .await
        .unwrap();

    let err = bed.kernel.dry_run(bed.agent.id, request.id).await.unwrap_err();
    assert_eq!(err.kind, switchboard_core::ErrorKind::State);
    let err = bed
        .kernel
        .execute_plan(bed.agent.id, outcome.plan_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, switchboard_core::ErrorKind::State);
}

/// Cross-agent access is refused before any state is touched.
#[tokio::test]
async fn property_cross_agent_isolation() {
    let bed = TestBed::new().await;
    let path = bed.sandbox_file("mine.txt");
    std::fs::write(&path, "x").unwrap();

    let (intruder, _) = bed.kernel.create_agent("intruder").await.unwrap();
    bed.kernel
        .update_capability(intruder.id, CapabilityType::Filesystem, true, None)
        .await
        .unwrap();

    let request = bed
        .kernel
        .create_request(bed.agent.id, fs_action("read", json!({"path": path})), None)
        .await
        .unwrap();

    let err = bed.kernel.dry_run(intruder.id, request.id).await.unwrap_err();
    assert_eq!(err.kind, switchboard_core::ErrorKind::Authorization);

    let outcome = bed.kernel.dry_run(bed.agent.id, request.id).await.unwrap();
    bed.kernel
        .approve_plan(bed.admin.id, outcome.plan_id, ApprovalDecision::Approved)
        .await
        .unwrap();
    let err = bed
        .kernel
        .execute_plan(intruder.id, outcome.plan_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, switchboard_core::ErrorKind::Authorization);
}
