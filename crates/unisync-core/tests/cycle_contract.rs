// End-to-end behaviour of `SyncEngine::run_cycle` against in-memory
// controllers.

#![allow(clippy::unwrap_used)]

mod common;

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use common::{Call, MockAdapter, a_record, cname, controller};
use unisync_core::{
    Action, ApplyOutcome, ControllerId, CoreError, CycleReport, FetchOutcome, SkipReason,
    SyncEngine,
};

fn id(s: &str) -> ControllerId {
    ControllerId::from(s)
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn record_on_one_controller_is_created_on_the_other() {
    let adapter = MockAdapter::new()
        .with_dns("a", vec![a_record("nas.lan", "10.0.0.5")])
        .with_dns("b", Vec::new());
    let engine = SyncEngine::new(adapter);
    let configs = [controller("a"), controller("b")];

    let report = engine.run_cycle(&configs, false).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.desired_records, 1);
    assert_eq!(report.applied(), 1);
    assert!(report.operations[&id("a")].is_empty());
    let op = &report.operations[&id("b")][0];
    assert_eq!(op.action, Action::Create);
    assert_eq!(op.identity.canonical(), "nas.lan A_RECORD 10.0.0.5");
    assert_eq!(op.outcome, ApplyOutcome::Applied);

    assert_eq!(
        engine.adapter().writes(),
        [Call::Create("b".into(), "nas.lan A_RECORD 10.0.0.5".into())]
    );
    let copied = engine.adapter().dns_of("b");
    assert_eq!(copied.len(), 1);
    assert_eq!(copied[0].fields.get("ttlSeconds"), Some(&300.into()));
}

#[tokio::test]
async fn record_on_both_controllers_needs_no_writes() {
    let adapter = MockAdapter::new()
        .with_dns("a", vec![a_record("nas.lan", "10.0.0.5")])
        .with_dns("b", vec![a_record("NAS.LAN.", "10.0.0.5")]);
    let engine = SyncEngine::new(adapter);

    let report = engine
        .run_cycle(&[controller("a"), controller("b")], false)
        .await
        .unwrap();

    assert_eq!(report.planned(), 0);
    assert!(engine.adapter().writes().is_empty());
}

#[tokio::test]
async fn dry_run_reports_without_writing() {
    let adapter = MockAdapter::new()
        .with_dns("a", vec![a_record("nas.lan", "10.0.0.5")])
        .with_dns("b", Vec::new());
    let engine = SyncEngine::new(adapter);

    let report = engine
        .run_cycle(&[controller("a"), controller("b")], true)
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.applied(), 0);
    assert_eq!(
        report.operations[&id("b")][0].outcome,
        ApplyOutcome::Skipped {
            reason: SkipReason::DryRun
        }
    );
    assert!(engine.adapter().writes().is_empty());
    assert!(engine.adapter().dns_of("b").is_empty());
}

#[tokio::test]
async fn dry_run_plans_what_a_live_cycle_applies() {
    fn fleet() -> MockAdapter {
        MockAdapter::new()
            .with_dns(
                "a",
                vec![a_record("nas.lan", "10.0.0.5"), cname("www.lan", "nas.lan")],
            )
            .with_dns("b", vec![a_record("printer.lan", "10.0.0.7")])
            .with_dns("c", vec![a_record("nas.lan", "10.0.0.5")])
    }
    fn planned(report: &CycleReport) -> BTreeMap<ControllerId, Vec<(Action, String)>> {
        report
            .operations
            .iter()
            .map(|(controller, ops)| {
                let ops = ops
                    .iter()
                    .map(|op| (op.action, op.identity.canonical()))
                    .collect();
                (controller.clone(), ops)
            })
            .collect()
    }

    let configs = [controller("a"), controller("b"), controller("c")];
    let dry = SyncEngine::new(fleet());
    let live = SyncEngine::new(fleet());

    let dry_report = dry.run_cycle(&configs, true).await.unwrap();
    let live_report = live.run_cycle(&configs, false).await.unwrap();

    assert_eq!(planned(&dry_report), planned(&live_report));
    assert_eq!(dry_report.planned(), 5);
    assert!(
        dry_report
            .operations
            .values()
            .flatten()
            .all(|op| op.outcome
                == ApplyOutcome::Skipped {
                    reason: SkipReason::DryRun
                })
    );
    assert_eq!(live_report.applied(), 5);
    assert!(dry.adapter().writes().is_empty());
    assert_eq!(live.adapter().writes().len(), 5);
}

// ── Convergence ─────────────────────────────────────────────────────

#[tokio::test]
async fn second_cycle_is_a_no_op() {
    let adapter = MockAdapter::new()
        .with_dns(
            "a",
            vec![a_record("nas.lan", "10.0.0.5"), cname("www.lan", "nas.lan")],
        )
        .with_dns("b", vec![a_record("printer.lan", "10.0.0.7")])
        .with_dns("c", Vec::new());
    let engine = SyncEngine::new(adapter);
    let configs = [controller("a"), controller("b"), controller("c")];

    let first = engine.run_cycle(&configs, false).await.unwrap();
    assert_eq!(first.applied(), 6);

    engine.adapter().clear_calls();
    let second = engine.run_cycle(&configs, false).await.unwrap();
    let third = engine.run_cycle(&configs, false).await.unwrap();

    assert_eq!(second.planned(), 0);
    assert!(engine.adapter().writes().is_empty());
    assert_eq!(
        serde_json::to_string(&second.operations).unwrap(),
        serde_json::to_string(&third.operations).unwrap()
    );
}

#[tokio::test]
async fn client_names_are_published_when_enabled() {
    let adapter = MockAdapter::new()
        .with_dns("a", Vec::new())
        .with_dhcp("a", vec![a_record("laptop.lan", "10.0.0.9")])
        .with_dhcp("b", vec![a_record("phone.lan", "10.0.0.10")]);
    let engine = SyncEngine::new(adapter);

    let mut a = controller("a");
    a.sync_dhcp_clients = true;
    let b = controller("b");

    let report = engine.run_cycle(&[a, b], false).await.unwrap();

    assert_eq!(report.desired_records, 1);
    assert_eq!(
        engine.adapter().writes(),
        [Call::Create("b".into(), "laptop.lan A_RECORD 10.0.0.9".into())]
    );
    assert!(!engine.adapter().calls().contains(&Call::FetchDhcp("b".into())));
}

// ── Failure isolation ───────────────────────────────────────────────

#[tokio::test]
async fn unreachable_controller_is_left_out() {
    let adapter = MockAdapter::new()
        .with_dns("a", vec![a_record("nas.lan", "10.0.0.5")])
        .with_dns("b", Vec::new())
        .with_dns("c", vec![a_record("secret.lan", "10.9.9.9")])
        .unreachable("c");
    let engine = SyncEngine::new(adapter);

    let report = engine
        .run_cycle(&[controller("a"), controller("b"), controller("c")], false)
        .await
        .unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.failed_controllers(), [&id("c")]);
    assert!(matches!(report.fetches[&id("c")], FetchOutcome::Failed { .. }));
    assert!(!report.operations.contains_key(&id("c")));
    assert_eq!(report.desired_records, 1);
    assert_eq!(
        engine.adapter().writes(),
        [Call::Create("b".into(), "nas.lan A_RECORD 10.0.0.5".into())]
    );
}

#[tokio::test]
async fn failed_operation_does_not_stop_siblings() {
    let adapter = MockAdapter::new()
        .with_dns(
            "a",
            vec![
                a_record("alpha.lan", "10.0.0.1"),
                a_record("broken.lan", "10.0.0.2"),
                a_record("gamma.lan", "10.0.0.3"),
            ],
        )
        .with_dns("b", Vec::new())
        .reject_writes_of("broken.lan");
    let engine = SyncEngine::new(adapter);

    let report = engine
        .run_cycle(&[controller("a"), controller("b")], false)
        .await
        .unwrap();

    let outcomes: Vec<_> = report.operations[&id("b")]
        .iter()
        .map(|op| (op.identity.name().to_owned(), op.outcome.is_applied()))
        .collect();
    assert_eq!(
        outcomes,
        [
            ("alpha.lan".to_owned(), true),
            ("broken.lan".to_owned(), false),
            ("gamma.lan".to_owned(), true),
        ]
    );
    assert_eq!(report.failed(), 1);
    assert!(report.failed_controllers().is_empty());
}

#[tokio::test]
async fn writes_respect_target_filters() {
    let adapter = MockAdapter::new()
        .with_dns(
            "a",
            vec![
                a_record("nas.home.lan", "10.0.0.5"),
                a_record("build.office.lan", "10.1.0.5"),
            ],
        )
        .with_dns("b", Vec::new());
    let engine = SyncEngine::new(adapter);

    let mut b = controller("b");
    b.domain_suffix = Some("home.lan".into());

    engine.run_cycle(&[controller("a"), b], false).await.unwrap();

    assert_eq!(
        engine.adapter().writes(),
        [Call::Create("b".into(), "nas.home.lan A_RECORD 10.0.0.5".into())]
    );
}

// ── Cycle errors ────────────────────────────────────────────────────

#[tokio::test]
async fn no_controllers_is_an_error() {
    let engine = SyncEngine::new(MockAdapter::new());
    let err = engine.run_cycle(&[], false).await.unwrap_err();
    assert!(matches!(err, CoreError::NoControllers));
}

#[tokio::test]
async fn duplicate_controller_ids_are_rejected() {
    let engine = SyncEngine::new(MockAdapter::new());
    let err = engine
        .run_cycle(&[controller("a"), controller("a")], false)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateController { ref id } if id == "a"));
    assert!(engine.adapter().calls().is_empty());
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_before_apply_writes_nothing() {
    let adapter = MockAdapter::new()
        .with_dns("a", vec![a_record("nas.lan", "10.0.0.5")])
        .with_dns("b", Vec::new());
    let engine = SyncEngine::new(adapter);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = engine
        .run_cycle_with_cancel(&[controller("a"), controller("b")], false, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Cancelled));
    assert!(engine.adapter().writes().is_empty());
}

#[tokio::test]
async fn cancelled_during_apply_fails_the_rest() {
    let cancel = CancellationToken::new();
    let adapter = MockAdapter::new()
        .with_dns(
            "a",
            vec![
                a_record("one.lan", "10.0.0.1"),
                a_record("two.lan", "10.0.0.2"),
                a_record("three.lan", "10.0.0.3"),
            ],
        )
        .with_dns("b", Vec::new())
        .cancel_after_first_write(cancel.clone());
    let engine = SyncEngine::new(adapter);

    let report = engine
        .run_cycle_with_cancel(&[controller("a"), controller("b")], false, &cancel)
        .await
        .unwrap();

    let ops = &report.operations[&id("b")];
    assert_eq!(ops.len(), 3);
    assert_eq!(ops[0].outcome, ApplyOutcome::Applied);
    for op in &ops[1..] {
        assert_eq!(
            op.outcome,
            ApplyOutcome::Failed {
                reason: "cancelled".into()
            }
        );
    }
    assert_eq!(engine.adapter().writes().len(), 1);
}
