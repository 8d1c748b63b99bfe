//! Reconciler behaviour against recording fakes.
//!
//! Each test pins one landing rule: rejection has no side effects, adoption
//! happens exactly once, the most recent project wins when there is no work,
//! and a fresh project is bootstrapped when there is nothing at all.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use uigen_session::{
    AnonymousWorkSnapshot, AuthResult, ChatMessage, FileSystemData, LandingKind, Phase,
    SessionError,
};
use uigen_test_utils::{
    files_only_snapshot, is_bootstrap_name, snapshot_with_messages, two_projects, AuthScript,
    Call, CallLog, FakeAuthGateway, FakeDirectory, FakeWorkStore, Harness,
};

#[tokio::test]
async fn rejected_sign_in_has_no_side_effects() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Reject("Invalid credentials".into())),
        FakeWorkStore::new(log.clone(), Some(snapshot_with_messages(2))),
        FakeDirectory::new(log.clone(), two_projects()),
    );
    assert!(!harness.reconciler.is_loading());

    let result = harness
        .reconciler
        .sign_in("test@example.com", "wrong-password")
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.auth.error.as_deref(), Some("Invalid credentials"));
    assert!(!harness.reconciler.is_loading());
    assert_eq!(log.kinds(), vec!["sign_in"]);
    // untouched
    assert_eq!(harness.store.peek(), Some(snapshot_with_messages(2)));
}

#[tokio::test]
async fn rejected_sign_up_surfaces_reason() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Reject("Email already exists".into())),
        FakeWorkStore::new(log.clone(), None),
        FakeDirectory::new(log.clone(), vec![]),
    );

    let result = harness
        .reconciler
        .sign_up("existing@example.com", "password")
        .await
        .unwrap();

    assert_eq!(result.auth, AuthResult::rejected("Email already exists"));
    assert_eq!(log.kinds(), vec!["sign_up"]);
}

#[tokio::test]
async fn credentials_pass_through_verbatim() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Reject("Invalid input".into())),
        FakeWorkStore::new(log.clone(), None),
        FakeDirectory::new(log.clone(), vec![]),
    );

    harness.reconciler.sign_in("", "").await.unwrap();

    assert_eq!(
        log.calls(),
        vec![Call::SignIn {
            email: String::new(),
            password: String::new()
        }]
    );
}

#[tokio::test]
async fn anonymous_work_adopted_exactly_once() {
    let snapshot = snapshot_with_messages(3);
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Accept),
        FakeWorkStore::new(log.clone(), Some(snapshot.clone())),
        FakeDirectory::new(log.clone(), two_projects()).returning_id("project-123"),
    );

    let result = harness
        .reconciler
        .sign_in("test@example.com", "password")
        .await
        .unwrap();

    assert_eq!(result.auth, AuthResult::ok());
    assert_eq!(
        log.kinds(),
        vec!["sign_in", "store_get", "create_project", "store_clear", "navigate"]
    );

    let specs = log.created_specs();
    assert_eq!(specs.len(), 1);
    assert!(specs[0].name.starts_with("Design from "));
    assert_eq!(specs[0].messages, snapshot.messages);
    assert_eq!(specs[0].data, snapshot.file_system_data);

    assert_eq!(log.count(|c| matches!(c, Call::StoreClear)), 1);
    assert!(harness.store.peek().is_none());
    assert_eq!(result.route().unwrap().path, "/project-123");
}

#[tokio::test]
async fn scenario_single_message_single_file() {
    let mut files = FileSystemData::new();
    files.insert("x.tsx".to_string(), "...".to_string());
    let snapshot = AnonymousWorkSnapshot::new(vec![ChatMessage::user("1", "hi")], files.clone());

    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Accept),
        FakeWorkStore::new(log.clone(), Some(snapshot)),
        FakeDirectory::new(log.clone(), vec![]).returning_id("returned-id"),
    );

    let result = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();

    assert_eq!(log.count(|c| matches!(c, Call::ListProjects)), 0);
    let specs = log.created_specs();
    assert_eq!(specs.len(), 1);
    assert!(specs[0].name.contains("Design from"));
    assert_eq!(specs[0].messages, vec![ChatMessage::user("1", "hi")]);
    assert_eq!(specs[0].data, files);
    assert!(harness.store.peek().is_none());
    assert_eq!(result.route().unwrap().path, "/returned-id");
    assert_eq!(
        log.calls().last(),
        Some(&Call::Navigate("/returned-id".to_string()))
    );
}

#[tokio::test]
async fn adopted_work_with_no_files_keeps_empty_data() {
    let snapshot = AnonymousWorkSnapshot::new(vec![ChatMessage::user("1", "test")], FileSystemData::new());
    let harness = Harness::accepting(Some(snapshot), vec![]);

    harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();

    let specs = harness.log.created_specs();
    assert_eq!(specs.len(), 1);
    assert!(specs[0].data.is_empty());
    assert_eq!(specs[0].messages.len(), 1);
}

#[tokio::test]
async fn most_recent_project_when_no_work() {
    let harness = Harness::accepting(None, two_projects());

    let result = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();

    assert_eq!(
        harness.log.kinds(),
        vec!["sign_in", "store_get", "list_projects", "navigate"]
    );
    assert_eq!(result.route().unwrap().path, "/project-1");
    assert!(matches!(
        result.landing.unwrap().kind,
        LandingKind::MostRecent { .. }
    ));
}

#[tokio::test]
async fn files_only_snapshot_is_not_adopted() {
    let harness = Harness::accepting(Some(files_only_snapshot()), vec![two_projects().remove(0)]);

    let result = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();

    assert!(harness.log.created_specs().is_empty());
    assert_eq!(result.route().unwrap().path, "/project-1");
    // nothing was adopted, so nothing is cleared
    assert_eq!(harness.log.count(|c| matches!(c, Call::StoreClear)), 0);
    assert_eq!(harness.store.peek(), Some(files_only_snapshot()));
}

#[tokio::test]
async fn files_only_snapshot_with_no_projects_bootstraps_empty() {
    let harness = Harness::accepting(Some(files_only_snapshot()), vec![]);

    harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();

    let specs = harness.log.created_specs();
    assert_eq!(specs.len(), 1);
    assert!(is_bootstrap_name(&specs[0].name), "{}", specs[0].name);
    assert!(specs[0].messages.is_empty());
    assert!(specs[0].data.is_empty());
}

#[tokio::test]
async fn bootstrap_when_nothing_exists() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Accept),
        FakeWorkStore::new(log.clone(), None),
        FakeDirectory::new(log.clone(), vec![]).returning_id("new-project-123"),
    );

    let result = harness
        .reconciler
        .sign_up("new@example.com", "password")
        .await
        .unwrap();

    assert_eq!(
        log.kinds(),
        vec!["sign_up", "store_get", "list_projects", "create_project", "navigate"]
    );
    let specs = log.created_specs();
    assert_eq!(specs.len(), 1);
    assert!(is_bootstrap_name(&specs[0].name), "{}", specs[0].name);
    assert!(specs[0].messages.is_empty());
    assert!(specs[0].data.is_empty());
    assert_eq!(result.route().unwrap().path, "/new-project-123");
    assert!(matches!(
        result.landing.unwrap().kind,
        LandingKind::Bootstrapped { .. }
    ));
}

#[tokio::test]
async fn second_attempt_lands_on_adopted_project() {
    let harness = Harness::accepting(Some(snapshot_with_messages(1)), vec![]);

    let first = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();
    let second = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();

    assert_eq!(harness.log.created_specs().len(), 1);
    assert_eq!(first.route(), second.route());
    assert!(matches!(
        second.landing.unwrap().kind,
        LandingKind::MostRecent { .. }
    ));
}

#[tokio::test]
async fn auth_fault_propagates() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Fault("Network error".into())),
        FakeWorkStore::new(log.clone(), Some(snapshot_with_messages(1))),
        FakeDirectory::new(log.clone(), vec![]),
    );

    let err = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap_err();

    assert!(matches!(err, SessionError::Auth(_)));
    assert!(!harness.reconciler.is_loading());
    assert_eq!(log.kinds(), vec!["sign_in"]);
}

#[tokio::test]
async fn store_fault_propagates() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Accept),
        FakeWorkStore::new(log.clone(), None).failing_get("Failed to get anon work"),
        FakeDirectory::new(log.clone(), two_projects()),
    );

    let err = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap_err();

    assert!(err.to_string().contains("Failed to get anon work"));
    assert!(!harness.reconciler.is_loading());
    assert_eq!(log.kinds(), vec!["sign_in", "store_get"]);
    assert!(harness.navigator.loading_at_redirect().is_empty());
}

#[tokio::test]
async fn create_fault_leaves_snapshot_in_place() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Accept),
        FakeWorkStore::new(log.clone(), Some(snapshot_with_messages(1))),
        FakeDirectory::new(log.clone(), vec![]).failing_create("database locked"),
    );

    let err = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap_err();

    assert!(matches!(err, SessionError::Directory(_)));
    assert_eq!(log.count(|c| matches!(c, Call::StoreClear)), 0);
    assert_eq!(harness.store.peek(), Some(snapshot_with_messages(1)));
    assert_eq!(harness.reconciler.status().phase, Phase::Failed);
}

#[tokio::test]
async fn list_fault_propagates() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Accept),
        FakeWorkStore::new(log.clone(), None),
        FakeDirectory::new(log.clone(), vec![]).failing_list("timeout"),
    );

    assert!(harness.reconciler.sign_in("a@b.com", "pw").await.is_err());
    assert_eq!(log.kinds(), vec!["sign_in", "store_get", "list_projects"]);
    assert!(!harness.reconciler.is_loading());
}

#[tokio::test]
async fn clear_fault_is_reported_not_fatal() {
    let log = CallLog::new();
    let harness = Harness::new(
        log.clone(),
        FakeAuthGateway::new(log.clone(), AuthScript::Accept),
        FakeWorkStore::new(log.clone(), Some(snapshot_with_messages(1))).failing_clear("read-only"),
        FakeDirectory::new(log.clone(), vec![]).returning_id("kept"),
    );

    let result = harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();

    let landing = result.landing.unwrap();
    assert_eq!(landing.route.path, "/kept");
    assert!(matches!(
        landing.kind,
        LandingKind::Adopted {
            store_cleared: false,
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loading_spans_the_whole_attempt() {
    let log = CallLog::new();
    let (auth, gate) = FakeAuthGateway::gated(log.clone(), AuthScript::Accept);
    let harness = Arc::new(Harness::new(
        log.clone(),
        auth,
        FakeWorkStore::new(log.clone(), None),
        FakeDirectory::new(log.clone(), vec![]),
    ));
    let mut status = harness.reconciler.subscribe();
    assert!(!harness.reconciler.is_loading());

    let task = {
        let harness = Arc::clone(&harness);
        tokio::spawn(async move { harness.reconciler.sign_in("a@b.com", "pw").await })
    };

    status.wait_for(|s| s.is_loading()).await.unwrap();
    assert!(harness.reconciler.is_loading());
    assert_eq!(harness.reconciler.status().phase, Phase::Authenticating);

    gate.notify_one();
    let result = task.await.unwrap().unwrap();

    assert!(result.is_success());
    assert!(!harness.reconciler.is_loading());
    assert_eq!(harness.reconciler.status().phase, Phase::Done);
    // redirect issued while still loading
    assert_eq!(harness.navigator.loading_at_redirect(), vec![true]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loading_spans_rejected_attempt() {
    let log = CallLog::new();
    let (auth, gate) = FakeAuthGateway::gated(log.clone(), AuthScript::Reject("nope".into()));
    let harness = Arc::new(Harness::new(
        log.clone(),
        auth,
        FakeWorkStore::new(log.clone(), None),
        FakeDirectory::new(log.clone(), vec![]),
    ));
    let mut status = harness.reconciler.subscribe();

    let task = {
        let harness = Arc::clone(&harness);
        tokio::spawn(async move { harness.reconciler.sign_up("a@b.com", "pw").await })
    };

    status.wait_for(|s| s.is_loading()).await.unwrap();
    gate.notify_one();
    let result = task.await.unwrap().unwrap();

    assert!(!result.is_success());
    assert!(!harness.reconciler.is_loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loading_spans_faulted_attempt() {
    let log = CallLog::new();
    let (auth, gate) =
        FakeAuthGateway::gated(log.clone(), AuthScript::Fault("Network error".into()));
    let harness = Arc::new(Harness::new(
        log.clone(),
        auth,
        FakeWorkStore::new(log.clone(), Some(snapshot_with_messages(1))),
        FakeDirectory::new(log.clone(), vec![]),
    ));
    let mut status = harness.reconciler.subscribe();
    assert!(!harness.reconciler.is_loading());

    let task = {
        let harness = Arc::clone(&harness);
        tokio::spawn(async move { harness.reconciler.sign_in("a@b.com", "pw").await })
    };

    status.wait_for(|s| s.is_loading()).await.unwrap();
    assert!(harness.reconciler.is_loading());

    gate.notify_one();
    let err = task.await.unwrap().unwrap_err();

    assert!(matches!(err, SessionError::Auth(_)));
    assert!(!harness.reconciler.is_loading());
    assert_eq!(harness.reconciler.status().phase, Phase::Failed);
    assert_eq!(log.kinds(), vec!["sign_in"]);
    assert!(harness.store.peek().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn abandoned_attempt_resets_loading() {
    let log = CallLog::new();
    let (auth, _gate) = FakeAuthGateway::gated(log.clone(), AuthScript::Accept);
    let harness = Arc::new(Harness::new(
        log.clone(),
        auth,
        FakeWorkStore::new(log.clone(), None),
        FakeDirectory::new(log.clone(), vec![]),
    ));
    let mut status = harness.reconciler.subscribe();

    let task = {
        let harness = Arc::clone(&harness);
        tokio::spawn(async move { harness.reconciler.sign_in("a@b.com", "pw").await })
    };
    status.wait_for(|s| s.is_loading()).await.unwrap();

    task.abort();
    let _ = task.await;

    status.wait_for(|s| !s.is_loading()).await.unwrap();
    assert_eq!(harness.reconciler.status().phase, Phase::Failed);
    assert_eq!(log.kinds(), vec!["sign_in"]);
}

#[tokio::test]
async fn status_channel_reports_phases_in_order() {
    let harness = Harness::accepting(Some(snapshot_with_messages(1)), vec![]);
    let mut status = harness.reconciler.subscribe();

    let recorder = tokio::spawn(async move {
        let mut phases = Vec::new();
        while status.changed().await.is_ok() {
            let phase = status.borrow_and_update().phase;
            phases.push(phase);
            if phase.is_terminal() {
                break;
            }
        }
        phases
    });

    harness.reconciler.sign_in("a@b.com", "pw").await.unwrap();
    let phases = recorder.await.unwrap();

    // a watch channel may coalesce intermediate values, but the last one is always seen
    assert_eq!(phases.last(), Some(&Phase::Done));
}
