//! Integration Tests for Error Handling
//!
//! Launch failures, overlapping runs and configuration errors.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use barked_bridge::bridge::{FixedConsent, ScriptBridge, ScriptLocator};
use barked_bridge::config::LocatorConfig;
use barked_bridge::models::{FailureKind, Invocation};
use barked_bridge::Error;
use std::path::PathBuf;
use std::sync::Barrier;
use std::time::Duration;
use test_utils::{bridge_for, locator_for, write_stub_script};

fn missing_interpreter_bridge() -> ScriptBridge {
    let locator = ScriptLocator::new(LocatorConfig {
        script_candidates: vec![],
        script_fallback: PathBuf::from("/nonexistent/barked"),
        interpreter_candidates: vec![PathBuf::from("/nonexistent/opt/bash")],
        interpreter_fallback: PathBuf::from("/nonexistent/bin/bash"),
    });
    ScriptBridge::new(locator, FixedConsent::decline())
}

#[tokio::test]
async fn test_missing_interpreter_reports_launch_failure() {
    let bridge = missing_interpreter_bridge();

    let session = bridge.run(Invocation::new(["--clean"])).await.unwrap();

    assert!(!session.is_running());
    assert_eq!(session.exit_code(), Some(127));
    assert_eq!(session.failure(), Some(FailureKind::LaunchFailed));
    assert!(session.output().starts_with("\nError: "));
    assert!(session.output().contains("/nonexistent/bin/bash"));
    assert_eq!(bridge.launch_count(), 0);
    assert!(!bridge.is_running());
}

#[tokio::test]
async fn test_launch_failure_streams_no_events() {
    let bridge = missing_interpreter_bridge();
    let mut running = bridge.spawn(Invocation::default()).unwrap();
    assert!(running.pid().is_none());
    assert!(!running.snapshot().is_running());
    assert!(running.next_event().await.is_none());
}

#[tokio::test]
async fn test_missing_script_is_reported_by_interpreter() {
    let stub = write_stub_script("exit 0\n");
    let mut config = locator_for(&stub).config().clone();
    config.script_candidates = vec![PathBuf::from("/nonexistent/barked")];
    config.script_fallback = PathBuf::from("/nonexistent/barked");
    let bridge = ScriptBridge::new(ScriptLocator::new(config), FixedConsent::decline());

    let session = bridge.run(Invocation::default()).await.unwrap();

    assert_ne!(session.exit_code(), Some(0));
    assert_eq!(session.failure(), Some(FailureKind::NonZeroExit));
    assert!(!session.output().is_empty());
    assert_eq!(bridge.launch_count(), 1);
}

#[tokio::test]
async fn test_overlapping_run_is_rejected() {
    let script = write_stub_script("exec sleep 30\n");
    let bridge = bridge_for(&script, FixedConsent::accept());

    let running = bridge.spawn(Invocation::default()).unwrap();

    let err = bridge.spawn(Invocation::default()).err().unwrap();
    match err {
        Error::SessionInProgress { session_id } => assert_eq!(session_id, running.id()),
        other => panic!("unexpected error {:?}", other),
    }
    let err = bridge
        .run_privileged(Invocation::default(), "test")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionInProgress { .. }));
    assert_eq!(bridge.launch_count(), 1);

    assert!(bridge.cancel().await.unwrap());
    let session = tokio::time::timeout(Duration::from_secs(10), running.wait())
        .await
        .unwrap();
    assert_eq!(session.exit_code(), Some(143));

    // The slot is free again once the first session completed
    let next = bridge.spawn(Invocation::default()).unwrap();
    assert!(bridge.cancel().await.unwrap());
    next.wait().await;
}

#[tokio::test]
async fn test_concurrent_spawns_admit_exactly_one() {
    let script = write_stub_script("exec sleep 30\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    let barrier = Barrier::new(8);

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    bridge.spawn(Invocation::default())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut winners = Vec::new();
    for result in results {
        match result {
            Ok(running) => winners.push(running),
            Err(Error::SessionInProgress { .. }) => {}
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
    assert_eq!(winners.len(), 1);
    assert_eq!(bridge.launch_count(), 1);

    let running = winners.pop().unwrap();
    assert_eq!(bridge.tracked_pid(), running.pid());
    assert!(bridge.cancel().await.unwrap());
    let session = tokio::time::timeout(Duration::from_secs(10), running.wait())
        .await
        .unwrap();
    assert_eq!(session.exit_code(), Some(143));
}

#[tokio::test]
async fn test_overlap_allowed_when_configured() {
    let script = write_stub_script("sleep 0.2\necho \"$1\"\n");
    let bridge = bridge_for(&script, FixedConsent::decline()).with_overlap(true);

    let first = bridge.spawn(Invocation::new(["a"])).unwrap();
    let second = bridge.spawn(Invocation::new(["b"])).unwrap();

    let (first, second) = tokio::join!(first.wait(), second.wait());
    assert_eq!(first.output(), "a\n");
    assert_eq!(second.output(), "b\n");
    assert_eq!(bridge.launch_count(), 2);
}

#[test]
fn test_explicit_config_must_exist() {
    let err = barked_bridge::load_config(Some(std::path::Path::new("/nonexistent/bridge.toml")))
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/bridge.toml"));
}

#[test]
fn test_explicit_config_overrides_locator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    std::fs::write(
        &path,
        "allow_overlap = true\n\n[locator]\ninterpreter_candidates = [\"/bin/sh\"]\n",
    )
    .unwrap();

    let config = barked_bridge::load_config(Some(&path)).unwrap();
    assert!(config.allow_overlap);
    assert_eq!(config.locator.interpreter_candidates, vec![PathBuf::from("/bin/sh")]);
    assert_eq!(
        config.locator.script_candidates,
        LocatorConfig::default().script_candidates
    );
}
