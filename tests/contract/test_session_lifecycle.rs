//! Contract Tests for the Session Lifecycle
//!
//! Idle -> Running -> Completed, with the exit code absent until the exit
//! is observed and fixed from then on.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use barked_bridge::bridge::{FixedConsent, SessionEvent};
use barked_bridge::models::{Invocation, SessionStatus};
use test_utils::{bridge_for, write_stub_script};

#[tokio::test]
async fn test_idle_bridge_has_no_session() {
    let script = write_stub_script("exit 0\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    assert!(!bridge.is_running());
    assert!(bridge.tracked_pid().is_none());
    assert_eq!(bridge.launch_count(), 0);
}

#[tokio::test]
async fn test_running_then_completed() {
    let script = write_stub_script("echo tick\nsleep 0.2\nexit 7\n");
    let bridge = bridge_for(&script, FixedConsent::decline());

    let mut running = bridge.spawn(Invocation::new(["--monitor", "--health"])).unwrap();
    {
        let snapshot = running.snapshot();
        assert_eq!(snapshot.status(), SessionStatus::Running);
        assert!(snapshot.exit_code().is_none());
        assert!(snapshot.finished_at().is_none());
        assert_eq!(snapshot.invocation.args(), ["--monitor", "--health"]);
    }

    assert_eq!(
        running.next_event().await,
        Some(SessionEvent::Output("tick\n".to_string()))
    );
    assert!(running.snapshot().is_running());
    assert!(running.snapshot().exit_code().is_none());

    assert_eq!(running.next_event().await, Some(SessionEvent::Exited(7)));
    assert_eq!(running.next_event().await, None);

    let session = running.wait().await;
    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.exit_code(), Some(7));
    assert!(session.finished_at().is_some());
    assert!(session.duration().is_some());
    assert!(!bridge.is_running());
}

#[tokio::test]
async fn test_running_flag_clears_before_exit_is_delivered() {
    let script = write_stub_script("exit 0\n");
    let bridge = bridge_for(&script, FixedConsent::decline());

    let mut running = bridge.spawn(Invocation::default()).unwrap();
    assert_eq!(running.next_event().await, Some(SessionEvent::Exited(0)));
    assert!(!bridge.is_running());
    assert!(bridge.tracked_pid().is_none());
}

#[tokio::test]
async fn test_completed_session_serializes() {
    let script = write_stub_script("echo saved\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    let session = bridge.run(Invocation::new(["--clean"])).await.unwrap();

    let json = serde_json::to_value(&session).unwrap();
    assert_eq!(json["invocation"], serde_json::json!(["--clean"]));
    assert_eq!(json["output"], "saved\n");
    assert_eq!(json["exit_code"], 0);
}
