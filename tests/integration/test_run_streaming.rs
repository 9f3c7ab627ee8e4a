//! Integration Tests for Unprivileged Runs
//!
//! These tests launch stub scripts through the bridge and verify output
//! streaming, argument passing, exit codes and cancellation.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use barked_bridge::bridge::{FixedConsent, SessionEvent};
use barked_bridge::models::{FailureKind, Invocation, PrivilegeMode};
use std::time::Duration;
use test_utils::{bridge_for, write_stub_script};

#[tokio::test]
async fn test_scanning_stub_completes_with_output() {
    let script = write_stub_script("printf 'scanning\\n'\nexit 0\n");
    let bridge = bridge_for(&script, FixedConsent::decline());

    let session = bridge.run(Invocation::new(["--clean"])).await.unwrap();

    assert_eq!(session.output(), "scanning\n");
    assert_eq!(session.exit_code(), Some(0));
    assert!(!session.is_running());
    assert!(session.failure().is_none());
    assert_eq!(session.mode, PrivilegeMode::Standard);
    assert_eq!(bridge.launch_count(), 1);
    assert!(!bridge.is_running());
}

#[tokio::test]
async fn test_events_arrive_as_output_then_exit() {
    let script = write_stub_script("echo first\nsleep 0.2\necho second\nexit 2\n");
    let bridge = bridge_for(&script, FixedConsent::decline());

    let mut running = bridge.spawn(Invocation::default()).unwrap();
    assert!(running.pid().is_some());
    assert!(running.snapshot().is_running());
    assert!(bridge.is_running());

    let mut text = String::new();
    let mut exit = None;
    while let Some(event) = running.next_event().await {
        match event {
            SessionEvent::Output(chunk) => {
                assert!(exit.is_none(), "output after exit");
                text.push_str(&chunk);
            }
            SessionEvent::Exited(code) => exit = Some(code),
        }
    }

    assert_eq!(text, "first\nsecond\n");
    assert_eq!(exit, Some(2));
    let session = running.wait().await;
    assert_eq!(session.output(), text);
    assert_eq!(session.failure(), Some(FailureKind::NonZeroExit));
}

#[tokio::test]
async fn test_observer_sees_first_line_before_exit() {
    let script = write_stub_script("echo ready\nsleep 0.3\necho done\n");
    let bridge = bridge_for(&script, FixedConsent::decline());

    let mut chunks = Vec::new();
    let session = bridge
        .run_with(Invocation::default(), |chunk| chunks.push(chunk.to_string()))
        .await
        .unwrap();

    assert!(chunks.len() >= 2, "expected incremental chunks, got {:?}", chunks);
    assert_eq!(chunks.concat(), session.output());
    assert_eq!(chunks[0], "ready\n");
}

#[tokio::test]
async fn test_stderr_is_merged_in_order() {
    let script = write_stub_script("echo out\necho err >&2\necho out2\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    let session = bridge.run(Invocation::default()).await.unwrap();
    assert_eq!(session.output(), "out\nerr\nout2\n");
}

#[tokio::test]
async fn test_arguments_reach_the_script_verbatim() {
    let script = write_stub_script("for a in \"$@\"; do printf '[%s]\\n' \"$a\"; done\n");
    let bridge = bridge_for(&script, FixedConsent::decline());

    let args = ["--clean-cats", "it's here", "$HOME", "a b", ""];
    let session = bridge.run(Invocation::new(args)).await.unwrap();

    assert_eq!(session.output(), "[--clean-cats]\n[it's here]\n[$HOME]\n[a b]\n[]\n");
}

#[tokio::test]
async fn test_stdin_is_not_interactive() {
    let script = write_stub_script("if read answer; then echo \"got $answer\"; else echo no-input; fi\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    let session = bridge.run(Invocation::default()).await.unwrap();
    assert_eq!(session.output(), "no-input\n");
}

#[tokio::test]
async fn test_utf8_is_reassembled_and_invalid_bytes_replaced() {
    let script = write_stub_script("printf 'caf\\303'\nsleep 0.1\nprintf '\\251 \\377ok\\n'\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    let session = bridge.run(Invocation::default()).await.unwrap();
    assert_eq!(session.output(), "café \u{FFFD}ok\n");
}

#[tokio::test]
async fn test_cancel_terminates_running_script() {
    let script = write_stub_script("echo started\nexec sleep 30\n");
    let bridge = bridge_for(&script, FixedConsent::decline());

    let mut running = bridge.spawn(Invocation::default()).unwrap();
    match running.next_event().await {
        Some(SessionEvent::Output(chunk)) => assert_eq!(chunk, "started\n"),
        other => panic!("unexpected event {:?}", other),
    }

    assert_eq!(bridge.tracked_pid(), running.pid());
    assert!(bridge.cancel().await.unwrap());

    let session = tokio::time::timeout(Duration::from_secs(10), running.wait())
        .await
        .expect("cancelled script should exit promptly");
    assert_eq!(session.exit_code(), Some(143));
    assert!(!session.is_running());
    assert!(!bridge.is_running());
    assert!(!bridge.cancel().await.unwrap());
}

#[tokio::test]
async fn test_cancel_when_idle_is_noop() {
    let script = write_stub_script("exit 0\n");
    let bridge = bridge_for(&script, FixedConsent::decline());
    tokio_test::assert_ok!(bridge.cancel().await);
    assert!(!bridge.cancel().await.unwrap());
    assert_eq!(bridge.launch_count(), 0);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let script = write_stub_script("echo \"$1\"\n");
    let bridge = bridge_for(&script, FixedConsent::decline());

    let first = bridge.run(Invocation::new(["one"])).await.unwrap();
    let second = bridge.run(Invocation::new(["two"])).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.output(), "one\n");
    assert_eq!(second.output(), "two\n");
    assert_eq!(bridge.launch_count(), 2);
}
