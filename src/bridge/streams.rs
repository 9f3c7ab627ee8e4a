//! Session Streams
//!
//! Bridges the background reader thread to the caller's task. Raw byte
//! chunks arrive over a channel; they are decoded and appended to the
//! session here, on whichever task polls the [`RunningSession`], so the
//! session itself is never touched from the reader thread.

use std::collections::VecDeque;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::models::ExecutionSession;

/// Message from the reader thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProcessEvent {
    /// Bytes read from the merged stdout/stderr pipe
    Output(Vec<u8>),
    /// The child was reaped with this exit code
    Exited(i32),
}

/// What a caller observes while a session runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Newly decoded text, already appended to the session
    Output(String),
    /// The session completed with this exit code
    Exited(i32),
}

/// Incremental UTF-8 decoder
///
/// A read can end in the middle of a multi-byte character. The incomplete
/// tail is held back and prefixed to the next chunk. Bytes that can never
/// form valid UTF-8 become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending + bytes` as is complete
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut text = String::new();
        let mut start = 0;

        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    text.push_str(valid);
                    start = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match e.error_len() {
                        Some(bad) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + bad;
                        }
                        None => {
                            // Incomplete sequence at the end; keep it for the next push
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
        text
    }

    /// Flush whatever is left once the stream has ended
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }

    /// Number of bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// A session whose process may still be running
///
/// Poll [`next_event`](Self::next_event) to receive output as it arrives,
/// or call [`wait`](Self::wait) to drain to completion.
pub struct RunningSession {
    session: ExecutionSession,
    pid: Option<u32>,
    events: Option<UnboundedReceiver<ProcessEvent>>,
    decoder: Utf8ChunkDecoder,
    queued: VecDeque<SessionEvent>,
}

impl RunningSession {
    pub(crate) fn from_channel(
        session: ExecutionSession,
        pid: u32,
        events: UnboundedReceiver<ProcessEvent>,
    ) -> Self {
        Self {
            session,
            pid: Some(pid),
            events: Some(events),
            decoder: Utf8ChunkDecoder::new(),
            queued: VecDeque::new(),
        }
    }

    /// A session that completed before any process existed
    pub(crate) fn completed(session: ExecutionSession) -> Self {
        Self {
            session,
            pid: None,
            events: None,
            decoder: Utf8ChunkDecoder::new(),
            queued: VecDeque::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.session.id
    }

    /// PID of the child, if one was launched
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Current state of the session
    pub fn snapshot(&self) -> &ExecutionSession {
        &self.session
    }

    /// Wait for the next output chunk or the exit. `None` once completed.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if let Some(event) = self.queued.pop_front() {
            return Some(event);
        }

        loop {
            let received = match self.events.as_mut() {
                Some(events) => events.recv().await,
                None => return None,
            };

            match received {
                Some(ProcessEvent::Output(bytes)) => {
                    let text = self.decoder.push(&bytes);
                    if text.is_empty() {
                        continue;
                    }
                    self.session.append_output(&text);
                    return Some(SessionEvent::Output(text));
                }
                Some(ProcessEvent::Exited(code)) => {
                    self.events = None;
                    let tail = self.decoder.finish();
                    if !tail.is_empty() {
                        self.session.append_output(&tail);
                        self.queued.push_back(SessionEvent::Exited(code));
                        self.session.complete(code);
                        return Some(SessionEvent::Output(tail));
                    }
                    self.session.complete(code);
                    return Some(SessionEvent::Exited(code));
                }
                None => {
                    // Reader thread went away without reporting an exit
                    self.events = None;
                    if self.session.is_running() {
                        warn!("Output channel for session {} closed without exit status", self.session.id);
                        self.session.fail_launch("process monitor stopped unexpectedly", 1);
                        return Some(SessionEvent::Exited(1));
                    }
                    return None;
                }
            }
        }
    }

    /// Drain to completion and return the final session
    pub async fn wait(mut self) -> ExecutionSession {
        while self.next_event().await.is_some() {}
        self.session
    }

    /// Drain to completion, handing each output chunk to `observer`
    pub async fn wait_with<F>(mut self, mut observer: F) -> ExecutionSession
    where
        F: FnMut(&str),
    {
        while let Some(event) = self.next_event().await {
            if let SessionEvent::Output(text) = event {
                observer(&text);
            }
        }
        self.session
    }
}
