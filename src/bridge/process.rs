//! Script Process Spawning
//!
//! Starts `<interpreter> <script> <args...>` with stdout and stderr both
//! pointing at the write end of one anonymous pipe, and stdin at the null
//! device. A background thread reads the pipe until EOF, reaps the child
//! and forwards everything over an unbounded channel.

use std::io::Read;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use super::streams::ProcessEvent;

/// Size of each read from the merged pipe
const READ_CHUNK_SIZE: usize = 4096;

/// A launched child and the receiving end of its event channel
pub(crate) struct SpawnedScript {
    pub pid: u32,
    pub events: UnboundedReceiver<ProcessEvent>,
}

/// Launch the script and start the reader thread
///
/// `on_exit` runs on the reader thread after the child has been reaped and
/// before the exit event is sent.
pub(crate) fn spawn_script<F>(
    interpreter: &Path,
    script: &Path,
    args: &[String],
    on_exit: F,
) -> std::io::Result<SpawnedScript>
where
    F: FnOnce() + Send + 'static,
{
    let (mut reader, writer) = std::io::pipe()?;
    let stderr_writer = writer.try_clone()?;

    // The Command owns our copies of the write end; dropping it at the end of
    // this block leaves the child as the only writer, so EOF means it is done.
    let mut child = {
        let mut command = Command::new(interpreter);
        command
            .arg(script)
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer);
        command.spawn()?
    };

    let pid = child.id();
    let (tx, rx) = unbounded_channel::<ProcessEvent>();

    thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK_SIZE];
        let mut receiver_gone = false;

        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    debug!("Script output EOF (pid {})", pid);
                    break;
                }
                Ok(n) => {
                    // Keep draining after the receiver is gone so the child never
                    // blocks on a full pipe.
                    if !receiver_gone && tx.send(ProcessEvent::Output(buf[..n].to_vec())).is_err() {
                        debug!("Session receiver dropped, discarding further output (pid {})", pid);
                        receiver_gone = true;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Script output read error (pid {}): {}", pid, e);
                    break;
                }
            }
        }

        let code = match child.wait() {
            Ok(status) => exit_code_of(status),
            Err(e) => {
                error!("Failed to reap script process {}: {}", pid, e);
                1
            }
        };
        info!("Script process {} exited with code {}", pid, code);

        on_exit();
        let _ = tx.send(ProcessEvent::Exited(code));
    });

    Ok(SpawnedScript { pid, events: rx })
}

/// Map an exit status to a shell-style code; signals become `128 + signo`
pub(crate) fn exit_code_of(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => status.signal().map(|signo| 128 + signo).unwrap_or(1),
    }
}

/// Exit code reported when the process cannot be started at all
pub(crate) fn launch_failure_code(err: &std::io::Error) -> i32 {
    match err.kind() {
        std::io::ErrorKind::NotFound => 127,
        std::io::ErrorKind::PermissionDenied => 126,
        _ => 1,
    }
}
