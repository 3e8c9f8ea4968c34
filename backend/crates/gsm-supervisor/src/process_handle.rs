//! One OS child process and its standard streams.

use crate::{ProcessSpec, Result as SupervisorResult, SupervisorError};

use gsm_core::{Clock, ExitKind, LogLine, ProcessExit, ProcessRecord, StreamSource};

use std::panic::Location;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use error_location::ErrorLocation;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, Notify, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long an exited process's readers get to flush the last lines.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Owns a spawned child. Output lines go to the channel given at spawn time;
/// exit is observable through [`exit_status`](Self::exit_status),
/// [`wait`](Self::wait) and the one-shot [`take_exit_notifier`](Self::take_exit_notifier).
pub struct ProcessHandle {
    record: ProcessRecord,
    stop_command: String,
    kill_timeout: Duration,
    stdin: Mutex<Option<ChildStdin>>,
    control: Arc<ExitControl>,
    exit_rx: watch::Receiver<Option<ProcessExit>>,
    exit_notifier: StdMutex<Option<oneshot::Receiver<ProcessExit>>>,
}

/// Shared between the handle, the stream readers and the waiter task.
#[derive(Default)]
struct ExitControl {
    kill: Notify,
    terminate_requested: AtomicBool,
    forced: AtomicBool,
}

impl ExitControl {
    fn classify(&self) -> ExitKind {
        if self.forced.load(Ordering::SeqCst) {
            ExitKind::Forced
        } else if self.terminate_requested.load(Ordering::SeqCst) {
            ExitKind::Graceful
        } else {
            ExitKind::Unexpected
        }
    }
}

impl ProcessHandle {
    /// Launch `spec` with piped stdio. Each stdout/stderr line is sent to `output`.
    pub async fn spawn(
        spec: &ProcessSpec,
        output: mpsc::Sender<LogLine>,
        clock: Arc<dyn Clock>,
    ) -> SupervisorResult<Self> {
        let is_dir = tokio::fs::metadata(&spec.working_dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(SupervisorError::Spawn {
                message: format!(
                    "working directory {} does not exist or is not a directory",
                    spec.working_dir.display()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut command = Command::new(&spec.command);
        command
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Keep terminal signals aimed at the manager away from the game server.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| SupervisorError::Spawn {
            message: match e.kind() {
                std::io::ErrorKind::NotFound => {
                    format!("executable '{}' not found", spec.command)
                }
                _ => format!("failed to spawn '{}': {}", spec.command, e),
            },
            location: ErrorLocation::from(Location::caller()),
        })?;

        let pid = child.id().ok_or_else(|| SupervisorError::Spawn {
            message: format!("'{}' exited before its pid could be read", spec.command),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let record = ProcessRecord::new(pid, clock.now(), &spec.command, &spec.args);

        let control = Arc::new(ExitControl::default());
        let stdin = child.stdin.take();

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(read_lines(
                stdout,
                StreamSource::Stdout,
                output.clone(),
                Arc::clone(&clock),
                Arc::clone(&control),
            )));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(read_lines(
                stderr,
                StreamSource::Stderr,
                output,
                Arc::clone(&clock),
                Arc::clone(&control),
            )));
        }

        let (exit_tx, exit_rx) = watch::channel(None);
        let (notify_tx, notify_rx) = oneshot::channel();
        tokio::spawn(wait_for_exit(
            child,
            readers,
            Arc::clone(&control),
            clock,
            exit_tx,
            notify_tx,
        ));

        info!("Spawned '{}' with PID {}", record.command_line, pid);

        Ok(Self {
            record,
            stop_command: spec.stop_command.clone(),
            kill_timeout: spec.kill_timeout,
            stdin: Mutex::new(stdin),
            control,
            exit_rx,
            exit_notifier: StdMutex::new(Some(notify_rx)),
        })
    }

    pub fn record(&self) -> &ProcessRecord {
        &self.record
    }

    pub fn pid(&self) -> u32 {
        self.record.pid
    }

    /// Cached exit, once the process is gone.
    pub fn exit_status(&self) -> Option<ProcessExit> {
        self.exit_rx.borrow().clone()
    }

    pub fn has_exited(&self) -> bool {
        self.exit_rx.borrow().is_some()
    }

    /// The one-shot exit notification. Only the first caller gets it.
    pub fn take_exit_notifier(&self) -> Option<oneshot::Receiver<ProcessExit>> {
        self.exit_notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Write `text` plus a newline to the process's stdin.
    pub async fn write_line(&self, text: &str) -> SupervisorResult<()> {
        if self.has_exited() {
            return Err(SupervisorError::not_running());
        }

        let mut stdin = self.stdin.lock().await;
        let Some(pipe) = stdin.as_mut() else {
            return Err(SupervisorError::not_running());
        };

        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text.trim_end_matches(['\r', '\n']));
        line.push('\n');

        let written = async {
            pipe.write_all(line.as_bytes()).await?;
            pipe.flush().await
        }
        .await;

        match written {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                *stdin = None;
                Err(SupervisorError::not_running())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Ask the process to exit, escalating to a kill after `timeout`.
    ///
    /// Graceful writes the stop command to stdin; otherwise SIGTERM is sent.
    /// Returns the cached exit when the process is already gone.
    pub async fn terminate(&self, graceful: bool, timeout: Duration) -> SupervisorResult<ProcessExit> {
        if let Some(exit) = self.exit_status() {
            return Ok(exit);
        }

        self.control.terminate_requested.store(true, Ordering::SeqCst);

        if graceful {
            if let Err(e) = self.write_line(&self.stop_command).await {
                warn!("Could not send '{}' to PID {}: {}", self.stop_command, self.pid(), e);
            }
        } else {
            self.signal_terminate();
        }

        if let Some(exit) = self.wait_timeout(timeout).await {
            return Ok(exit);
        }

        warn!(
            "PID {} did not exit within {}s, killing",
            self.pid(),
            timeout.as_secs()
        );
        self.kill().await
    }

    /// Kill immediately and wait up to the kill timeout for the exit.
    pub async fn kill(&self) -> SupervisorResult<ProcessExit> {
        if let Some(exit) = self.exit_status() {
            return Ok(exit);
        }

        self.control.forced.store(true, Ordering::SeqCst);
        self.control.kill.notify_one();

        self.wait_timeout(self.kill_timeout)
            .await
            .ok_or_else(|| SupervisorError::StopTimeout {
                timeout_secs: self.kill_timeout.as_secs(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Request a kill without waiting for it.
    pub fn start_kill(&self) {
        if !self.has_exited() {
            self.control.forced.store(true, Ordering::SeqCst);
            self.control.kill.notify_one();
        }
    }

    /// Wait for the process to exit, however long it takes.
    pub async fn wait(&self) -> Option<ProcessExit> {
        let mut rx = self.exit_rx.clone();
        let exit = rx.wait_for(Option::is_some).await.ok()?;
        (*exit).clone()
    }

    async fn wait_timeout(&self, timeout: Duration) -> Option<ProcessExit> {
        tokio::time::timeout(timeout, self.wait()).await.ok().flatten()
    }

    #[cfg(unix)]
    fn signal_terminate(&self) {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(self.pid()) else {
            self.control.kill.notify_one();
            return;
        };

        info!("Sending SIGTERM to PID {}", self.pid());
        if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGTERM) {
            warn!("SIGTERM to PID {} failed: {}", self.pid(), e);
        }
    }

    #[cfg(not(unix))]
    fn signal_terminate(&self) {
        self.control.kill.notify_one();
    }
}

async fn read_lines<R>(
    stream: R,
    source: StreamSource,
    output: mpsc::Sender<LogLine>,
    clock: Arc<dyn Clock>,
    control: Arc<ExitControl>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                let line = LogLine::new(clock.now(), source, text.trim_end_matches(['\r', '\n']));
                if output.send(line).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                // Nobody is waiting on the pump; a dead stream is treated as a dead process.
                warn!("Reading {} failed, killing process: {}", source.as_str(), e);
                control.kill.notify_one();
                break;
            }
        }
    }
}

async fn wait_for_exit(
    mut child: Child,
    readers: Vec<JoinHandle<()>>,
    control: Arc<ExitControl>,
    clock: Arc<dyn Clock>,
    exit_tx: watch::Sender<Option<ProcessExit>>,
    notify_tx: oneshot::Sender<ProcessExit>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = control.kill.notified() => {
            if let Err(e) = child.start_kill() {
                debug!("Kill request ignored: {}", e);
            }
            child.wait().await
        }
    };

    let drained = tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, async {
        for reader in readers {
            let _ = reader.await;
        }
    })
    .await;
    if drained.is_err() {
        debug!("Output streams still open after exit, not waiting further");
    }

    let (code, signal) = match &status {
        Ok(status) => (status.code(), exit_signal(status)),
        Err(e) => {
            warn!("Waiting for child failed: {}", e);
            (None, None)
        }
    };

    let exit = ProcessExit {
        code,
        signal,
        kind: control.classify(),
        exited_at: clock.now(),
    };
    info!(
        "Process exited (code {:?}, signal {:?}, {:?})",
        exit.code, exit.signal, exit.kind
    );

    exit_tx.send_replace(Some(exit.clone()));
    let _ = notify_tx.send(exit);
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
