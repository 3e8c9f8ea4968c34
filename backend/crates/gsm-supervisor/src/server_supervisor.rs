//! Lifecycle state machine around a single game-server process.

use crate::{
    LogBroadcaster, Metrics, OUTPUT_CHANNEL_CAPACITY, PlayerTracker, ProcessHandle,
    Result as SupervisorResult, SupervisorError, SupervisorSettings, TRANSITION_HISTORY_LIMIT,
    process_stats,
};

use gsm_core::{
    Clock, LogLine, ProcessExit, ProcessRecord, ServerState, ServerStatus, StateTransition,
};

use std::collections::VecDeque;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use tokio::sync::{Mutex, OwnedMutexGuard, mpsc, oneshot, watch};
use tracing::{Instrument, error, info, info_span, warn};

/// Proof that no lifecycle operation can run until this is dropped.
pub struct LifecycleGuard {
    _guard: OwnedMutexGuard<()>,
}

/// Owns the game-server process and drives it through
/// Stopped → Starting → Running → Stopping → Stopped (or Crashed).
///
/// `start`, `stop` and `restart` are serialized on one lock and fail fast with
/// `OperationInProgress` instead of queueing. `start` only holds the lock
/// until the process is spawned, so a server that hangs while booting can
/// still be stopped.
///
/// Console commands queue on a separate console lock. `stop` takes it while
/// leaving Running, so no command is written once a stop has begun.
#[derive(Clone)]
pub struct ServerSupervisor {
    inner: Arc<SupervisorInner>,
}

struct SupervisorInner {
    settings: SupervisorSettings,
    broadcaster: LogBroadcaster,
    clock: Arc<dyn Clock>,
    lifecycle: Arc<Mutex<()>>,
    console: Mutex<()>,
    state_tx: watch::Sender<ServerState>,
    transitions: StdMutex<VecDeque<StateTransition>>,
    runtime: StdMutex<Option<Runtime>>,
    last_exit: StdMutex<Option<ProcessExit>>,
    players: Arc<PlayerTracker>,
    generation: AtomicU64,
    metrics: Metrics,
}

/// The attached process. Present from spawn until its exit is processed.
struct Runtime {
    handle: Arc<ProcessHandle>,
    generation: u64,
    stop_requested: bool,
}

impl ServerSupervisor {
    pub fn new(
        settings: SupervisorSettings,
        broadcaster: LogBroadcaster,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ServerState::Stopped);

        Self {
            inner: Arc::new(SupervisorInner {
                settings,
                broadcaster,
                clock,
                lifecycle: Arc::new(Mutex::new(())),
                console: Mutex::new(()),
                state_tx,
                transitions: StdMutex::new(VecDeque::with_capacity(TRANSITION_HISTORY_LIMIT)),
                runtime: StdMutex::new(None),
                last_exit: StdMutex::new(None),
                players: Arc::new(PlayerTracker::new()),
                generation: AtomicU64::new(0),
                metrics: Metrics::new(),
            }),
        }
    }

    pub fn state(&self) -> ServerState {
        *self.inner.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ServerState> {
        self.inner.state_tx.subscribe()
    }

    pub fn broadcaster(&self) -> &LogBroadcaster {
        &self.inner.broadcaster
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.inner.settings
    }

    /// Oldest first.
    pub fn transitions(&self) -> Vec<StateTransition> {
        lock(&self.inner.transitions).iter().copied().collect()
    }

    pub fn last_exit(&self) -> Option<ProcessExit> {
        lock(&self.inner.last_exit).clone()
    }

    pub fn process_record(&self) -> Option<ProcessRecord> {
        self.current_handle().map(|handle| handle.record().clone())
    }

    /// Hold off every lifecycle operation. Fails fast if one is already running.
    pub fn try_lock_lifecycle(&self) -> SupervisorResult<LifecycleGuard> {
        let guard = Arc::clone(&self.inner.lifecycle)
            .try_lock_owned()
            .map_err(|_| SupervisorError::operation_in_progress())?;
        Ok(LifecycleGuard { _guard: guard })
    }

    pub fn status(&self) -> ServerStatus {
        let state = self.state();
        let record = self.process_record();
        let now = self.inner.clock.now();
        let running = state == ServerState::Running;

        ServerStatus {
            state,
            pid: record.as_ref().map(|r| r.pid),
            command_line: record.as_ref().map(|r| r.command_line.clone()),
            started_at: record.as_ref().map(|r| r.started_at),
            uptime_secs: record
                .as_ref()
                .map(|r| (now - r.started_at).num_seconds().max(0)),
            memory_bytes: record
                .as_ref()
                .filter(|_| running)
                .and_then(|r| process_stats::memory_bytes(r.pid)),
            players_online: running.then(|| self.inner.players.count()),
            last_exit: self.last_exit(),
            log_subscribers: self.inner.broadcaster.subscriber_count(),
            dropped_lines: self.inner.broadcaster.dropped_lines(),
            transitions: self.transitions(),
        }
    }

    /// Spawn the server and wait for it to report ready.
    pub async fn start(&self) -> SupervisorResult<ProcessRecord> {
        let guard = self.lock_for_operation(&[ServerState::Starting, ServerState::Stopping])?;
        self.start_locked(guard)
            .instrument(info_span!("lifecycle", operation = "start"))
            .await
    }

    /// Stop the server. Graceful sends the stop command, otherwise SIGTERM.
    pub async fn stop(&self, graceful: bool) -> SupervisorResult<ProcessExit> {
        let _guard = self.lock_for_operation(&[ServerState::Stopping])?;
        self.stop_locked(graceful)
            .instrument(info_span!("lifecycle", operation = "stop", graceful))
            .await
    }

    /// Stop (when a process is attached) then start. A stop that outlasts
    /// `restart_timeout` kills the process, leaves the server Crashed and
    /// returns `StopTimeout`.
    pub async fn restart(&self) -> SupervisorResult<ProcessRecord> {
        let guard = self.lock_for_operation(&[ServerState::Starting, ServerState::Stopping])?;

        async move {
            if self.state() == ServerState::Running {
                let timeout = self.inner.settings.restart_timeout;
                match tokio::time::timeout(timeout, self.stop_locked(true)).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => return Err(e),
                    Err(_) => {
                        warn!(
                            "Stop did not finish within {}s, aborting restart",
                            timeout.as_secs()
                        );
                        self.abandon_process();
                        return Err(SupervisorError::StopTimeout {
                            timeout_secs: timeout.as_secs(),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                }
            }

            self.start_locked(guard).await
        }
        .instrument(info_span!("lifecycle", operation = "restart"))
        .await
    }

    /// Forward one console line to the server's stdin.
    pub async fn send_command(&self, text: &str) -> SupervisorResult<()> {
        if self.state() != ServerState::Running {
            return Err(SupervisorError::not_running());
        }

        let text = text.trim();
        if text.is_empty() || text.contains(['\n', '\r']) {
            return Err(SupervisorError::InvalidCommand {
                message: "command must be a single non-empty line".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // Commands wait their turn. A stop cannot begin while this is held.
        let _console = self.inner.console.lock().await;
        if self.state() != ServerState::Running {
            return Err(SupervisorError::not_running());
        }

        let handle = self.current_handle().ok_or_else(SupervisorError::not_running)?;
        handle.write_line(text).await
    }

    /// Called once when the manager exits: waits for any in-flight operation,
    /// then stops an attached server gracefully.
    pub async fn shutdown(&self) {
        let _guard = Arc::clone(&self.inner.lifecycle).lock_owned().await;

        if matches!(self.state(), ServerState::Running | ServerState::Starting) {
            info!("Stopping game server before exit");
            if let Err(e) = self.stop_locked(true).await {
                error!("Failed to stop game server on shutdown: {}", e);
            }
        }
    }

    /// `busy` lists states in which an earlier operation is still settling.
    fn lock_for_operation(&self, busy: &[ServerState]) -> SupervisorResult<OwnedMutexGuard<()>> {
        let guard = Arc::clone(&self.inner.lifecycle)
            .try_lock_owned()
            .map_err(|_| SupervisorError::operation_in_progress())?;

        if busy.contains(&self.state()) {
            return Err(SupervisorError::operation_in_progress());
        }

        Ok(guard)
    }

    async fn start_locked(&self, guard: OwnedMutexGuard<()>) -> SupervisorResult<ProcessRecord> {
        let state = self.state();
        if !matches!(state, ServerState::Stopped | ServerState::Crashed) {
            return Err(SupervisorError::invalid_state("start", state));
        }

        self.transition_if(
            |s| matches!(s, ServerState::Stopped | ServerState::Crashed),
            ServerState::Starting,
        );
        self.inner.players.reset();

        let settings = &self.inner.settings;
        let (line_tx, line_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);

        let spawned =
            ProcessHandle::spawn(&settings.process, line_tx, Arc::clone(&self.inner.clock)).await;
        let handle = match spawned {
            Ok(handle) => Arc::new(handle),
            Err(e) => {
                error!("Spawn failed: {}", e);
                self.transition_if(|s| s == ServerState::Starting, ServerState::Crashed);
                self.inner.metrics.crashed();
                return Err(SupervisorError::start_failed(e.to_string()));
            }
        };

        let record = handle.record().clone();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.inner.runtime) = Some(Runtime {
            handle: Arc::clone(&handle),
            generation,
            stop_requested: false,
        });

        let (ready_tx, ready_rx) = oneshot::channel();
        let ready_tx = if settings.ready_pattern.is_empty() {
            let _ = ready_tx.send(());
            None
        } else {
            Some(ready_tx)
        };
        self.spawn_output_pump(line_rx, ready_tx);

        if let Some(exit_rx) = handle.take_exit_notifier() {
            self.spawn_exit_monitor(generation, exit_rx);
        }

        // Readiness is awaited without the lock so stop() stays available.
        drop(guard);

        self.await_ready(&handle, generation, ready_rx).await?;
        Ok(record)
    }

    async fn await_ready(
        &self,
        handle: &ProcessHandle,
        generation: u64,
        ready_rx: oneshot::Receiver<()>,
    ) -> SupervisorResult<()> {
        let timeout = self.inner.settings.startup_timeout;
        let mut state_rx = self.subscribe_state();

        let outcome = tokio::time::timeout(timeout, async {
            // A closed ready channel (output ended) disables the first branch.
            tokio::select! {
                Ok(()) = ready_rx => true,
                _ = state_rx.wait_for(|s| *s != ServerState::Starting) => false,
            }
        })
        .await;

        match outcome {
            Ok(true) => {
                let promoted = self.is_current(generation)
                    && self.transition_if(|s| s == ServerState::Starting, ServerState::Running);
                if promoted {
                    info!("Game server is ready (PID {})", handle.pid());
                    Ok(())
                } else {
                    Err(SupervisorError::start_failed(format!(
                        "server became {} before it was ready",
                        self.state()
                    )))
                }
            }
            Ok(false) => {
                let message = match (self.state(), self.last_exit()) {
                    (ServerState::Stopping | ServerState::Stopped, _) => {
                        "start interrupted by stop".to_string()
                    }
                    (ServerState::Crashed, Some(exit)) => format!(
                        "process exited during startup (code {:?}, signal {:?})",
                        exit.code, exit.signal
                    ),
                    (state, _) => format!("server became {} during startup", state),
                };
                Err(SupervisorError::start_failed(message))
            }
            Err(_) => {
                warn!(
                    "No line matching '{}' within {}s, killing PID {}",
                    self.inner.settings.ready_pattern,
                    timeout.as_secs(),
                    handle.pid()
                );
                if handle.kill().await.is_err() {
                    self.abandon_process();
                }
                self.wait_while(ServerState::Starting).await;
                Err(SupervisorError::start_failed(format!(
                    "server not ready within {}s",
                    timeout.as_secs()
                )))
            }
        }
    }

    async fn stop_locked(&self, graceful: bool) -> SupervisorResult<ProcessExit> {
        let state = self.state();
        if !matches!(state, ServerState::Running | ServerState::Starting) {
            return Err(SupervisorError::invalid_state("stop", state));
        }

        let console = self.inner.console.lock().await;

        // Flag and transition under the runtime lock so the exit monitor sees both or neither.
        let handle = {
            let mut runtime = lock(&self.inner.runtime);
            let Some(current) = runtime.as_mut() else {
                return Err(SupervisorError::invalid_state("stop", self.state()));
            };
            if !self.transition_if(
                |s| matches!(s, ServerState::Running | ServerState::Starting),
                ServerState::Stopping,
            ) {
                return Err(SupervisorError::invalid_state("stop", self.state()));
            }
            current.stop_requested = true;
            Arc::clone(&current.handle)
        };
        drop(console);
        info!(
            "Stopping game server (PID {}, {})",
            handle.pid(),
            if graceful { "graceful" } else { "SIGTERM" }
        );

        match handle.terminate(graceful, self.inner.settings.stop_timeout).await {
            Ok(exit) => {
                // The exit monitor moves Stopping -> Stopped.
                self.wait_while(ServerState::Stopping).await;
                Ok(exit)
            }
            Err(e) => {
                error!("Game server did not exit: {}", e);
                self.abandon_process();
                Err(e)
            }
        }
    }

    /// Give up on the attached process: request a kill and mark the server Crashed.
    fn abandon_process(&self) {
        if let Some(runtime) = lock(&self.inner.runtime).take() {
            runtime.handle.start_kill();
        }
        if self.transition_if(
            |s| matches!(s, ServerState::Starting | ServerState::Running | ServerState::Stopping),
            ServerState::Crashed,
        ) {
            self.inner.metrics.crashed();
        }
    }

    /// Wait until the state leaves `state`, forcing the issue after the kill timeout.
    async fn wait_while(&self, state: ServerState) {
        let mut state_rx = self.subscribe_state();
        let settled = tokio::time::timeout(
            self.inner.settings.process.kill_timeout,
            state_rx.wait_for(|s| *s != state),
        )
        .await
        .is_ok_and(|changed| changed.is_ok());

        if !settled {
            warn!("Server still {} after process exit, forcing transition", state);
            let target = match state {
                ServerState::Stopping => ServerState::Stopped,
                _ => ServerState::Crashed,
            };
            if let Some(runtime) = lock(&self.inner.runtime).take() {
                runtime.handle.start_kill();
            }
            self.transition_if(|s| s == state, target);
        }
    }

    fn spawn_output_pump(
        &self,
        mut line_rx: mpsc::Receiver<LogLine>,
        mut ready_tx: Option<oneshot::Sender<()>>,
    ) {
        let broadcaster = self.inner.broadcaster.clone();
        let players = Arc::clone(&self.inner.players);
        let ready_pattern = self.inner.settings.ready_pattern.clone();

        tokio::spawn(async move {
            while let Some(line) = line_rx.recv().await {
                players.observe(&line.text);

                if ready_tx.is_some()
                    && line.text.contains(&ready_pattern)
                    && let Some(tx) = ready_tx.take()
                {
                    let _ = tx.send(());
                }

                broadcaster.publish(line);
            }
        });
    }

    fn spawn_exit_monitor(&self, generation: u64, exit_rx: oneshot::Receiver<ProcessExit>) {
        let supervisor = self.clone();

        tokio::spawn(async move {
            if let Ok(exit) = exit_rx.await {
                supervisor.on_process_exit(generation, exit);
            }
        });
    }

    fn on_process_exit(&self, generation: u64, exit: ProcessExit) {
        *lock(&self.inner.last_exit) = Some(exit.clone());

        let mut runtime = lock(&self.inner.runtime);
        let stop_requested = match runtime.as_ref() {
            Some(current) if current.generation == generation => current.stop_requested,
            // Already abandoned or replaced.
            _ => return,
        };
        runtime.take();

        if stop_requested {
            self.transition_if(|s| s == ServerState::Stopping, ServerState::Stopped);
            return;
        }

        let crashed = self.transition_if(
            |s| matches!(s, ServerState::Running | ServerState::Starting),
            ServerState::Crashed,
        );
        drop(runtime);

        if crashed {
            self.inner.metrics.crashed();
            error!(
                "Game server exited unexpectedly (code {:?}, signal {:?})",
                exit.code, exit.signal
            );
        }
    }

    fn current_handle(&self) -> Option<Arc<ProcessHandle>> {
        lock(&self.inner.runtime)
            .as_ref()
            .map(|runtime| Arc::clone(&runtime.handle))
    }

    fn is_current(&self, generation: u64) -> bool {
        lock(&self.inner.runtime)
            .as_ref()
            .is_some_and(|runtime| runtime.generation == generation)
    }

    /// Move to `to` when the current state satisfies `allowed` and the edge is
    /// a documented one. Returns whether the state changed.
    fn transition_if(&self, allowed: impl Fn(ServerState) -> bool, to: ServerState) -> bool {
        let mut from = None;
        self.inner.state_tx.send_if_modified(|current| {
            if allowed(*current) && current.can_transition_to(to) {
                from = Some(*current);
                *current = to;
                true
            } else {
                false
            }
        });

        let Some(from) = from else {
            return false;
        };

        self.record_transition(from, to, self.inner.clock.now());
        true
    }

    fn record_transition(&self, from: ServerState, to: ServerState, at: DateTime<Utc>) {
        let mut transitions = lock(&self.inner.transitions);
        if transitions.len() == TRANSITION_HISTORY_LIMIT {
            transitions.pop_front();
        }
        transitions.push_back(StateTransition { from, to, at });
        drop(transitions);

        self.inner.metrics.state_changed(to);
        info!("Server state {} -> {}", from, to);
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
