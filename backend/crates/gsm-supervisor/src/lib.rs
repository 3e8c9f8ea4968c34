mod error;
mod log_broadcaster;
mod metrics;
mod player_tracker;
mod process_handle;
mod process_spec;
mod process_stats;
mod server_supervisor;
mod shutdown_coordinator;
mod shutdown_guard;
mod supervisor_settings;

#[cfg(test)]
mod tests;

pub use error::{Result, SupervisorError};
pub use log_broadcaster::{LogBroadcaster, LogReceiver};
pub use metrics::Metrics;
pub use player_tracker::PlayerTracker;
pub use process_handle::ProcessHandle;
pub use process_spec::ProcessSpec;
pub use server_supervisor::{LifecycleGuard, ServerSupervisor};
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use supervisor_settings::SupervisorSettings;

/// Console lines buffered between the stream readers and the output pump.
const OUTPUT_CHANNEL_CAPACITY: usize = 1024;

/// Transitions kept for diagnostics.
const TRANSITION_HISTORY_LIMIT: usize = 64;
