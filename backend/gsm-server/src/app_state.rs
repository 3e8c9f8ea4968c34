use gsm_backup::{BackupScheduler, BackupStore};
use gsm_supervisor::{ServerSupervisor, ShutdownCoordinator};

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub supervisor: ServerSupervisor,
    pub store: BackupStore,
    pub scheduler: BackupScheduler,
    pub pool: SqlitePool,
    /// When false every caller is treated as an admin
    pub auth_enabled: bool,
    pub shutdown: ShutdownCoordinator,
    /// `None` when no recorder is installed (tests)
    pub metrics: Option<PrometheusHandle>,
}
