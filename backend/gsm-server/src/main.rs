use gsm_backup::{BackupScheduler, BackupSettings, BackupStore};
use gsm_config::Config;
use gsm_core::{Clock, SystemClock};
use gsm_db::{BackupRepository, ScheduleRepository};
use gsm_server::error::ServerError;
use gsm_server::routes::build_router_with_limit;
use gsm_server::{AppState, logger};
use gsm_supervisor::{LogBroadcaster, ServerSupervisor, ShutdownCoordinator, SupervisorSettings};

use std::error::Error;
use std::sync::Arc;

use log::{error, info, warn};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    // Load and validate configuration
    let config = Config::load()?;
    config.validate()?;

    // Initialize logger (before any other logging)
    logger::initialize(
        config.logging.level,
        config.log_file_path()?,
        config.logging.colored,
    )?;

    info!("Starting gsm-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics {
            message: e.to_string(),
        })?;

    // Database (migrations run on connect)
    let database_path = config.database_path()?;
    info!("Connecting to database: {}", database_path.display());
    let pool = gsm_db::connect(&database_path).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let broadcaster = LogBroadcaster::new(config.logs.ring_capacity, config.logs.subscriber_buffer);
    let supervisor = ServerSupervisor::new(
        SupervisorSettings::from_config(&config.process, config.process_working_dir()?),
        broadcaster,
        clock.clone(),
    );

    let store = BackupStore::new(
        BackupSettings::from_config(
            &config.backup,
            config.backup_data_dir()?,
            config.backup_dir()?,
        ),
        BackupRepository::new(pool.clone()),
        supervisor.clone(),
        clock.clone(),
    );
    let scheduler = BackupScheduler::new(store.clone(), ScheduleRepository::new(pool.clone()), clock);

    let shutdown = ShutdownCoordinator::new();

    let scheduler_handle = if config.backup.scheduler_enabled {
        Some(scheduler.spawn(shutdown.subscribe_guard()))
    } else {
        warn!("Backup scheduler DISABLED - schedules will not fire");
        None
    };

    if !config.auth.enabled {
        warn!("Authentication DISABLED - every caller is treated as admin");
    }

    let app_state = AppState {
        supervisor: supervisor.clone(),
        store,
        scheduler,
        pool,
        auth_enabled: config.auth.enabled,
        shutdown: shutdown.clone(),
        metrics: Some(metrics),
    };

    let app = build_router_with_limit(app_state, Some(config.server.max_connections));

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Server listening on {}", listener.local_addr()?);

    // Spawn signal handler for graceful shutdown
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                shutdown_for_signal.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
            }
        }
    });

    let shutdown_for_serve = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_for_serve.subscribe_guard().wait().await;
        })
        .await?;

    // The listener only returns early on error; make sure background tasks stop too
    shutdown.shutdown();

    if let Some(handle) = scheduler_handle
        && let Err(e) = handle.await
    {
        error!("Backup scheduler task failed: {}", e);
    }

    supervisor.shutdown().await;
    info!("Graceful shutdown complete");

    Ok(())
}
