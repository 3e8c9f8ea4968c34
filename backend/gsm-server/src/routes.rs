use crate::{
    AppState, create_backup, create_schedule, delete_backup, delete_schedule, download_backup,
    get_logs, get_schedule, get_status, health, list_backups, list_schedules, restart_server,
    restore_backup, send_command, start_server, stop_server, stream_logs, update_schedule,
};

use axum::{
    Router,
    routing::{get, post},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    build_router_with_limit(state, None)
}

/// Same as [`build_router`], capping in-flight requests at `max_connections`.
pub fn build_router_with_limit(state: AppState, max_connections: Option<usize>) -> Router {
    let api = Router::new()
        // Server lifecycle
        .route("/server/status", get(get_status))
        .route("/server/start", post(start_server))
        .route("/server/stop", post(stop_server))
        .route("/server/restart", post(restart_server))
        .route("/server/command", post(send_command))
        .route("/server/logs", get(get_logs))
        .route("/server/logs/ws", get(stream_logs))
        // Backups
        .route("/backups", get(list_backups).post(create_backup))
        .route("/backups/{id}", axum::routing::delete(delete_backup))
        .route("/backups/{id}/restore", post(restore_backup))
        .route("/backups/{id}/download", get(download_backup))
        // Schedules
        .route(
            "/backups/scheduled",
            get(list_schedules).post(create_schedule),
        )
        .route(
            "/backups/scheduled/{id}",
            get(get_schedule)
                .patch(update_schedule)
                .delete(delete_schedule),
        );

    let router = Router::new()
        .nest("/api/v1", api)
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .with_state(state);

    let router = match max_connections {
        Some(limit) => router.layer(ConcurrencyLimitLayer::new(limit)),
        None => router,
    };

    // CORS middleware (the web console may be served from another origin)
    router.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
