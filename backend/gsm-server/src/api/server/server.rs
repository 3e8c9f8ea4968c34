//! Server lifecycle REST API handlers

use crate::{
    ApiError, ApiResult, AppState, Caller, CommandRequest, CommandResponse, LogBacklogResponse,
    LogLineDto, Role, StatusResponse, StopRequest,
};

use axum::{Json, extract::State};

/// GET /api/v1/server/status
pub async fn get_status(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<StatusResponse>> {
    caller.require(Role::Viewer)?;

    Ok(Json(StatusResponse {
        status: state.supervisor.status(),
    }))
}

/// POST /api/v1/server/start
///
/// Returns once the server has reported ready.
pub async fn start_server(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<StatusResponse>> {
    caller.require(Role::Moderator)?;

    let record = state.supervisor.start().await?;
    log::info!("Server started by {} (pid {})", caller.0, record.pid);

    Ok(Json(StatusResponse {
        status: state.supervisor.status(),
    }))
}

/// POST /api/v1/server/stop
pub async fn stop_server(
    State(state): State<AppState>,
    caller: Caller,
    request: Option<Json<StopRequest>>,
) -> ApiResult<Json<StatusResponse>> {
    caller.require(Role::Moderator)?;

    let Json(request) = request.unwrap_or_default();
    let exit = state.supervisor.stop(request.graceful).await?;
    log::info!("Server stopped by {} ({:?})", caller.0, exit.kind);

    Ok(Json(StatusResponse {
        status: state.supervisor.status(),
    }))
}

/// POST /api/v1/server/restart
pub async fn restart_server(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<StatusResponse>> {
    caller.require(Role::Moderator)?;

    let record = state.supervisor.restart().await?;
    log::info!("Server restarted by {} (pid {})", caller.0, record.pid);

    Ok(Json(StatusResponse {
        status: state.supervisor.status(),
    }))
}

/// POST /api/v1/server/command
pub async fn send_command(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CommandRequest>,
) -> ApiResult<Json<CommandResponse>> {
    caller.require(Role::Moderator)?;

    if request.text.trim().is_empty() {
        return Err(ApiError::validation("Command text must not be empty"));
    }

    state.supervisor.send_command(&request.text).await?;

    Ok(Json(CommandResponse { sent: request.text }))
}

/// GET /api/v1/server/logs
pub async fn get_logs(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<LogBacklogResponse>> {
    caller.require(Role::Viewer)?;

    let broadcaster = state.supervisor.broadcaster();

    Ok(Json(LogBacklogResponse {
        lines: broadcaster
            .backlog()
            .into_iter()
            .map(|line| LogLineDto::new(line, 0))
            .collect(),
        dropped_lines: broadcaster.dropped_lines(),
    }))
}
