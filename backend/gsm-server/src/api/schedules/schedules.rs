//! Backup schedule REST API handlers

use crate::{
    ApiResult, AppState, Caller, CreateScheduleRequest, DeleteResponse, Role, ScheduleDto,
    ScheduleListResponse, ScheduleResponse, UpdateScheduleRequest,
};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// GET /api/v1/backups/scheduled
pub async fn list_schedules(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<ScheduleListResponse>> {
    caller.require(Role::Viewer)?;

    let schedules = state.scheduler.list_schedules().await?;

    Ok(Json(ScheduleListResponse {
        schedules: schedules.into_iter().map(ScheduleDto::from).collect(),
    }))
}

/// GET /api/v1/backups/scheduled/{id}
pub async fn get_schedule(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<ScheduleResponse>> {
    caller.require(Role::Viewer)?;

    let schedule = state.scheduler.get_schedule(Uuid::parse_str(&id)?).await?;

    Ok(Json(ScheduleResponse {
        schedule: ScheduleDto::from(schedule),
    }))
}

/// POST /api/v1/backups/scheduled
pub async fn create_schedule(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateScheduleRequest>,
) -> ApiResult<(StatusCode, Json<ScheduleResponse>)> {
    caller.require(Role::Admin)?;

    let schedule = state
        .scheduler
        .create_schedule(&req.name, &req.cron_expression, req.enabled)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse {
            schedule: ScheduleDto::from(schedule),
        }),
    ))
}

/// PATCH /api/v1/backups/scheduled/{id}
pub async fn update_schedule(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(req): Json<UpdateScheduleRequest>,
) -> ApiResult<Json<ScheduleResponse>> {
    caller.require(Role::Admin)?;

    let id = Uuid::parse_str(&id)?;
    let schedule = state.scheduler.update_schedule(id, req.into()).await?;

    Ok(Json(ScheduleResponse {
        schedule: ScheduleDto::from(schedule),
    }))
}

/// DELETE /api/v1/backups/scheduled/{id}
pub async fn delete_schedule(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    caller.require(Role::Admin)?;

    let id = Uuid::parse_str(&id)?;
    state.scheduler.delete_schedule(id).await?;

    Ok(Json(DeleteResponse {
        deleted_id: id.to_string(),
    }))
}
