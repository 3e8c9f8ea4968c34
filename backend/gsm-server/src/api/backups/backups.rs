//! Backup REST API handlers

use crate::{
    ApiError, ApiResult, AppState, BackupDto, BackupListResponse, BackupResponse, Caller,
    CreateBackupRequest, DeleteResponse, Role,
};

use std::panic::Location;

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use error_location::ErrorLocation;
use futures::stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// GET /api/v1/backups
pub async fn list_backups(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<BackupListResponse>> {
    caller.require(Role::Viewer)?;

    let backups = state.store.list().await?;

    Ok(Json(BackupListResponse {
        backups: backups.into_iter().map(BackupDto::from).collect(),
    }))
}

/// POST /api/v1/backups
pub async fn create_backup(
    State(state): State<AppState>,
    caller: Caller,
    request: Option<Json<CreateBackupRequest>>,
) -> ApiResult<(StatusCode, Json<BackupResponse>)> {
    caller.require(Role::Moderator)?;

    let Json(request) = request.unwrap_or_default();
    let backup_type = request.backup_type.unwrap_or_default();
    let description = request
        .description
        .map(|d| d.trim().to_string())
        .unwrap_or_default();

    let record = state.store.create(backup_type, description).await?;
    log::info!("Backup {} created by {}", record.filename, caller.0);

    Ok((
        StatusCode::CREATED,
        Json(BackupResponse {
            backup: BackupDto::from(record),
        }),
    ))
}

/// DELETE /api/v1/backups/{id}
pub async fn delete_backup(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    caller.require(Role::Admin)?;

    let id = Uuid::parse_str(&id)?;
    let record = state.store.delete(id).await?;
    log::info!("Backup {} deleted by {}", record.filename, caller.0);

    Ok(Json(DeleteResponse {
        deleted_id: id.to_string(),
    }))
}

/// POST /api/v1/backups/{id}/restore
///
/// The server must be stopped.
pub async fn restore_backup(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<BackupResponse>> {
    caller.require(Role::Admin)?;

    let id = Uuid::parse_str(&id)?;
    let record = state.store.restore(id).await?;
    log::info!("Backup {} restored by {}", record.filename, caller.0);

    Ok(Json(BackupResponse {
        backup: BackupDto::from(record),
    }))
}

/// GET /api/v1/backups/{id}/download
pub async fn download_backup(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    caller.require(Role::Moderator)?;

    let id = Uuid::parse_str(&id)?;
    let download = state.store.download(id).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        download.record.filename
    ))
    .map_err(|e| ApiError::Internal {
        code: "INTERNAL_ERROR",
        message: format!("Invalid backup filename: {}", e),
        hint: None,
        location: ErrorLocation::from(Location::caller()),
    })?;

    let body = Body::from_stream(stream::unfold(Some(download.file), read_chunk));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_LENGTH, HeaderValue::from(download.size_bytes)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Next chunk of the archive; the stream ends after EOF or the first error.
async fn read_chunk(
    file: Option<File>,
) -> Option<(Result<Bytes, std::io::Error>, Option<File>)> {
    let mut file = file?;
    let mut buffer = vec![0u8; DOWNLOAD_CHUNK_SIZE];

    match file.read(&mut buffer).await {
        Ok(0) => None,
        Ok(n) => {
            buffer.truncate(n);
            Some((Ok(Bytes::from(buffer)), Some(file)))
        }
        Err(e) => Some((Err(e), None)),
    }
}
