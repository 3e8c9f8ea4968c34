use crate::ApiError;

use gsm_backup::BackupError;
use gsm_core::ServerState;
use gsm_supervisor::SupervisorError;

use axum::response::IntoResponse;
use http::StatusCode;
use http_body_util::BodyExt;
use uuid::Uuid;

async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn given_not_running_when_converted_then_409_with_code_and_hint() {
    // Given
    let error = ApiError::from(SupervisorError::not_running());

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "NOT_RUNNING");
    assert!(json["error"]["hint"].as_str().unwrap().contains("Start the server"));
}

#[tokio::test]
async fn given_invalid_state_when_converted_then_409() {
    // Given
    let error = ApiError::from(SupervisorError::invalid_state("stop", ServerState::Stopped));

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn given_start_failed_when_converted_then_500() {
    // Given
    let error = ApiError::from(SupervisorError::start_failed("no ready line"));

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "START_FAILED");
    assert!(json["error"]["message"].as_str().unwrap().contains("no ready line"));
}

#[tokio::test]
async fn given_backup_busy_when_converted_then_409() {
    // Given
    let error = ApiError::from(BackupError::busy());

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "BACKUP_BUSY");
}

#[tokio::test]
async fn given_server_running_when_converted_then_409() {
    // Given
    let error = ApiError::from(BackupError::server_running(ServerState::Running));

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "SERVER_RUNNING");
}

#[tokio::test]
async fn given_unknown_backup_when_converted_then_404() {
    // Given
    let error = ApiError::from(BackupError::backup_not_found(Uuid::new_v4()));

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn given_invalid_schedule_when_converted_then_400() {
    // Given
    let error = ApiError::from(BackupError::invalid_schedule("bad cron"));

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "INVALID_SCHEDULE");
}

#[tokio::test]
async fn given_wrapped_supervisor_error_when_converted_then_inner_kind_wins() {
    // Given
    let error = ApiError::from(BackupError::from(SupervisorError::operation_in_progress()));

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "OPERATION_IN_PROGRESS");
}

#[tokio::test]
async fn given_forbidden_when_converted_then_403_without_hint() {
    // Given
    let error = ApiError::forbidden("admin role required");

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "FORBIDDEN");
    assert!(json["error"].get("hint").is_none());
}

#[tokio::test]
async fn given_malformed_uuid_when_converted_then_400() {
    // Given
    let parse_error = Uuid::parse_str("not-a-uuid").unwrap_err();

    // When
    let (status, json) = body_json(ApiError::from(parse_error)).await;

    // Then
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}
