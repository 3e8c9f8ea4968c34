pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;

#[cfg(test)]
mod tests;

pub use api::{
    backups::{
        backup_dto::BackupDto,
        backup_list_response::BackupListResponse,
        backup_response::BackupResponse,
        backups::{create_backup, delete_backup, download_backup, list_backups, restore_backup},
        create_backup_request::CreateBackupRequest,
    },
    delete_response::DeleteResponse,
    error::ApiError,
    error::Result as ApiResult,
    extractors::caller::{Caller, ROLE_HEADER, Role},
    schedules::{
        create_schedule_request::CreateScheduleRequest,
        schedule_dto::ScheduleDto,
        schedule_list_response::ScheduleListResponse,
        schedule_response::ScheduleResponse,
        schedules::{create_schedule, delete_schedule, get_schedule, list_schedules, update_schedule},
        update_schedule_request::UpdateScheduleRequest,
    },
    server::{
        command_request::CommandRequest,
        command_response::CommandResponse,
        log_backlog_response::LogBacklogResponse,
        log_line_dto::LogLineDto,
        logs_ws::stream_logs,
        server::{get_logs, get_status, restart_server, send_command, start_server, stop_server},
        status_response::StatusResponse,
        stop_request::StopRequest,
    },
};
pub use app_state::AppState;

pub use crate::routes::build_router;
