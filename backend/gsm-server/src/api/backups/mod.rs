pub mod backup_dto;
pub mod backup_list_response;
pub mod backup_response;
#[allow(clippy::module_inception)]
pub mod backups;
pub mod create_backup_request;
