pub mod create_schedule_request;
pub mod schedule_dto;
pub mod schedule_list_response;
pub mod schedule_response;
#[allow(clippy::module_inception)]
pub mod schedules;
pub mod update_schedule_request;
