pub mod command_request;
pub mod command_response;
pub mod log_backlog_response;
pub mod log_line_dto;
pub mod logs_ws;
#[allow(clippy::module_inception)]
pub mod server;
pub mod status_response;
pub mod stop_request;
