pub mod backup_record;
pub mod backup_type;
pub mod exit_kind;
pub mod log_line;
pub mod process_exit;
pub mod process_record;
pub mod schedule_definition;
pub mod server_state;
pub mod server_status;
pub mod state_transition;
pub mod stream_source;
