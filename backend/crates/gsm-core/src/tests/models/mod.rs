mod backup_type;
mod log_line;
mod process_record;
mod schedule_definition;
mod server_state;
