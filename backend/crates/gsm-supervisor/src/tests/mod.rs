mod log_broadcaster;
mod shutdown_coordinator;
