pub mod backups;
pub mod delete_response;
pub mod error;
pub mod extractors;
pub mod schedules;
pub mod server;
