pub mod backup_repository;
pub mod schedule_repository;
