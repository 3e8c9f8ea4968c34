pub mod connection;
pub mod error;
pub mod repositories;

mod rows;

pub use connection::{connect, connect_in_memory};
pub use error::{DbError, Result};
pub use repositories::backup_repository::BackupRepository;
pub use repositories::schedule_repository::ScheduleRepository;
