pub mod clock;
pub mod error;
pub mod models;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result as CoreResult};
pub use models::backup_record::BackupRecord;
pub use models::backup_type::BackupType;
pub use models::exit_kind::ExitKind;
pub use models::log_line::LogLine;
pub use models::process_exit::ProcessExit;
pub use models::process_record::ProcessRecord;
pub use models::schedule_definition::ScheduleDefinition;
pub use models::server_state::ServerState;
pub use models::server_status::ServerStatus;
pub use models::state_transition::StateTransition;
pub use models::stream_source::StreamSource;
