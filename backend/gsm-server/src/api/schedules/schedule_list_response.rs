use crate::ScheduleDto;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScheduleListResponse {
    pub schedules: Vec<ScheduleDto>,
}
