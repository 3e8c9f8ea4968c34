use crate::ScheduleDto;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub schedule: ScheduleDto,
}
