use crate::{BackupType, ScheduleDefinition};

use chrono::Utc;
use googletest::prelude::*;

#[test]
fn given_new_schedule_then_defaults_to_scheduled_type_without_runs() {
    let schedule = ScheduleDefinition::new("nightly".into(), "0 3 * * *".into(), true, Utc::now());

    assert_that!(schedule.backup_type, eq(BackupType::Scheduled));
    assert_that!(schedule.last_run_at, none());
    assert_that!(schedule.validate(), ok(anything()));
}

#[test]
fn given_blank_name_when_validated_then_rejected() {
    let schedule = ScheduleDefinition::new("   ".into(), "0 3 * * *".into(), true, Utc::now());

    assert_that!(schedule.validate(), err(anything()));
}

#[test]
fn given_short_cron_expression_when_validated_then_rejected() {
    let schedule = ScheduleDefinition::new("nightly".into(), "0 3 *".into(), true, Utc::now());

    assert_that!(schedule.validate(), err(anything()));
}
