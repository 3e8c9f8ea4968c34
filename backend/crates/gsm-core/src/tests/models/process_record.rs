use crate::ProcessRecord;

use chrono::Utc;
use googletest::prelude::*;

#[test]
fn given_command_and_args_when_recorded_then_command_line_is_space_joined() {
    let args = vec!["-Xmx2G".to_string(), "-jar".to_string(), "server.jar".to_string()];

    let record = ProcessRecord::new(42, Utc::now(), "java", &args);

    assert_that!(record.command_line.as_str(), eq("java -Xmx2G -jar server.jar"));
    assert_that!(record.pid, eq(42));
}
