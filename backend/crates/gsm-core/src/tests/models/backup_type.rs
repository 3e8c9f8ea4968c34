use crate::BackupType;

use std::str::FromStr;

#[test]
fn test_backup_type_round_trips_through_str() {
    assert_eq!(BackupType::from_str("manual").unwrap(), BackupType::Manual);
    assert_eq!(
        BackupType::from_str("scheduled").unwrap(),
        BackupType::Scheduled
    );
    assert_eq!(BackupType::Scheduled.to_string(), "scheduled");
    assert!(BackupType::from_str("nightly").is_err());
}

#[test]
fn test_backup_type_default() {
    assert_eq!(BackupType::default(), BackupType::Manual);
}
