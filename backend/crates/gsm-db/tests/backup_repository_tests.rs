mod common;

use common::{create_test_backup, create_test_pool};

use gsm_core::BackupType;
use gsm_db::BackupRepository;

use googletest::prelude::*;
use uuid::Uuid;

#[tokio::test]
async fn given_saved_backup_when_found_by_id_then_all_fields_match() {
    // Given
    let pool = create_test_pool().await;
    let repo = BackupRepository::new(pool);
    let mut record = create_test_backup("backup-manual-1.zip", 0);
    record.backup_type = BackupType::Scheduled;
    record.size_bytes = 9_876_543_210;

    // When
    repo.save(&record).await.unwrap();
    let found = repo.find(record.id).await.unwrap();

    // Then
    assert_that!(found, some(anything()));
    let found = found.unwrap();
    assert_that!(found, eq(&record));
}

#[tokio::test]
async fn given_empty_database_when_finding_unknown_id_then_none() {
    let repo = BackupRepository::new(create_test_pool().await);

    let result = repo.find(Uuid::new_v4()).await.unwrap();

    assert_that!(result, none());
}

#[tokio::test]
async fn given_backups_at_different_times_when_listing_then_newest_first() {
    // Given
    let repo = BackupRepository::new(create_test_pool().await);
    let oldest = create_test_backup("a.zip", 0);
    let newest = create_test_backup("b.zip", 120);
    let middle = create_test_backup("c.zip", 60);
    for record in [&oldest, &newest, &middle] {
        repo.save(record).await.unwrap();
    }

    // When
    let all = repo.find_all().await.unwrap();

    // Then
    let names: Vec<&str> = all.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["b.zip", "c.zip", "a.zip"]);
}

#[tokio::test]
async fn given_backups_with_same_timestamp_when_listing_then_later_insert_first() {
    // Given
    let repo = BackupRepository::new(create_test_pool().await);
    let first = create_test_backup("first.zip", 0);
    let second = create_test_backup("second.zip", 0);
    repo.save(&first).await.unwrap();
    repo.save(&second).await.unwrap();

    // When
    let all = repo.find_all().await.unwrap();

    // Then
    assert_that!(all, len(eq(2)));
    assert_that!(all[0].id, eq(second.id));
    assert_that!(all[1].id, eq(first.id));
}

#[tokio::test]
async fn given_duplicate_filename_when_saving_then_error() {
    let repo = BackupRepository::new(create_test_pool().await);
    repo.save(&create_test_backup("same.zip", 0)).await.unwrap();

    let result = repo.save(&create_test_backup("same.zip", 5)).await;

    assert_that!(result, err(anything()));
}

#[tokio::test]
async fn given_saved_backup_when_deleted_then_gone_and_second_delete_reports_false() {
    // Given
    let repo = BackupRepository::new(create_test_pool().await);
    let record = create_test_backup("gone.zip", 0);
    repo.save(&record).await.unwrap();

    // When
    let first = repo.delete(record.id).await.unwrap();
    let second = repo.delete(record.id).await.unwrap();

    // Then
    assert_that!(first, eq(true));
    assert_that!(second, eq(false));
    assert_that!(repo.find(record.id).await.unwrap(), none());
}
