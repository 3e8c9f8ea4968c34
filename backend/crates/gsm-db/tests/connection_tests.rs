use gsm_db::BackupRepository;

use googletest::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn given_missing_parent_directory_when_connecting_then_created_and_migrated() {
    // Given
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/gsm.db");

    // When
    let pool = gsm_db::connect(&path).await.unwrap();

    // Then
    assert_that!(path.exists(), eq(true));
    let all = BackupRepository::new(pool).find_all().await.unwrap();
    assert_that!(all, is_empty());
}

#[tokio::test]
async fn given_existing_database_when_reconnecting_then_migrations_are_idempotent() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("gsm.db");

    let first = gsm_db::connect(&path).await.unwrap();
    first.close().await;
    let second = gsm_db::connect(&path).await;

    assert_that!(second, ok(anything()));
}
