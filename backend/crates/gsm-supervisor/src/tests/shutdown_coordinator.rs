use crate::ShutdownCoordinator;

use std::time::Duration;

use googletest::prelude::*;

#[tokio::test]
async fn given_guard_waiting_when_shutdown_signalled_then_wait_returns() {
    // Given
    let coordinator = ShutdownCoordinator::new();
    let mut guard = coordinator.subscribe_guard();
    let waiter = tokio::spawn(async move {
        guard.wait().await;
        guard.is_shutdown()
    });

    // When
    coordinator.shutdown();

    // Then
    let observed = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("guard did not observe shutdown")
        .expect("waiter panicked");
    assert_that!(observed, eq(true));
    assert_that!(coordinator.is_shutdown(), eq(true));
}

#[tokio::test]
async fn given_shutdown_already_signalled_when_guard_created_then_wait_returns_immediately() {
    let coordinator = ShutdownCoordinator::new();
    coordinator.shutdown();

    let mut guard = coordinator.subscribe_guard();

    tokio::time::timeout(Duration::from_millis(100), guard.wait())
        .await
        .expect("late guard should see shutdown");
}
