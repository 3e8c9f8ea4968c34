use crate::{Caller, Role};

use googletest::prelude::*;

#[test]
fn given_known_role_names_when_parsed_then_maps_case_insensitively() {
    // Given / When / Then
    assert_that!(Role::parse("admin"), eq(Role::Admin));
    assert_that!(Role::parse("Moderator"), eq(Role::Moderator));
    assert_that!(Role::parse(" VIEWER "), eq(Role::Viewer));
}

#[test]
fn given_unknown_role_when_parsed_then_falls_back_to_viewer() {
    // Given
    let value = "superuser";

    // When
    let role = Role::parse(value);

    // Then
    assert_that!(role, eq(Role::Viewer));
}

#[test]
fn given_moderator_when_requiring_lower_or_equal_role_then_allowed() {
    // Given
    let caller = Caller(Role::Moderator);

    // When / Then
    assert_that!(caller.require(Role::Viewer), ok(anything()));
    assert_that!(caller.require(Role::Moderator), ok(anything()));
}

#[test]
fn given_moderator_when_requiring_admin_then_forbidden() {
    // Given
    let caller = Caller(Role::Moderator);

    // When
    let result = caller.require(Role::Admin);

    // Then
    let err = result.expect_err("moderator must not pass an admin check");
    assert_that!(err.status().as_u16(), eq(403));
    assert!(err.to_string().contains("admin role required"));
}
