use crate::ServerState;

use std::str::FromStr;

use googletest::prelude::*;

const ALL: [ServerState; 5] = [
    ServerState::Stopped,
    ServerState::Starting,
    ServerState::Running,
    ServerState::Stopping,
    ServerState::Crashed,
];

#[test]
fn test_server_state_as_str() {
    assert_eq!(ServerState::Stopped.as_str(), "stopped");
    assert_eq!(ServerState::Starting.as_str(), "starting");
    assert_eq!(ServerState::Running.as_str(), "running");
    assert_eq!(ServerState::Stopping.as_str(), "stopping");
    assert_eq!(ServerState::Crashed.as_str(), "crashed");
}

#[test]
fn test_server_state_from_str() {
    for state in ALL {
        assert_eq!(ServerState::from_str(state.as_str()).unwrap(), state);
    }
    assert!(ServerState::from_str("paused").is_err());
}

#[test]
fn test_server_state_default() {
    assert_eq!(ServerState::default(), ServerState::Stopped);
}

#[test]
fn given_stopped_or_crashed_when_checking_starting_then_edge_allowed() {
    assert_that!(ServerState::Stopped.can_transition_to(ServerState::Starting), eq(true));
    assert_that!(ServerState::Crashed.can_transition_to(ServerState::Starting), eq(true));
}

#[test]
fn given_stopped_when_checking_running_then_edge_rejected() {
    assert_that!(ServerState::Stopped.can_transition_to(ServerState::Running), eq(false));
    assert_that!(ServerState::Running.can_transition_to(ServerState::Starting), eq(false));
    assert_that!(ServerState::Crashed.can_transition_to(ServerState::Stopped), eq(false));
}

#[test]
fn given_every_state_when_checking_self_transition_then_rejected() {
    for state in ALL {
        assert_that!(state.can_transition_to(state), eq(false));
    }
}

#[test]
fn given_process_states_when_checking_has_process_then_only_live_states_match() {
    let live: Vec<_> = ALL.into_iter().filter(ServerState::has_process).collect();

    assert_eq!(
        live,
        vec![
            ServerState::Starting,
            ServerState::Running,
            ServerState::Stopping
        ]
    );
}

#[test]
fn given_state_when_serialized_then_uses_snake_case() {
    let json = serde_json::to_string(&ServerState::Crashed).unwrap();
    assert_that!(json, eq("\"crashed\""));
}
