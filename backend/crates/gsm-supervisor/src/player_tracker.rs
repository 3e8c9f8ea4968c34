use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

const JOINED_MARKER: &str = " joined the game";
const LEFT_MARKER: &str = " left the game";

/// Counts online players by watching console join/leave lines.
#[derive(Debug, Default)]
pub struct PlayerTracker {
    online: Mutex<HashSet<String>>,
}

impl PlayerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, line: &str) {
        if let Some(name) = Self::player_before(line, JOINED_MARKER) {
            self.lock().insert(name.to_string());
        } else if let Some(name) = Self::player_before(line, LEFT_MARKER) {
            self.lock().remove(name);
        }
    }

    pub fn count(&self) -> u32 {
        u32::try_from(self.lock().len()).unwrap_or(u32::MAX)
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Last whitespace-separated token before `marker`.
    fn player_before<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
        let head = &line[..line.find(marker)?];
        head.split_whitespace().next_back()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.online.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
