use gsm_core::ServerState;

use metrics::{counter, gauge};

/// Metrics collector for the supervisor and console fan-out.
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            prefix: "gsm_supervisor",
        }
    }

    pub fn state_changed(&self, to: ServerState) {
        counter!(format!("{}.transitions.{}", self.prefix, to.as_str())).increment(1);
        gauge!(format!("{}.running", self.prefix)).set(if to == ServerState::Running {
            1.0
        } else {
            0.0
        });
    }

    pub fn crashed(&self) {
        counter!(format!("{}.crashes", self.prefix)).increment(1);
    }

    pub fn line_published(&self) {
        counter!(format!("{}.logs.published", self.prefix)).increment(1);
    }

    pub fn lines_dropped(&self, count: u64) {
        counter!(format!("{}.logs.dropped", self.prefix)).increment(count);
    }

    pub fn subscribers(&self, count: usize) {
        gauge!(format!("{}.logs.subscribers", self.prefix)).set(count as f64);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
