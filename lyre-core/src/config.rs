use std::time::Duration;

use crate::command_queue::DedupPolicy;

/// Tuning knobs of the scheduler thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How long the idle scheduler sleeps between queue polls
    pub idle_poll_interval: Duration,
    /// Sleep between queue polls while a track is paused or draining
    pub pause_poll_interval: Duration,
    pub dedup: DedupPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_poll_interval: Duration::from_millis(500),
            pause_poll_interval: Duration::from_millis(1),
            dedup: DedupPolicy::KeepAll,
        }
    }
}

impl SchedulerConfig {
    pub fn with_idle_poll_interval(mut self, interval: Duration) -> Self {
        self.idle_poll_interval = interval;
        self
    }

    pub fn with_pause_poll_interval(mut self, interval: Duration) -> Self {
        self.pause_poll_interval = interval;
        self
    }

    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }
}
