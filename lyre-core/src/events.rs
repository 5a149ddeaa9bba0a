use std::time::Duration;

use crate::library::TrackId;

/// Notifications sent from the scheduler thread to front ends
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A track was opened and is now streaming
    TrackStarted {
        track: TrackId,
        duration: Option<Duration>,
    },
    /// A track played to its end
    TrackFinished(TrackId),
    /// A track could not be played and was passed over
    TrackSkipped { track: TrackId, reason: String },
    /// The queues changed after a command was applied
    QueueChanged(QueueSnapshot),
    /// Nothing left to play
    Idle,
    /// The scheduler thread is exiting
    Shutdown,
}

/// Copy of the scheduler queues for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Tracks left in the list being played
    pub current: Vec<TrackId>,
    /// Lists waiting behind the current one, next first
    pub queued: Vec<Vec<TrackId>>,
    /// Played tracks, most recent first
    pub history: Vec<TrackId>,
    pub suspended_depth: usize,
}

impl QueueSnapshot {
    pub fn upcoming(&self) -> usize {
        self.current.len() + self.queued.iter().map(Vec::len).sum::<usize>()
    }
}
