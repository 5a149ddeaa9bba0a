use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::library::TrackId;

/// Copy of the playback status handed to readers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NowPlayingSnapshot {
    pub track: Option<TrackId>,
    /// A track is open and not paused
    pub playing: bool,
    pub paused: bool,
    pub elapsed: Duration,
    pub duration: Option<Duration>,
}

impl NowPlayingSnapshot {
    /// Progress in 0.0..=1.0, zero when the duration is unknown
    pub fn progress(&self) -> f32 {
        match self.duration {
            Some(total) if !total.is_zero() => {
                (self.elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

/// Shared now-playing status. Written by the scheduler thread only, read anywhere.
#[derive(Debug, Default)]
pub struct NowPlaying {
    snapshot: Mutex<NowPlayingSnapshot>,
}

impl NowPlaying {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, NowPlayingSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> NowPlayingSnapshot {
        self.lock().clone()
    }

    pub(crate) fn start(&self, track: TrackId, duration: Option<Duration>) {
        *self.lock() = NowPlayingSnapshot {
            track: Some(track),
            playing: true,
            paused: false,
            elapsed: Duration::ZERO,
            duration,
        };
    }

    pub(crate) fn set_elapsed(&self, elapsed: Duration) {
        self.lock().elapsed = elapsed;
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        let mut snapshot = self.lock();
        if snapshot.track.is_some() {
            snapshot.paused = paused;
            snapshot.playing = !paused;
        }
    }

    pub(crate) fn clear(&self) {
        *self.lock() = NowPlayingSnapshot::default();
    }
}
