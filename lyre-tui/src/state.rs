use std::sync::Arc;

use lyre_core::{Library, NowPlayingSnapshot, PlaybackEvent, TrackId};

use crate::states::{AudioState, LibraryState, QueueState};

/// Everything the UI draws from, owned by the main loop
#[derive(Debug)]
pub struct AppState {
    pub library: Arc<Library>,
    pub audio: AudioState,
    pub queue: QueueState,
    pub library_view: LibraryState,
    pub status_message: String,
    pub error_message: Option<String>,
    pub shutdown: bool,
}

impl AppState {
    pub fn new(library: Arc<Library>) -> Self {
        Self {
            library_view: LibraryState::new(Arc::clone(&library)),
            library,
            audio: AudioState::new(),
            queue: QueueState::new(),
            status_message: "Ready".to_string(),
            error_message: None,
            shutdown: false,
        }
    }

    /// Display name of a track id, falling back to the id itself
    pub fn track_label(&self, id: TrackId) -> String {
        match self.library.track(id) {
            Some(track) => format!("{} - {}", track.title(), track.artist()),
            None => format!("Unknown track {}", id),
        }
    }

    pub fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::TrackStarted { track, .. } => {
                self.error_message = None;
                match self.library.track(track) {
                    Some(entry) => self.audio.start(entry),
                    None => self.audio.clear(),
                }
                self.status_message = format!("Playing: {}", self.track_label(track));
            }
            PlaybackEvent::TrackFinished(track) => {
                self.status_message = format!("Finished: {}", self.track_label(track));
            }
            PlaybackEvent::TrackSkipped { track, reason } => {
                let message = format!("Skipped {}: {}", self.track_label(track), reason);
                self.status_message = message.clone();
                self.error_message = Some(message);
            }
            PlaybackEvent::QueueChanged(snapshot) => self.queue.update(snapshot),
            PlaybackEvent::Idle => {
                self.audio.clear();
                self.status_message = "Stopped".to_string();
            }
            PlaybackEvent::Shutdown => {
                self.audio.clear();
                self.shutdown = true;
                self.status_message = "Scheduler shutdown".to_string();
            }
        }
    }

    /// Pull position and pause state from the scheduler
    pub fn refresh(&mut self, snapshot: &NowPlayingSnapshot) {
        self.audio.refresh(snapshot);
        if self.audio.is_paused && self.error_message.is_none() {
            self.status_message = "Paused".to_string();
        } else if self.audio.is_playing && self.status_message == "Paused" {
            self.status_message = "Playing".to_string();
        }
    }
}
