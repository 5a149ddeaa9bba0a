use lyre_core::{NowPlayingSnapshot, Track, TrackId};

/// What the Playback tab shows about the current track
#[derive(Debug, Clone, Default)]
pub struct AudioState {
    pub track: Option<TrackId>,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub format: String,
    pub is_playing: bool,
    pub is_paused: bool,
    /// Current playback position in seconds
    pub position: f32,
    /// Total duration in seconds, zero when unknown
    pub duration: f32,
}

impl AudioState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new track started on the scheduler
    pub fn start(&mut self, track: &Track) {
        self.track = Some(track.id);
        self.title = track.title();
        self.artist = track.artist().to_string();
        self.album = track.album().to_string();
        let metadata = &track.metadata;
        self.format = format!(
            "{} ({:.1} kHz, {})",
            metadata.format.to_uppercase(),
            metadata.sample_rate as f32 / 1000.0,
            metadata.channel_layout
        );
        self.is_playing = true;
        self.is_paused = false;
        self.position = 0.0;
        self.duration = track.metadata.duration_secs();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Copy position and pause state from the shared snapshot
    pub fn refresh(&mut self, snapshot: &NowPlayingSnapshot) {
        if snapshot.track.is_none() {
            self.is_playing = false;
            self.is_paused = false;
            return;
        }
        self.is_playing = snapshot.playing;
        self.is_paused = snapshot.paused;
        self.position = snapshot.elapsed.as_secs_f32();
        if let Some(duration) = snapshot.duration {
            self.duration = duration.as_secs_f32();
        }
    }

    /// Get the progress percentage (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Format time as MM:SS
    pub fn format_time(seconds: f32) -> String {
        let mins = (seconds / 60.0).floor() as u32;
        let secs = (seconds % 60.0).floor() as u32;
        format!("{:02}:{:02}", mins, secs)
    }
}
