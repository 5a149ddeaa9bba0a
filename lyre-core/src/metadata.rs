use std::{fmt::Display, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelLayout {
    Mono,
    Stereo,
    #[default]
    Unsupported,
}

impl Display for ChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChannelLayout::Mono => "Mono",
            ChannelLayout::Stereo => "Stereo",
            ChannelLayout::Unsupported => "Unsupported",
        };
        write!(f, "{}", label)
    }
}

impl ChannelLayout {
    pub fn from_channels(num_channels: u16) -> ChannelLayout {
        match num_channels {
            1 => ChannelLayout::Mono,
            2 => ChannelLayout::Stereo,
            _ => ChannelLayout::Unsupported,
        }
    }
}

/// Tag and stream properties of a catalog track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    /// Container format (mp3, flac, wav, ogg, etc), taken from the extension
    pub format: String,
    /// sample rate / sampling frequency (f_s)
    pub sample_rate: u32,
    /// number of audio channels
    pub num_channels: u16,
    pub channel_layout: ChannelLayout,
    pub title: Option<String>,
    /// Track artist (if many then separated by semicolon)
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Position on the album
    pub track_number: Option<u32>,
    pub duration: Option<Duration>,
}

impl TrackMetadata {
    /// Total seconds, or zero when the duration is unknown
    pub fn duration_secs(&self) -> f32 {
        self.duration.map(|d| d.as_secs_f32()).unwrap_or(0.0)
    }
}

impl Display for TrackMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let seconds = self.duration_secs();
        let mins = (seconds / 60.0).floor() as u64;
        let secs = (seconds % 60.0).floor() as u64;
        let title = self.title.as_deref().unwrap_or("Unknown Title");
        let artist = self.artist.as_deref().unwrap_or("Unknown Artist");
        let album = self.album.as_deref().unwrap_or("Unknown Album");

        writeln!(f, "Track:  {} - {}", title, artist)?;
        writeln!(f, "Album:  {}", album)?;
        writeln!(f, "Length: {:02}:{:02}", mins, secs)?;

        write!(
            f,
            "Format: {} ({:.1} kHz, {})",
            self.format.to_uppercase(),
            self.sample_rate as f32 / 1000.0,
            self.channel_layout
        )?;

        if let Some(genre) = &self.genre {
            write!(f, "\nGenre:  {}", genre)?;
        }

        Ok(())
    }
}
