//! Error types for the playback core

use std::path::PathBuf;

use thiserror::Error;

use crate::library::TrackId;

/// Failure to open a track for decoding. The track is skipped.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported container in {path:?}: {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("no audio stream in {0:?}")]
    NoAudioStream(PathBuf),

    #[error("no codec for {path:?}: {reason}")]
    CodecUnavailable { path: PathBuf, reason: String },
}

/// Failure while decoding one unit of an open track
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The unit is unusable, the next one may be fine
    #[error("decode error: {0}")]
    Unit(String),

    /// The stream itself is invalid; treated as end of stream
    #[error("corrupt stream: {0}")]
    Corrupt(String),
}

/// Audio output failures
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no default output device found")]
    NoDevice,

    #[error("cannot open output stream: {0}")]
    Stream(String),

    #[error("cannot write to output: {0}")]
    Write(String),
}

/// Catalog lookups that did not resolve
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("unknown track {0}")]
    UnknownTrack(TrackId),

    #[error("unknown artist {0:?}")]
    UnknownArtist(String),

    #[error("unknown album {album:?} by {artist:?}")]
    UnknownAlbum { artist: String, album: String },

    #[error("unknown playlist {0:?}")]
    UnknownPlaylist(String),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
