pub mod command_queue;
pub mod commands;
pub mod config;
pub mod decoder;
pub mod error;
pub mod events;
pub mod library;
pub mod metadata;
pub mod now_playing;
pub mod output;
pub mod playlist;
pub mod scan;
pub mod scheduler;
pub mod track_player;

pub use command_queue::{CommandQueue, DedupPolicy};
pub use commands::{Placement, PlaybackCommand, PlaybackOption, PlaybackOptions};
pub use config::SchedulerConfig;
pub use error::{PlaybackError, Result};
pub use events::{PlaybackEvent, QueueSnapshot};
pub use library::{Library, PlaySource, Track, TrackId};
pub use now_playing::{NowPlaying, NowPlayingSnapshot};
pub use playlist::PlayList;
pub use scheduler::{PlaybackScheduler, SchedulerHandle, SchedulerState};
