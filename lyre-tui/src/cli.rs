use std::{path::PathBuf, time::Duration};

use clap::Parser;
use log::LevelFilter;
use lyre_core::{DedupPolicy, PlaySource, PlaybackOption, PlaybackOptions, SchedulerConfig};

/// Terminal audio player with a nested play queue
#[derive(Parser, Debug)]
#[command(name = "lyre")]
#[command(version)]
pub struct Cli {
    /// Audio files or directories to load into the library
    pub paths: Vec<PathBuf>,

    /// Start with this playlist (an .m3u file name without extension)
    #[arg(long, value_name = "NAME")]
    pub playlist: Option<String>,

    /// Shuffle the initial playback
    #[arg(long)]
    pub shuffle: bool,

    /// Drop a command when it repeats the last queued one
    #[arg(long)]
    pub dedup_commands: bool,

    /// Play the library without the terminal UI and exit when done
    #[arg(long)]
    pub headless: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, value_parser = parse_level)]
    pub log_level: Option<LevelFilter>,

    /// Scheduler poll interval while idle, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub idle_poll_ms: u64,
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("unknown log level {:?}", value))
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.unwrap_or(if self.headless {
            LevelFilter::Info
        } else {
            LevelFilter::Debug
        })
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        let dedup = if self.dedup_commands {
            DedupPolicy::SkipRepeatedTail
        } else {
            DedupPolicy::KeepAll
        };
        SchedulerConfig::default()
            .with_idle_poll_interval(Duration::from_millis(self.idle_poll_ms))
            .with_dedup(dedup)
    }

    /// What plays on startup
    pub fn initial_source(&self) -> PlaySource {
        match &self.playlist {
            Some(name) => PlaySource::Playlist(name.clone()),
            None => PlaySource::Everything,
        }
    }

    /// Options of the playback started from the command line
    pub fn initial_options(&self) -> PlaybackOptions {
        let options = PlaybackOptions::from(PlaybackOption::PlayAfterEverything);
        if self.shuffle {
            options | PlaybackOption::Shuffle
        } else {
            options
        }
    }
}
