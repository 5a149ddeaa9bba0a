//! The playback scheduler thread and the handle used to control it.

mod state;

pub use state::{Flow, SchedulerState, SuspendedContext};

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    command_queue::CommandQueue,
    commands::{PlaybackCommand, PlaybackOptions},
    config::SchedulerConfig,
    decoder::Decoder,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    library::{Library, PlaySource},
    now_playing::{NowPlaying, NowPlayingSnapshot},
    output::AudioSink,
    playlist::PlayList,
    track_player::TrackPlayer,
};

/// Owns all playback state and runs on its own thread
pub struct PlaybackScheduler {
    library: Arc<Library>,
    player: TrackPlayer,
    commands: Arc<CommandQueue>,
    now_playing: Arc<NowPlaying>,
    events: Sender<PlaybackEvent>,
    state: SchedulerState,
    config: SchedulerConfig,
}

impl PlaybackScheduler {
    pub fn new(
        library: Arc<Library>,
        decoder: Box<dyn Decoder>,
        sink: Box<dyn AudioSink>,
        config: SchedulerConfig,
    ) -> (Self, SchedulerHandle) {
        let commands = Arc::new(CommandQueue::new(config.dedup));
        let now_playing = Arc::new(NowPlaying::new());
        let (event_tx, event_rx) = crossbeam_channel::unbounded();

        let player = TrackPlayer::new(
            decoder,
            sink,
            Arc::clone(&commands),
            Arc::clone(&now_playing),
            config.pause_poll_interval,
        );

        let handle = SchedulerHandle {
            commands: Arc::clone(&commands),
            now_playing: Arc::clone(&now_playing),
            library: Arc::clone(&library),
            events: event_rx,
        };

        let scheduler = Self {
            library,
            player,
            commands,
            now_playing,
            events: event_tx,
            state: SchedulerState::new(),
            config,
        };

        (scheduler, handle)
    }

    /// Run the scheduler on a dedicated thread. Joining yields the final state.
    pub fn spawn(self) -> Result<JoinHandle<SchedulerState>> {
        thread::Builder::new()
            .name("lyre-scheduler".to_string())
            .spawn(move || self.run())
            .map_err(PlaybackError::Spawn)
    }

    /// Scheduler loop. Returns after an `Exit` command.
    pub fn run(mut self) -> SchedulerState {
        log::info!("Playback scheduler started");
        let library = Arc::clone(&self.library);
        let mut idle_reported = false;

        'scheduler: loop {
            let Some(id) = self.state.next_track() else {
                if !idle_reported {
                    self.now_playing.clear();
                    self.emit(PlaybackEvent::Idle);
                    idle_reported = true;
                }

                match self.commands.try_dequeue() {
                    Some(command) => {
                        log::debug!("Received {} while idle", command.name());
                        if self.state.apply(None, command) == Flow::Exit {
                            break 'scheduler;
                        }
                        self.emit_queue();
                    }
                    None => thread::sleep(self.config.idle_poll_interval),
                }
                continue;
            };
            idle_reported = false;

            let Some(track) = library.track(id) else {
                log::warn!("Track {} is not in the library, skipping", id);
                self.emit(PlaybackEvent::TrackSkipped {
                    track: id,
                    reason: "not in the library".to_string(),
                });
                continue;
            };

            let mut active = match self.player.open(track) {
                Ok(active) => active,
                Err(e) => {
                    log::error!("Skipping {}: {}", id, e);
                    self.emit(PlaybackEvent::TrackSkipped {
                        track: id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            self.emit(PlaybackEvent::TrackStarted {
                track: id,
                duration: active.duration(),
            });
            self.emit_queue();

            loop {
                match self.player.play(&mut active) {
                    Ok(None) => {
                        self.state.track_finished(id);
                        self.emit(PlaybackEvent::TrackFinished(id));
                        self.emit_queue();
                        break;
                    }
                    Err(e) => {
                        // Skipped, not played: history stays as it was
                        log::error!("Skipping {}: {}", id, e);
                        self.emit(PlaybackEvent::TrackSkipped {
                            track: id,
                            reason: e.to_string(),
                        });
                        self.emit_queue();
                        break;
                    }
                    Ok(Some(command)) => {
                        let flow = self.state.apply(Some(id), command);
                        self.emit_queue();
                        match flow {
                            Flow::Resume => continue,
                            Flow::Continue => break,
                            Flow::Exit => break 'scheduler,
                        }
                    }
                }
            }
        }

        self.now_playing.clear();
        self.emit(PlaybackEvent::Shutdown);
        log::info!("Playback scheduler exited");
        self.state
    }

    fn emit(&self, event: PlaybackEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    fn emit_queue(&self) {
        self.emit(PlaybackEvent::QueueChanged(self.state.snapshot()));
    }
}

/// Cloneable control surface of a running scheduler
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: Arc<CommandQueue>,
    now_playing: Arc<NowPlaying>,
    library: Arc<Library>,
    events: Receiver<PlaybackEvent>,
}

impl SchedulerHandle {
    /// Queue a command. Returns false when it was dropped as a repeat.
    pub fn send(&self, command: PlaybackCommand) -> bool {
        self.commands.enqueue(command)
    }

    pub fn pause(&self) {
        self.send(PlaybackCommand::Pause);
    }

    pub fn resume(&self) {
        self.send(PlaybackCommand::Resume);
    }

    pub fn toggle(&self) {
        self.send(PlaybackCommand::Toggle);
    }

    pub fn stop(&self) {
        self.send(PlaybackCommand::Stop);
    }

    pub fn stop_all(&self) {
        self.send(PlaybackCommand::StopAll);
    }

    pub fn next(&self) {
        self.send(PlaybackCommand::Next);
    }

    pub fn previous(&self) {
        self.send(PlaybackCommand::Previous);
    }

    pub fn exit(&self) {
        self.send(PlaybackCommand::Exit);
    }

    /// Resolve `source` in the library and queue it with the given placement
    pub fn start_playback(
        &self,
        source: &PlaySource,
        options: impl Into<PlaybackOptions>,
    ) -> Result<()> {
        let list = self.library.tracks_of(source)?;
        let options = options.into();
        log::debug!(
            "Start playback of {:?}: {} tracks, {:?}",
            source,
            list.len(),
            options.placement()
        );
        self.send(PlaybackCommand::Play(list, options));
        Ok(())
    }

    pub fn play_tracks(&self, list: PlayList, options: impl Into<PlaybackOptions>) {
        self.send(PlaybackCommand::play(list, options));
    }

    pub fn now_playing(&self) -> NowPlayingSnapshot {
        self.now_playing.get()
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    /// Scheduler notifications. Each event is received by one reader only.
    pub fn events(&self) -> &Receiver<PlaybackEvent> {
        &self.events
    }
}
