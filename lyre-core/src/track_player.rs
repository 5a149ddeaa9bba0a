//! Streams one track at a time and hands unhandled commands back to the scheduler.

use std::{sync::Arc, thread, time::Duration};

use crate::{
    command_queue::CommandQueue,
    commands::PlaybackCommand,
    decoder::{DecodeHandle, DecodeStep, Decoder},
    error::{DecodeError, DeviceError, PlaybackError},
    library::{Track, TrackId},
    now_playing::NowPlaying,
    output::{AudioSink, OutputDevice},
};

/// Decoder and device of the track being played.
///
/// Both are released exactly once, either by [`ActiveTrack::release`] or on drop.
pub struct ActiveTrack {
    id: TrackId,
    handle: Option<Box<dyn DecodeHandle>>,
    device: Option<Box<dyn OutputDevice>>,
    now_playing: Arc<NowPlaying>,
    elapsed: Duration,
    duration: Option<Duration>,
    finished_decoding: bool,
}

impl ActiveTrack {
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Audio decoded and handed to the device so far
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Audio the device has actually played
    pub fn heard(&self) -> Duration {
        let buffered = self
            .device
            .as_ref()
            .map(|device| device.buffered())
            .unwrap_or_default();
        self.elapsed.saturating_sub(buffered)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_none() && self.device.is_none()
    }

    pub fn release(&mut self) {
        if self.is_released() {
            return;
        }
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
        if let Some(mut device) = self.device.take() {
            device.close();
        }
        self.now_playing.clear();
        log::debug!("Released track {}", self.id);
    }

    fn is_drained(&self) -> bool {
        self.device.as_ref().is_none_or(|device| device.is_drained())
    }
}

impl Drop for ActiveTrack {
    fn drop(&mut self) {
        self.release();
    }
}

pub struct TrackPlayer {
    decoder: Box<dyn Decoder>,
    sink: Box<dyn AudioSink>,
    commands: Arc<CommandQueue>,
    now_playing: Arc<NowPlaying>,
    pause_poll: Duration,
    paused: bool,
}

impl TrackPlayer {
    pub fn new(
        decoder: Box<dyn Decoder>,
        sink: Box<dyn AudioSink>,
        commands: Arc<CommandQueue>,
        now_playing: Arc<NowPlaying>,
        pause_poll: Duration,
    ) -> Self {
        Self {
            decoder,
            sink,
            commands,
            now_playing,
            pause_poll,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Open the decoder and the output device for `track`
    pub fn open(&mut self, track: &Track) -> Result<ActiveTrack, PlaybackError> {
        let mut handle = self.decoder.open(track)?;
        let device = match self.sink.open() {
            Ok(device) => device,
            Err(e) => {
                handle.close();
                return Err(e.into());
            }
        };

        let duration = handle.duration().or(track.metadata.duration);
        self.paused = false;
        self.now_playing.start(track.id, duration);
        log::info!("Playing {} \"{}\" by {}", track.id, track.title(), track.artist());

        Ok(ActiveTrack {
            id: track.id,
            handle: Some(handle),
            device: Some(device),
            now_playing: Arc::clone(&self.now_playing),
            elapsed: Duration::ZERO,
            duration,
            finished_decoding: false,
        })
    }

    /// Drive the decode loop of an open track.
    ///
    /// Pause, Resume and Toggle are handled here. Any other command is
    /// returned with the track still open; the caller decides whether to
    /// keep playing it or drop it. On natural end the track is released and
    /// `None` is returned. An output failure releases the track and is
    /// returned as an error, the track counts as skipped.
    pub fn play(
        &mut self,
        active: &mut ActiveTrack,
    ) -> Result<Option<PlaybackCommand>, DeviceError> {
        loop {
            if let Some(command) = self.commands.try_dequeue() {
                if command.is_pause_control() {
                    self.apply_pause_control(&command, active);
                    continue;
                }
                log::debug!("Track {} interrupted by {}", active.id, command.name());
                return Ok(Some(command));
            }

            if self.paused {
                thread::sleep(self.pause_poll);
                continue;
            }

            if active.finished_decoding {
                if active.is_drained() {
                    log::info!("Finished {}", active.id);
                    active.release();
                    return Ok(None);
                }
                self.now_playing.set_elapsed(active.heard());
                thread::sleep(self.pause_poll);
                continue;
            }

            let Some(handle) = active.handle.as_mut() else {
                active.finished_decoding = true;
                continue;
            };

            match handle.decode_next() {
                Ok(DecodeStep::Unit(unit)) => {
                    let unit_duration = unit.duration();
                    let written = match active.device.as_mut() {
                        Some(device) => device.write(unit),
                        None => Ok(()),
                    };
                    if let Err(e) = written {
                        log::error!("Output failed while playing {}: {}", active.id, e);
                        active.release();
                        return Err(e);
                    }
                    active.elapsed += unit_duration;
                    self.now_playing.set_elapsed(active.heard());
                }
                Ok(DecodeStep::EndOfStream) => active.finished_decoding = true,
                Err(DecodeError::Unit(reason)) => {
                    log::warn!("Skipping a unit of {}: {}", active.id, reason);
                }
                Err(DecodeError::Corrupt(reason)) => {
                    log::warn!("Stopping {} early, stream is corrupt: {}", active.id, reason);
                    active.finished_decoding = true;
                }
            }
        }
    }

    fn apply_pause_control(&mut self, command: &PlaybackCommand, active: &mut ActiveTrack) {
        let paused = match command {
            PlaybackCommand::Pause => true,
            PlaybackCommand::Resume => false,
            PlaybackCommand::Toggle => !self.paused,
            _ => return,
        };
        if paused == self.paused {
            return;
        }

        self.paused = paused;
        if let Some(device) = active.device.as_mut() {
            if paused {
                device.pause();
            } else {
                device.resume();
            }
        }
        self.now_playing.set_paused(paused);
        log::debug!("{} {}", if paused { "Paused" } else { "Resumed" }, active.id);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{
        decoder::DecodeUnit,
        error::{DeviceError, OpenError},
        metadata::TrackMetadata,
    };

    #[derive(Clone, Copy)]
    enum Step {
        Unit,
        BadUnit,
        Corrupt,
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Output {
        Working,
        Missing,
        FailsOnWrite,
    }

    #[derive(Default)]
    struct Counters {
        handle_closes: AtomicUsize,
        device_closes: AtomicUsize,
        writes: AtomicUsize,
        pauses: AtomicUsize,
    }

    struct ScriptedDecoder {
        steps: Vec<Step>,
        fail_open: bool,
        counters: Arc<Counters>,
    }

    struct ScriptedHandle {
        steps: Vec<Step>,
        counters: Arc<Counters>,
    }

    impl Decoder for ScriptedDecoder {
        fn open(&self, track: &Track) -> Result<Box<dyn DecodeHandle>, OpenError> {
            if self.fail_open {
                return Err(OpenError::NoAudioStream(track.path.clone()));
            }
            let mut steps = self.steps.clone();
            steps.reverse();
            Ok(Box::new(ScriptedHandle {
                steps,
                counters: Arc::clone(&self.counters),
            }))
        }
    }

    impl DecodeHandle for ScriptedHandle {
        fn decode_next(&mut self) -> Result<DecodeStep, DecodeError> {
            match self.steps.pop() {
                None => Ok(DecodeStep::EndOfStream),
                Some(Step::Unit) => Ok(DecodeStep::Unit(DecodeUnit {
                    samples: vec![0.0; 200],
                    channels: 2,
                    sample_rate: 1000,
                })),
                Some(Step::BadUnit) => Err(DecodeError::Unit("bad packet".to_string())),
                Some(Step::Corrupt) => Err(DecodeError::Corrupt("broken".to_string())),
            }
        }

        fn duration(&self) -> Option<Duration> {
            None
        }

        fn close(&mut self) {
            self.counters.handle_closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingSink {
        output: Output,
        counters: Arc<Counters>,
    }

    struct CountingDevice {
        fail_writes: bool,
        counters: Arc<Counters>,
    }

    impl AudioSink for CountingSink {
        fn open(&self) -> Result<Box<dyn OutputDevice>, DeviceError> {
            if self.output == Output::Missing {
                return Err(DeviceError::NoDevice);
            }
            Ok(Box::new(CountingDevice {
                fail_writes: self.output == Output::FailsOnWrite,
                counters: Arc::clone(&self.counters),
            }))
        }
    }

    impl OutputDevice for CountingDevice {
        fn write(&mut self, _unit: DecodeUnit) -> Result<(), DeviceError> {
            if self.fail_writes {
                return Err(DeviceError::Write("device unplugged".to_string()));
            }
            self.counters.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn pause(&mut self) {
            self.counters.pauses.fetch_add(1, Ordering::SeqCst);
        }

        fn resume(&mut self) {}

        fn is_drained(&self) -> bool {
            true
        }

        fn buffered(&self) -> Duration {
            Duration::from_millis(100)
        }

        fn close(&mut self) {
            self.counters.device_closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        player: TrackPlayer,
        commands: Arc<CommandQueue>,
        now_playing: Arc<NowPlaying>,
        counters: Arc<Counters>,
        track: Track,
    }

    impl Fixture {
        /// Open and play to the first escalation, like the scheduler does
        fn play_through(&mut self) -> Option<PlaybackCommand> {
            let mut active = self.player.open(&self.track).unwrap();
            self.player.play(&mut active).unwrap()
        }

        fn closes(&self) -> (usize, usize) {
            (
                self.counters.handle_closes.load(Ordering::SeqCst),
                self.counters.device_closes.load(Ordering::SeqCst),
            )
        }
    }

    fn fixture_with(steps: Vec<Step>, fail_open: bool, output: Output) -> Fixture {
        let counters = Arc::new(Counters::default());
        let commands = Arc::new(CommandQueue::default());
        let now_playing = Arc::new(NowPlaying::new());
        let player = TrackPlayer::new(
            Box::new(ScriptedDecoder {
                steps,
                fail_open,
                counters: Arc::clone(&counters),
            }),
            Box::new(CountingSink {
                output,
                counters: Arc::clone(&counters),
            }),
            Arc::clone(&commands),
            Arc::clone(&now_playing),
            Duration::from_millis(1),
        );
        Fixture {
            player,
            commands,
            now_playing,
            counters,
            track: Track {
                id: TrackId(7),
                path: PathBuf::from("/music/seven.flac"),
                metadata: TrackMetadata::default(),
            },
        }
    }

    fn fixture(steps: Vec<Step>, fail_open: bool) -> Fixture {
        fixture_with(steps, fail_open, Output::Working)
    }

    #[test]
    fn natural_end_releases_once_and_clears_now_playing() {
        let mut f = fixture(vec![Step::Unit, Step::Unit, Step::Unit], false);
        assert_eq!(f.play_through(), None);

        assert_eq!(f.counters.writes.load(Ordering::SeqCst), 3);
        assert_eq!(f.closes(), (1, 1));
        assert_eq!(f.now_playing.get().track, None);
    }

    #[test]
    fn toggle_twice_leaves_pause_state_unchanged() {
        let mut f = fixture(vec![Step::Unit; 4], false);
        f.commands.enqueue(PlaybackCommand::Toggle);
        f.commands.enqueue(PlaybackCommand::Toggle);
        f.commands.enqueue(PlaybackCommand::Next);

        assert_eq!(f.play_through(), Some(PlaybackCommand::Next));
        assert!(!f.player.is_paused());
        assert_eq!(f.counters.pauses.load(Ordering::SeqCst), 1);
        assert!(!f.now_playing.get().paused);
    }

    #[test]
    fn escalated_command_keeps_the_track_open_until_dropped() {
        let mut f = fixture(vec![Step::Unit; 4], false);
        f.commands.enqueue(PlaybackCommand::Pause);
        f.commands.enqueue(PlaybackCommand::Stop);

        let mut active = f.player.open(&f.track).unwrap();
        assert_eq!(
            f.player.play(&mut active).unwrap(),
            Some(PlaybackCommand::Stop)
        );
        assert!(f.player.is_paused());
        assert!(!active.is_released());
        assert_eq!(f.now_playing.get().track, Some(TrackId(7)));

        drop(active);
        assert_eq!(f.closes(), (1, 1));
        assert_eq!(f.now_playing.get().track, None);
    }

    #[test]
    fn release_then_drop_closes_once() {
        let mut f = fixture(vec![Step::Unit], false);
        let mut active = f.player.open(&f.track).unwrap();
        active.release();
        active.release();
        drop(active);
        assert_eq!(f.closes(), (1, 1));
    }

    #[test]
    fn bad_units_are_skipped() {
        let mut f = fixture(vec![Step::Unit, Step::BadUnit, Step::Unit], false);
        let mut active = f.player.open(&f.track).unwrap();
        assert_eq!(f.player.play(&mut active).unwrap(), None);
        assert_eq!(f.counters.writes.load(Ordering::SeqCst), 2);
        assert_eq!(active.elapsed(), Duration::from_millis(200));
    }

    #[test]
    fn progress_trails_the_device_buffer() {
        let mut f = fixture(vec![Step::Unit; 3], false);
        let mut active = f.player.open(&f.track).unwrap();
        assert_eq!(active.heard(), Duration::ZERO);

        active.elapsed = Duration::from_millis(300);
        assert_eq!(active.heard(), Duration::from_millis(200));

        active.release();
        assert_eq!(active.heard(), Duration::from_millis(300));
    }

    #[test]
    fn corrupt_stream_ends_the_track() {
        let mut f = fixture(vec![Step::Unit, Step::Corrupt, Step::Unit], false);
        assert_eq!(f.play_through(), None);
        assert_eq!(f.counters.writes.load(Ordering::SeqCst), 1);
        assert_eq!(f.closes(), (1, 1));
    }

    #[test]
    fn open_failure_never_touches_the_device() {
        let mut f = fixture(vec![Step::Unit], true);
        f.commands.enqueue(PlaybackCommand::Next);
        assert!(matches!(
            f.player.open(&f.track),
            Err(PlaybackError::Open(OpenError::NoAudioStream(_)))
        ));
        assert_eq!(f.closes(), (0, 0));
        assert_eq!(f.commands.len(), 1);
    }

    #[test]
    fn missing_output_closes_the_decoder_once() {
        let mut f = fixture_with(vec![Step::Unit], false, Output::Missing);
        assert!(matches!(
            f.player.open(&f.track),
            Err(PlaybackError::Device(DeviceError::NoDevice))
        ));
        assert_eq!(f.closes(), (1, 0));
        assert_eq!(f.now_playing.get().track, None);
    }

    #[test]
    fn write_failure_is_an_error_not_a_finish() {
        let mut f = fixture_with(vec![Step::Unit; 3], false, Output::FailsOnWrite);
        let mut active = f.player.open(&f.track).unwrap();
        assert_eq!(f.now_playing.get().track, Some(TrackId(7)));

        assert!(matches!(
            f.player.play(&mut active),
            Err(DeviceError::Write(_))
        ));
        assert!(active.is_released());
        assert_eq!(active.elapsed(), Duration::ZERO);
        assert_eq!(f.now_playing.get().track, None);

        drop(active);
        assert_eq!(f.closes(), (1, 1));
    }

    #[test]
    fn opening_a_track_resets_pause() {
        let mut f = fixture(vec![Step::Unit], false);
        f.commands.enqueue(PlaybackCommand::Pause);
        f.commands.enqueue(PlaybackCommand::Next);
        let mut active = f.player.open(&f.track).unwrap();
        f.player.play(&mut active).unwrap();
        assert!(f.player.is_paused());
        drop(active);

        let _active = f.player.open(&f.track).unwrap();
        assert!(!f.player.is_paused());
    }
}
