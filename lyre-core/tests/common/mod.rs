#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender};
use lyre_core::{
    Library, PlaybackEvent, PlaybackScheduler, SchedulerConfig, SchedulerHandle, SchedulerState,
    Track, TrackId,
    decoder::{DecodeHandle, DecodeStep, DecodeUnit, Decoder},
    error::{DecodeError, DeviceError, OpenError},
    metadata::TrackMetadata,
    output::{AudioSink, OutputDevice},
};

pub const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Default)]
pub struct Counters {
    pub handle_closes: AtomicUsize,
    pub device_closes: AtomicUsize,
    pub writes: AtomicUsize,
}

impl Counters {
    pub fn handle_closes(&self) -> usize {
        self.handle_closes.load(Ordering::SeqCst)
    }

    pub fn device_closes(&self) -> usize {
        self.device_closes.load(Ordering::SeqCst)
    }
}

/// Decoder whose tracks each yield a fixed number of silent units.
///
/// A gated track blocks its first decode, on first open only, until the
/// test releases the gate.
struct FakeDecoder {
    units_per_track: usize,
    opened: Sender<TrackId>,
    gates: Mutex<HashMap<TrackId, Receiver<()>>>,
    unplayable: HashSet<TrackId>,
    counters: Arc<Counters>,
}

struct FakeHandle {
    gate: Option<Receiver<()>>,
    remaining: usize,
    counters: Arc<Counters>,
}

impl Decoder for FakeDecoder {
    fn open(&self, track: &Track) -> Result<Box<dyn DecodeHandle>, OpenError> {
        let _ = self.opened.send(track.id);
        if self.unplayable.contains(&track.id) {
            return Err(OpenError::UnsupportedFormat {
                path: track.path.clone(),
                reason: "fake unplayable track".to_string(),
            });
        }

        let gate = self.gates.lock().unwrap().remove(&track.id);
        Ok(Box::new(FakeHandle {
            gate,
            remaining: self.units_per_track,
            counters: Arc::clone(&self.counters),
        }))
    }
}

impl DecodeHandle for FakeHandle {
    fn decode_next(&mut self) -> Result<DecodeStep, DecodeError> {
        if let Some(gate) = self.gate.take() {
            let _ = gate.recv_timeout(TIMEOUT);
        }
        if self.remaining == 0 {
            return Ok(DecodeStep::EndOfStream);
        }
        self.remaining -= 1;
        Ok(DecodeStep::Unit(DecodeUnit {
            samples: vec![0.0; 96],
            channels: 2,
            sample_rate: 48_000,
        }))
    }

    fn duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(3))
    }

    fn close(&mut self) {
        self.counters.handle_closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// How the first output device opened by a harness misbehaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFault {
    /// No device could be opened
    Open,
    /// The device opens but every write fails
    Write,
}

struct NullSink {
    fault: Mutex<Option<OutputFault>>,
    counters: Arc<Counters>,
}

struct NullDevice {
    fail_writes: bool,
    counters: Arc<Counters>,
}

impl AudioSink for NullSink {
    fn open(&self) -> Result<Box<dyn OutputDevice>, DeviceError> {
        let fault = self.fault.lock().unwrap().take();
        if fault == Some(OutputFault::Open) {
            return Err(DeviceError::NoDevice);
        }
        Ok(Box::new(NullDevice {
            fail_writes: fault == Some(OutputFault::Write),
            counters: Arc::clone(&self.counters),
        }))
    }
}

impl OutputDevice for NullDevice {
    fn write(&mut self, _unit: DecodeUnit) -> Result<(), DeviceError> {
        if self.fail_writes {
            return Err(DeviceError::Write("fake device unplugged".to_string()));
        }
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn is_drained(&self) -> bool {
        true
    }

    fn close(&mut self) {
        self.counters.device_closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// A library of `count` fake tracks with ids `0..count`
pub fn fake_library(count: usize) -> Library {
    let mut library = Library::new();
    for i in 0..count {
        library.add_track(
            format!("/fake/{:02}.flac", i),
            TrackMetadata {
                title: Some(format!("track {}", i)),
                artist: Some("Fake Artist".to_string()),
                album: Some(if i % 2 == 0 { "Even" } else { "Odd" }.to_string()),
                ..Default::default()
            },
        );
    }
    library
}

pub struct HarnessBuilder {
    tracks: usize,
    units_per_track: usize,
    gated: Vec<TrackId>,
    unplayable: HashSet<TrackId>,
    output_fault: Option<OutputFault>,
}

impl HarnessBuilder {
    pub fn new(tracks: usize) -> Self {
        Self {
            tracks,
            units_per_track: 3,
            gated: Vec::new(),
            unplayable: HashSet::new(),
            output_fault: None,
        }
    }

    pub fn gate(mut self, track: TrackId) -> Self {
        self.gated.push(track);
        self
    }

    pub fn unplayable(mut self, track: TrackId) -> Self {
        self.unplayable.insert(track);
        self
    }

    pub fn output_fault(mut self, fault: OutputFault) -> Self {
        self.output_fault = Some(fault);
        self
    }

    pub fn spawn(self) -> Harness {
        let _ = env_logger::builder().is_test(true).try_init();

        let counters = Arc::new(Counters::default());
        let (opened_tx, opened_rx) = crossbeam_channel::unbounded();

        let mut gate_senders = HashMap::new();
        let mut gate_receivers = HashMap::new();
        for track in self.gated {
            let (tx, rx) = crossbeam_channel::bounded(1);
            gate_senders.insert(track, tx);
            gate_receivers.insert(track, rx);
        }

        let decoder = FakeDecoder {
            units_per_track: self.units_per_track,
            opened: opened_tx,
            gates: Mutex::new(gate_receivers),
            unplayable: self.unplayable,
            counters: Arc::clone(&counters),
        };
        let sink = NullSink {
            fault: Mutex::new(self.output_fault),
            counters: Arc::clone(&counters),
        };
        let config = SchedulerConfig::default()
            .with_idle_poll_interval(Duration::from_millis(2))
            .with_pause_poll_interval(Duration::from_millis(1));

        let (scheduler, handle) = PlaybackScheduler::new(
            Arc::new(fake_library(self.tracks)),
            Box::new(decoder),
            Box::new(sink),
            config,
        );
        let thread = scheduler.spawn().unwrap();

        Harness {
            handle,
            thread,
            opened: opened_rx,
            counters,
            gates: gate_senders,
        }
    }
}

pub struct Harness {
    pub handle: SchedulerHandle,
    pub counters: Arc<Counters>,
    thread: JoinHandle<SchedulerState>,
    opened: Receiver<TrackId>,
    gates: HashMap<TrackId, Sender<()>>,
}

impl Harness {
    /// Block until the decoder has opened `count` more tracks
    pub fn wait_opened(&self, count: usize) -> Vec<TrackId> {
        (0..count)
            .map(|_| {
                self.opened
                    .recv_timeout(TIMEOUT)
                    .expect("timed out waiting for a track to open")
            })
            .collect()
    }

    /// Let a gated track decode past its first unit
    pub fn release(&self, track: TrackId) {
        if let Some(gate) = self.gates.get(&track) {
            let _ = gate.try_send(());
        }
    }

    /// Collect events until one matches `done`, returning everything seen
    pub fn wait_event(&self, done: impl Fn(&PlaybackEvent) -> bool) -> Vec<PlaybackEvent> {
        let mut seen = Vec::new();
        loop {
            let event = self
                .handle
                .events()
                .recv_timeout(TIMEOUT)
                .expect("timed out waiting for a scheduler event");
            let matched = done(&event);
            seen.push(event);
            if matched {
                return seen;
            }
        }
    }

    /// Send Exit, open every gate and join the scheduler thread
    pub fn finish(self) -> (SchedulerState, Vec<PlaybackEvent>, Vec<TrackId>) {
        self.handle.exit();
        for gate in self.gates.values() {
            let _ = gate.try_send(());
        }
        let state = self.thread.join().expect("scheduler thread panicked");
        let events = self.handle.events().try_iter().collect();
        let opened = self.opened.try_iter().collect();
        (state, events, opened)
    }
}
