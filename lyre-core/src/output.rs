//! Audio output collaborator

use std::{collections::VecDeque, thread, time::Duration};

use rodio::{
    DeviceTrait, OutputStream, OutputStreamBuilder, Sink,
    buffer::SamplesBuffer,
    cpal::{self, traits::HostTrait},
};

use crate::{decoder::DecodeUnit, error::DeviceError};

const DEFAULT_MAX_BUFFERED_UNITS: usize = 8;
const BACKPRESSURE_POLL: Duration = Duration::from_millis(1);

/// An open output device, owned by one track at a time
pub trait OutputDevice {
    /// Queue a unit for playback. May block while the device buffer is full.
    fn write(&mut self, unit: DecodeUnit) -> Result<(), DeviceError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Everything written so far has been played
    fn is_drained(&self) -> bool;

    /// Audio written but not played yet
    fn buffered(&self) -> Duration {
        Duration::ZERO
    }

    fn close(&mut self);
}

/// Opens an [`OutputDevice`] per track
pub trait AudioSink: Send {
    fn open(&self) -> Result<Box<dyn OutputDevice>, DeviceError>;
}

/// Default cpal output through rodio
#[derive(Debug, Clone, Copy)]
pub struct RodioSink {
    max_buffered_units: usize,
}

impl RodioSink {
    pub fn new(max_buffered_units: usize) -> Self {
        Self {
            max_buffered_units: max_buffered_units.max(1),
        }
    }
}

impl Default for RodioSink {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUFFERED_UNITS)
    }
}

impl AudioSink for RodioSink {
    fn open(&self) -> Result<Box<dyn OutputDevice>, DeviceError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(DeviceError::NoDevice)?;
        let device_name = device.name().unwrap_or_else(|_| "(unknown)".to_string());

        let mut stream = OutputStreamBuilder::from_device(device)
            .and_then(|builder| builder.open_stream())
            .map_err(|e| DeviceError::Stream(e.to_string()))?;
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        log::debug!("Output opened on {}", device_name);

        Ok(Box::new(RodioDevice {
            _stream: stream,
            sink,
            max_buffered_units: self.max_buffered_units,
            queued: VecDeque::new(),
        }))
    }
}

struct RodioDevice {
    // Keeps the cpal stream alive for the sink
    _stream: OutputStream,
    sink: Sink,
    max_buffered_units: usize,
    /// Durations of the appended units, oldest first
    queued: VecDeque<Duration>,
}

/// Time left in the last `pending` of the `queued` units
fn unplayed(queued: &VecDeque<Duration>, pending: usize) -> Duration {
    queued.iter().rev().take(pending).sum()
}

impl OutputDevice for RodioDevice {
    fn write(&mut self, unit: DecodeUnit) -> Result<(), DeviceError> {
        if unit.channels == 0 || unit.sample_rate == 0 {
            return Err(DeviceError::Write(format!(
                "invalid unit format: {} channels at {} Hz",
                unit.channels, unit.sample_rate
            )));
        }

        while self.sink.len() >= self.max_buffered_units && !self.sink.is_paused() {
            thread::sleep(BACKPRESSURE_POLL);
        }

        while self.queued.len() > self.sink.len() {
            self.queued.pop_front();
        }
        self.queued.push_back(unit.duration());
        self.sink
            .append(SamplesBuffer::new(unit.channels, unit.sample_rate, unit.samples));
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn is_drained(&self) -> bool {
        self.sink.empty()
    }

    fn buffered(&self) -> Duration {
        unplayed(&self.queued, self.sink.len())
    }

    fn close(&mut self) {
        self.sink.stop();
    }
}
