//! Decoding collaborator: turns a catalog track into a stream of PCM units.
//!
//! The scheduler only sees the [`Decoder`] and [`DecodeHandle`] traits. The
//! production implementation is [`SymphoniaDecoder`].

use std::{fs::File, path::Path, time::Duration};

use symphonia::core::{
    audio::SampleBuffer,
    codecs::{CODEC_TYPE_NULL, Decoder as CodecDecoder, DecoderOptions},
    errors::Error as SymphoniaError,
    formats::{FormatOptions, FormatReader},
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

use crate::{
    error::{DecodeError, OpenError},
    library::Track,
};

/// Consecutive unit failures after which the stream counts as corrupt
const MAX_DECODE_RETRIES: usize = 3;

/// One block of interleaved samples
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeUnit {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodeUnit {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Playback time covered by this unit
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeStep {
    Unit(DecodeUnit),
    EndOfStream,
}

/// An open track. Owned by exactly one player at a time.
pub trait DecodeHandle {
    fn decode_next(&mut self) -> Result<DecodeStep, DecodeError>;

    fn duration(&self) -> Option<Duration>;

    /// Release the underlying file. Called once.
    fn close(&mut self);
}

pub trait Decoder: Send {
    fn open(&self, track: &Track) -> Result<Box<dyn DecodeHandle>, OpenError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for SymphoniaDecoder {
    fn open(&self, track: &Track) -> Result<Box<dyn DecodeHandle>, OpenError> {
        let path = track.path.as_path();
        let file = File::open(path).map_err(|source| OpenError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| probe_error(path, e))?;
        let reader = probed.format;

        let stream = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| OpenError::NoAudioStream(path.to_path_buf()))?;

        let stream_id = stream.id;
        let duration = stream_duration(stream);
        let decoder = symphonia::default::get_codecs()
            .make(&stream.codec_params, &DecoderOptions::default())
            .map_err(|e| OpenError::CodecUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        log::debug!("Opened {:?} (stream {}, duration {:?})", path, stream_id, duration);

        Ok(Box::new(SymphoniaHandle {
            reader: Some(reader),
            decoder,
            stream_id,
            duration,
            failures: 0,
        }))
    }
}

fn probe_error(path: &Path, error: SymphoniaError) -> OpenError {
    match error {
        SymphoniaError::IoError(source) => OpenError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => OpenError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

fn stream_duration(stream: &symphonia::core::formats::Track) -> Option<Duration> {
    let params = &stream.codec_params;
    let frames = params.n_frames?;

    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(frames);
        return Some(Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac));
    }

    params
        .sample_rate
        .filter(|rate| *rate > 0)
        .map(|rate| Duration::from_secs_f64(frames as f64 / rate as f64))
}

struct SymphoniaHandle {
    /// `None` once closed
    reader: Option<Box<dyn FormatReader>>,
    decoder: Box<dyn CodecDecoder>,
    stream_id: u32,
    duration: Option<Duration>,
    failures: usize,
}

fn unit_failed(failures: &mut usize, reason: String) -> DecodeError {
    *failures += 1;
    if *failures > MAX_DECODE_RETRIES {
        DecodeError::Corrupt(format!(
            "{} consecutive decode failures, last: {}",
            failures, reason
        ))
    } else {
        DecodeError::Unit(reason)
    }
}

impl DecodeHandle for SymphoniaHandle {
    fn decode_next(&mut self) -> Result<DecodeStep, DecodeError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(DecodeStep::EndOfStream);
        };

        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(DecodeStep::EndOfStream);
                }
                // Chained streams are not followed
                Err(SymphoniaError::ResetRequired) => return Ok(DecodeStep::EndOfStream),
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };

            if packet.track_id() != self.stream_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(reason)) => {
                    return Err(unit_failed(&mut self.failures, reason.to_string()));
                }
                Err(SymphoniaError::IoError(e)) => {
                    return Err(unit_failed(&mut self.failures, e.to_string()));
                }
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };

            let spec = *decoded.spec();
            if decoded.frames() == 0 {
                continue;
            }

            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);
            self.failures = 0;

            return Ok(DecodeStep::Unit(DecodeUnit {
                samples: buffer.samples().to_vec(),
                channels: spec.channels.count() as u16,
                sample_rate: spec.rate,
            }));
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn close(&mut self) {
        self.reader = None;
    }
}
