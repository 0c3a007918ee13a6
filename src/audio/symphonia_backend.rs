//! Shared `symphonia` plumbing used by both concrete decoders.
//!
//! Mirrors the decode loop of a typical `symphonia`-backed audio loader:
//! probe the container, grab the first track with a sample rate, decode
//! packet by packet, and average channels are *not* collapsed here — the
//! preprocessor is responsible for channel selection and mono downmixing.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::probe::Hint;

use crate::audio::PcmBuffer;
use crate::error::{MatchError, Result};

pub fn decode_file(path: &Path) -> Result<PcmBuffer> {
    let file = File::open(path).map_err(|e| MatchError::InputUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let source = ReadOnlySource::new(file);
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &Default::default())
        .map_err(|e| MatchError::DecodeFailed {
            path: path.to_path_buf(),
            reason: format!("failed to probe format: {e}"),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.sample_rate.is_some())
        .ok_or_else(|| MatchError::DecodeFailed {
            path: path.to_path_buf(),
            reason: "no audio track found".to_string(),
        })?;

    let sample_rate = track.codec_params.sample_rate.ok_or_else(|| {
        MatchError::DecodeFailed {
            path: path.to_path_buf(),
            reason: "track has no sample rate".to_string(),
        }
    })?;
    let num_channels = track
        .codec_params
        .channels
        .ok_or_else(|| MatchError::DecodeFailed {
            path: path.to_path_buf(),
            reason: "track has no channel layout".to_string(),
        })?
        .count();

    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| MatchError::DecodeFailed {
            path: path.to_path_buf(),
            reason: format!("no decoder for codec: {e}"),
        })?;

    let mut channels: Vec<Vec<f64>> = vec![Vec::new(); num_channels];

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(_)) => break,
            Err(symphonia::core::errors::Error::ResetRequired) => break,
            Err(e) => {
                return Err(MatchError::DecodeFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(buf) => push_samples(&mut channels, &buf),
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => {
                return Err(MatchError::DecodeFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        }
    }

    if channels.iter().all(Vec::is_empty) {
        return Err(MatchError::DecodeFailed {
            path: path.to_path_buf(),
            reason: "no samples decoded".to_string(),
        });
    }

    PcmBuffer {
        channels,
        sample_rate,
    }
    .validate()
}

fn push_samples(channels: &mut [Vec<f64>], buf: &AudioBufferRef) {
    macro_rules! push {
        ($buf:expr, $norm:expr) => {{
            let n = std::cmp::min(channels.len(), $buf.spec().channels.count());
            for ch in 0..n {
                for &s in $buf.chan(ch) {
                    channels[ch].push($norm(s));
                }
            }
        }};
    }

    match buf {
        AudioBufferRef::F32(b) => push!(b, |v: f32| v as f64),
        AudioBufferRef::F64(b) => push!(b, |v: f64| v),
        AudioBufferRef::S8(b) => push!(b, |v: i8| v as f64 / i8::MAX as f64),
        AudioBufferRef::S16(b) => push!(b, |v: i16| v as f64 / i16::MAX as f64),
        AudioBufferRef::S24(b) => {
            push!(b, |v: symphonia::core::sample::i24| v.into_i32() as f64
                / (2_i32.pow(23) - 1) as f64)
        }
        AudioBufferRef::S32(b) => push!(b, |v: i32| v as f64 / i32::MAX as f64),
        AudioBufferRef::U8(b) => push!(b, |v: u8| (v as f64 / 255.0 - 0.5) * 2.0),
        AudioBufferRef::U16(b) => push!(b, |v: u16| (v as f64 / 65535.0 - 0.5) * 2.0),
        AudioBufferRef::U24(b) => push!(b, |v: symphonia::core::sample::u24| {
            (v.into_u32() as f64 / (2_u32.pow(24) - 1) as f64 - 0.5) * 2.0
        }),
        AudioBufferRef::U32(b) => push!(b, |v: u32| (v as f64 / u32::MAX as f64 - 0.5) * 2.0),
    }
}
