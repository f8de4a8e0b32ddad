//! Audio duration measurement.

use narrata_core::AudioClip;
use narrata_error::{MediaError, MediaErrorKind, NarrataResult};
use std::io::Cursor;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

fn decode_error(message: impl Into<String>) -> MediaError {
    MediaError::new(MediaErrorKind::Decode(message.into()))
}

/// Decodes a WAV payload and returns its length in seconds.
///
/// # Errors
///
/// Returns an error if the bytes are not a readable WAV stream.
pub fn decode_wav_duration(bytes: &[u8]) -> NarrataResult<f64> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).map_err(|e| decode_error(e.to_string()))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(decode_error("sample rate is zero").into());
    }
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Decodes a compressed payload (MP3, AAC, ...) and returns its length in seconds.
///
/// `extension` is a format hint; the stream is also sniffed.
///
/// # Errors
///
/// Returns an error if no audio track can be found or decoded.
pub fn decode_compressed_duration(bytes: &[u8], extension: &str) -> NarrataResult<f64> {
    let mut hint = Hint::new();
    hint.with_extension(extension);
    let source = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let format_opts = FormatOptions {
        enable_gapless: false,
        ..Default::default()
    };

    let sniffed = symphonia::default::get_probe()
        .format(&hint, source, &format_opts, &MetadataOptions::default())
        .map_err(|e| decode_error(e.to_string()))?;
    let mut format = sniffed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_error("no audio track"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(e.to_string()))?;

    let mut frames: u64 = 0;
    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => {
                sample_rate.get_or_insert(decoded.spec().rate);
                frames += decoded.frames() as u64;
            }
            Err(e) => tracing::debug!(error = %e, "Skipping undecodable packet"),
        }
    }

    match sample_rate {
        Some(rate) if rate > 0 => Ok(frames as f64 / rate as f64),
        _ => Err(decode_error("sample rate unknown").into()),
    }
}

/// Decoded length of a clip, whatever its container.
///
/// # Errors
///
/// Returns an error if the payload is neither WAV nor a supported
/// compressed format.
pub fn decode_duration(clip: &AudioClip) -> NarrataResult<f64> {
    decode_wav_duration(clip.bytes())
        .or_else(|_| decode_compressed_duration(clip.bytes(), clip.extension()))
}

/// Length of a clip for timeline purposes.
///
/// Prefers the decoded length, then the duration the synthesizer declared,
/// then `default_seconds`.
pub fn measure_duration(clip: &AudioClip, default_seconds: f64) -> f64 {
    match decode_duration(clip) {
        Ok(seconds) if seconds > 0.0 => seconds,
        Ok(_) | Err(_) => match clip.duration_seconds() {
            Some(declared) if *declared > 0.0 => *declared,
            _ => {
                tracing::debug!(
                    mime = %clip.mime_type(),
                    default_seconds,
                    "Audio duration unknown, using default"
                );
                default_seconds
            }
        },
    }
}
