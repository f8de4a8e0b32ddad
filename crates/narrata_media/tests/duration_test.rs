use narrata_core::AudioClip;
use narrata_media::{FallbackConfig, FallbackSynthesizer, decode_compressed_duration, measure_duration};

const MP3_FRAME_SAMPLES: f64 = 1152.0;
const MP3_RATE: f64 = 44_100.0;

/// Silent MPEG-1 Layer III stream: 128 kbit/s, 44.1 kHz, mono.
fn mp3_silence(frames: usize) -> Vec<u8> {
    // 144 * 128000 / 44100, no padding.
    const FRAME_LEN: usize = 417;
    let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0xC0]);
        bytes.extend_from_slice(&frame);
    }
    bytes
}

#[test]
fn mp3_length_is_decoded() {
    let seconds = decode_compressed_duration(&mp3_silence(100), "mp3").unwrap();

    let expected = 100.0 * MP3_FRAME_SAMPLES / MP3_RATE;
    assert!((seconds - expected).abs() < 0.05, "decoded {}", seconds);
}

#[test]
fn mp3_narration_is_not_cut_to_the_default() {
    let clip = AudioClip::new(mp3_silence(400), "audio/mpeg", None);

    let seconds = measure_duration(&clip, 3.0);

    let expected = 400.0 * MP3_FRAME_SAMPLES / MP3_RATE;
    assert!((seconds - expected).abs() < 0.1, "measured {}", seconds);
    assert!(seconds > 10.0);
}

#[test]
fn decoded_length_beats_declared_length() {
    let clip = AudioClip::new(mp3_silence(100), "audio/mpeg", Some(9.0));

    let seconds = measure_duration(&clip, 3.0);

    assert!((seconds - 2.612).abs() < 0.05, "measured {}", seconds);
}

#[test]
fn wav_is_still_measured_exactly() {
    let fallback = FallbackSynthesizer::new(FallbackConfig::default()).unwrap();
    let clip = AudioClip::new(fallback.silence_for(2.5).bytes().clone(), "audio/wav", None);

    assert!((measure_duration(&clip, 3.0) - 2.5).abs() < 1e-3);
}

#[test]
fn undecodable_bytes_fall_back_to_declared_then_default() {
    let declared = AudioClip::new(b"not audio".to_vec(), "audio/ogg", Some(4.0));
    let unknown = AudioClip::new(b"not audio".to_vec(), "audio/ogg", None);

    assert_eq!(measure_duration(&declared, 3.0), 4.0);
    assert_eq!(measure_duration(&unknown, 3.0), 3.0);
    assert!(decode_compressed_duration(b"not audio", "ogg").is_err());
}
