use std::fs::File;
use std::io;
use std::path::Path;

use log::debug;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::TakeSplitError;

/// Bit depth assumed for sources whose codec does not report one (e.g. MP3).
pub const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// Fully decoded PCM audio.
///
/// Samples are interleaved and scaled to the full `i32` range regardless of
/// the source bit depth, so a slice of frames can be re-encoded at the
/// original depth without loss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u32,
    pub samples: Vec<i32>,
}

impl DecodedAudio {
    pub fn frames(&self) -> u64 {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() as u64 / u64::from(self.channels)
    }

    /// Total duration rounded to the nearest whole millisecond.
    ///
    /// Slices cut at [`DecodedAudio::frame_at`] boundaries are within one
    /// frame of the exact length, so they measure back to the length they
    /// were cut at for any rate above 2 kHz.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        let rate = u64::from(self.sample_rate);
        (self.frames() * 1_000 + rate / 2) / rate
    }

    /// Index of the frame that starts at `ms` milliseconds.
    pub fn frame_at(&self, ms: u64) -> u64 {
        ms * u64::from(self.sample_rate) / 1_000
    }

    /// Interleaved samples for the half-open frame range `[start, end)`,
    /// clamped to the decoded length.
    pub fn frames_between(&self, start: u64, end: u64) -> &[i32] {
        let channels = usize::from(self.channels);
        let total = self.samples.len();
        let start = (start as usize).saturating_mul(channels).min(total);
        let end = (end as usize).saturating_mul(channels).min(total);
        &self.samples[start..end.max(start)]
    }
}

/// Decode the whole file at `path` into memory.
pub fn decode(path: &Path) -> Result<DecodedAudio, TakeSplitError> {
    let decode_error = |source| TakeSplitError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_error)?;
    let mut reader = probed.format;

    let track = reader
        .default_track()
        .ok_or(TakeSplitError::MissingDefaultTrack)?;
    if track.codec_params.codec == CODEC_TYPE_NULL {
        return Err(TakeSplitError::UnsupportedCodec);
    }

    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params
        .sample_rate
        .ok_or(TakeSplitError::MissingSampleRate)?;
    let bits_per_sample = params.bits_per_sample.unwrap_or(DEFAULT_BITS_PER_SAMPLE);
    let mut channels = params
        .channels
        .map(|channels| channels.count() as u16)
        .unwrap_or(0);

    let mut decoder = get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(decode_error)?;

    let mut samples = Vec::new();
    if let Some(frames) = params.n_frames {
        samples.reserve(frames as usize * usize::from(channels.max(1)));
    }

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(decode_error(err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if decoded.frames() == 0 {
                    continue;
                }
                let spec = *decoded.spec();
                channels = spec.channels.count() as u16;
                let mut buffer = SampleBuffer::<i32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(err) => return Err(decode_error(err)),
        }
    }

    let audio = DecodedAudio {
        sample_rate,
        channels,
        bits_per_sample,
        samples,
    };
    debug!(
        "decoded '{}': {} Hz, {} channel(s), {} bit, {} frames",
        path.display(),
        audio.sample_rate,
        audio.channels,
        audio.bits_per_sample,
        audio.frames()
    );

    Ok(audio)
}

/// Duration of the file at `path` in whole milliseconds.
pub fn probe(path: &Path) -> Result<u64, TakeSplitError> {
    decode(path).map(|audio| audio.duration_ms())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(sample_rate: u32, channels: u16, frames: usize) -> DecodedAudio {
        DecodedAudio {
            sample_rate,
            channels,
            bits_per_sample: 16,
            samples: (0..frames * usize::from(channels)).map(|n| n as i32).collect(),
        }
    }

    #[test]
    fn duration_rounds_to_nearest_millisecond() {
        assert_eq!(audio(8_000, 1, 8_000).duration_ms(), 1_000);
        assert_eq!(audio(8_000, 2, 8_003).duration_ms(), 1_000);
        assert_eq!(audio(8_000, 2, 8_005).duration_ms(), 1_001);
        assert_eq!(audio(44_100, 1, 44_099).duration_ms(), 1_000);
        assert_eq!(audio(44_100, 1, 14_686).duration_ms(), 333);
    }

    #[test]
    fn slices_at_frame_boundaries_measure_the_cut_length() {
        let source = audio(44_100, 1, 3 * 14_700);
        let reference_ms = 333;
        for index in 0..3 {
            let start = source.frame_at(index * reference_ms);
            let end = source.frame_at((index + 1) * reference_ms);
            let slice = audio(44_100, 1, (end - start) as usize);
            assert_eq!(slice.duration_ms(), reference_ms);
        }
    }

    #[test]
    fn frame_lookup_is_recomputed_from_milliseconds() {
        let audio = audio(44_100, 1, 0);
        assert_eq!(audio.frame_at(0), 0);
        assert_eq!(audio.frame_at(1_000), 44_100);
        assert_eq!(audio.frame_at(3 * 333), 44_055);
    }

    #[test]
    fn frames_between_respects_channel_interleaving() {
        let audio = audio(8_000, 2, 4);
        assert_eq!(audio.frames_between(1, 3), &[2, 3, 4, 5]);
        assert_eq!(audio.frames_between(3, 10), &[6, 7]);
        assert!(audio.frames_between(5, 6).is_empty());
    }

    #[test]
    fn empty_audio_has_zero_duration() {
        let empty = DecodedAudio {
            sample_rate: 0,
            channels: 0,
            bits_per_sample: 16,
            samples: Vec::new(),
        };
        assert_eq!(empty.frames(), 0);
        assert_eq!(empty.duration_ms(), 0);
    }
}
