use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use log::{info, warn};

use crate::probe::{decode, DecodedAudio};
use crate::progress::{ExportEvent, ProgressReporter};
use crate::TakeSplitError;

/// Extension of every exported take.
pub const TAKE_EXTENSION: &str = "wav";

/// One take's position within its source file, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TakeRange {
    /// 1-based position of the take within its source file.
    pub index: u64,
    pub start_ms: u64,
    /// Exclusive end.
    pub end_ms: u64,
}

/// Result of splitting one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitOutcome {
    /// At least one take fits. `takes` lists the written (or, in a dry run,
    /// planned) files in take order.
    Split { total_ms: u64, takes: Vec<PathBuf> },
    /// The source is shorter than a single take; nothing was written.
    TooShort { total_ms: u64 },
}

/// Lay out the full takes that fit into `total_ms`.
///
/// Every boundary is a multiple of `ref_duration_ms`, and any trailing
/// remainder shorter than one take is left out.
pub fn plan_takes(total_ms: u64, ref_duration_ms: u64) -> Vec<TakeRange> {
    if ref_duration_ms == 0 {
        return Vec::new();
    }

    let num_takes = total_ms / ref_duration_ms;
    (0..num_takes)
        .map(|i| TakeRange {
            index: i + 1,
            start_ms: i * ref_duration_ms,
            end_ms: (i + 1) * ref_duration_ms,
        })
        .collect()
}

pub fn take_file_name(base_name: &str, index: u64) -> String {
    format!("{base_name}_Take{index}.{TAKE_EXTENSION}")
}

/// Split the file at `path` into takes of `ref_duration_ms` each, written to
/// `output_dir` as `{base_name}_Take{N}.wav`.
///
/// Existing files with the same name are overwritten. With `dry_run` set
/// the source is still decoded but nothing is written.
///
/// Each take is reported to `progress` as soon as it is on disk (or planned),
/// so takes written before a later failure are still reported. A take whose
/// write fails part-way is removed before the error is returned.
pub fn split_takes<R: ProgressReporter + ?Sized>(
    path: &Path,
    ref_duration_ms: u64,
    output_dir: &Path,
    base_name: &str,
    dry_run: bool,
    progress: &mut R,
) -> Result<SplitOutcome, TakeSplitError> {
    if ref_duration_ms == 0 {
        return Err(TakeSplitError::InvalidReferenceLength);
    }

    let audio = decode(path)?;
    let total_ms = audio.duration_ms();
    let plan = plan_takes(total_ms, ref_duration_ms);
    if plan.is_empty() {
        return Ok(SplitOutcome::TooShort { total_ms });
    }

    let mut takes = Vec::with_capacity(plan.len());
    for range in plan {
        let output_path = output_dir.join(take_file_name(base_name, range.index));
        if dry_run {
            progress.report(&ExportEvent::TakePlanned { path: &output_path });
        } else {
            let samples =
                audio.frames_between(audio.frame_at(range.start_ms), audio.frame_at(range.end_ms));
            write_take(&output_path, &audio, samples)?;
            info!("exported '{}'", output_path.display());
            progress.report(&ExportEvent::TakeExported { path: &output_path });
        }
        takes.push(output_path);
    }

    Ok(SplitOutcome::Split { total_ms, takes })
}

/// Depth written for a source of `bits` bits per sample.
fn output_bits(bits: u32) -> u16 {
    match bits {
        0..=8 => 8,
        9..=16 => 16,
        17..=24 => 24,
        _ => 32,
    }
}

fn write_take(path: &Path, audio: &DecodedAudio, samples: &[i32]) -> Result<(), TakeSplitError> {
    let bits_per_sample = output_bits(audio.bits_per_sample);
    let spec = WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    // Creation failures leave whatever already sits at `path` alone.
    let writer = WavWriter::create(path, spec)?;
    let result = write_samples(writer, bits_per_sample, samples);
    if result.is_err() {
        if let Err(err) = fs::remove_file(path) {
            warn!("could not remove partial take '{}': {err}", path.display());
        }
    }
    result.map_err(TakeSplitError::from)
}

fn write_samples(
    mut writer: WavWriter<BufWriter<File>>,
    bits_per_sample: u16,
    samples: &[i32],
) -> Result<(), hound::Error> {
    let shift = 32 - u32::from(bits_per_sample);
    match bits_per_sample {
        8 => {
            for &sample in samples {
                writer.write_sample((sample >> shift) as i8)?;
            }
        }
        16 => {
            for &sample in samples {
                writer.write_sample((sample >> shift) as i16)?;
            }
        }
        _ => {
            for &sample in samples {
                writer.write_sample(sample >> shift)?;
            }
        }
    }
    writer.finalize()
}
