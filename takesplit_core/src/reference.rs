use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::format::AudioFormat;
use crate::probe::probe;
use crate::TakeSplitError;

/// Name fragments marking a comp or rough mix, checked in order before the
/// project name itself.
pub const REFERENCE_TOKENS: [&str; 2] = ["COMP", "ROUGH"];

/// The track whose length defines a take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceTrack {
    pub path: PathBuf,
    pub duration_ms: u64,
}

/// Position of the first token found in `file_name`, counting
/// [`REFERENCE_TOKENS`] in order followed by the project name. Lower is a
/// stronger match. Comparison ignores case.
pub fn reference_rank(file_name: &str, project_name: &str) -> Option<usize> {
    let file_name = file_name.to_uppercase();
    let project_token = project_name.to_uppercase();

    REFERENCE_TOKENS
        .iter()
        .copied()
        .chain((!project_token.is_empty()).then_some(project_token.as_str()))
        .position(|token| file_name.contains(token))
}

/// Returns `true` when `file_name` contains one of [`REFERENCE_TOKENS`] or the
/// project name, ignoring case.
pub fn is_reference_name(file_name: &str, project_name: &str) -> bool {
    reference_rank(file_name, project_name).is_some()
}

/// Find the reference track directly inside `media_dir`.
///
/// The file with the best [`reference_rank`] wins. Files of equal rank are
/// taken in directory listing order, so the first one listed is chosen. A
/// winner that cannot be decoded or has zero length is reported as
/// [`TakeSplitError::ReferenceNotFound`].
pub fn select_reference(
    media_dir: &Path,
    project_name: &str,
) -> Result<ReferenceTrack, TakeSplitError> {
    let not_found = || TakeSplitError::ReferenceNotFound(media_dir.to_path_buf());

    let candidate = find_candidate(media_dir, project_name)?.ok_or_else(not_found)?;

    let duration_ms = match probe(&candidate) {
        Ok(duration_ms) => duration_ms,
        Err(err) => {
            warn!(
                "could not decode reference candidate '{}': {err}",
                candidate.display()
            );
            return Err(not_found());
        }
    };

    if duration_ms == 0 {
        warn!(
            "reference candidate '{}' has no audio",
            candidate.display()
        );
        return Err(not_found());
    }

    info!(
        "reference track '{}' is {duration_ms} ms long",
        candidate.display()
    );

    Ok(ReferenceTrack {
        path: candidate,
        duration_ms,
    })
}

fn find_candidate(media_dir: &Path, project_name: &str) -> Result<Option<PathBuf>, TakeSplitError> {
    let mut best: Option<(usize, PathBuf)> = None;

    for entry in fs::read_dir(media_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        if AudioFormat::from_path(&path).is_none() {
            continue;
        }

        let Some(rank) = reference_rank(&entry.file_name().to_string_lossy(), project_name) else {
            continue;
        };
        if best.as_ref().map_or(true, |(best_rank, _)| rank < *best_rank) {
            best = Some((rank, path));
        }
        if rank == 0 {
            break;
        }
    }

    Ok(best.map(|(_, path)| path))
}
