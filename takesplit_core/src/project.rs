use std::fs;
use std::path::Path;

use log::{info, warn};
use walkdir::WalkDir;

use crate::format::AudioFormat;
use crate::progress::{ExportEvent, ProgressReporter};
use crate::reference::select_reference;
use crate::splitter::{split_takes, SplitOutcome};
use crate::{ExportConfig, TakeSplitError};

/// Subdirectory of a project package that holds its audio.
pub const MEDIA_DIR_NAME: &str = "Media";

/// Counters collected while exporting one project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Takes written, or planned when running dry.
    pub takes_written: u64,
    /// Source files that yielded at least one take, including files that
    /// failed part-way through.
    pub files_split: u64,
    pub files_too_short: u64,
    pub files_failed: u64,
}

impl ExportSummary {
    pub fn merge(&mut self, other: &ExportSummary) {
        self.takes_written += other.takes_written;
        self.files_split += other.files_split;
        self.files_too_short += other.files_too_short;
        self.files_failed += other.files_failed;
    }
}

/// Derive a project's name from its path by dropping the package extension
/// (`MySong.logicx` becomes `MySong`).
pub fn project_name(project_path: &Path, package_extension: &str) -> Result<String, TakeSplitError> {
    let file_name = project_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| TakeSplitError::InvalidProjectName(project_path.to_path_buf()))?;

    let suffix = format!(".{package_extension}");
    let name = if package_extension.is_empty() {
        file_name
    } else {
        file_name.strip_suffix(suffix.as_str()).unwrap_or(file_name)
    };

    if name.is_empty() {
        return Err(TakeSplitError::InvalidProjectName(project_path.to_path_buf()));
    }

    Ok(name.to_owned())
}

/// Export every take found in one project.
///
/// Structural problems (no `Media` directory, no reference track) abort the
/// project and are returned as errors. Failures on individual source files
/// are reported through `progress`, counted in the summary, and skipped.
/// Takes a failing file wrote before the failure still count as written.
pub fn export_project<R: ProgressReporter + ?Sized>(
    project_path: &Path,
    config: &ExportConfig,
    progress: &mut R,
) -> Result<ExportSummary, TakeSplitError> {
    if !config.dry_run {
        fs::create_dir_all(&config.output_dir)?;
    }

    let media_dir = project_path.join(MEDIA_DIR_NAME);
    if !media_dir.is_dir() {
        return Err(TakeSplitError::MissingMediaDirectory(
            project_path.to_path_buf(),
        ));
    }

    let name = project_name(project_path, &config.package_extension)?;
    progress.report(&ExportEvent::ProjectStarted {
        project: project_path,
        name: &name,
    });

    let reference = select_reference(&media_dir, &name)?;
    progress.report(&ExportEvent::ReferenceSelected {
        reference: &reference,
    });

    let mut summary = ExportSummary::default();

    for entry in WalkDir::new(&media_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry in '{}': {err}", media_dir.display());
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path == reference.path.as_path() {
            continue;
        }
        let is_source = AudioFormat::from_path(path).is_some_and(AudioFormat::is_take_source);
        if !is_source {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();
        let base_name = format!("{name}_{stem}");

        progress.report(&ExportEvent::FileStarted { path });
        let mut takes_written = 0u64;
        let result = split_takes(
            path,
            reference.duration_ms,
            &config.output_dir,
            &base_name,
            config.dry_run,
            &mut |event: &ExportEvent<'_>| {
                if matches!(
                    event,
                    ExportEvent::TakeExported { .. } | ExportEvent::TakePlanned { .. }
                ) {
                    takes_written += 1;
                }
                progress.report(event);
            },
        );
        summary.takes_written += takes_written;
        if takes_written > 0 {
            summary.files_split += 1;
        }

        match result {
            Ok(SplitOutcome::Split { .. }) => {}
            Ok(SplitOutcome::TooShort { total_ms }) => {
                summary.files_too_short += 1;
                warn!(
                    "'{}' ({total_ms} ms) is shorter than the reference ({} ms)",
                    path.display(),
                    reference.duration_ms
                );
                progress.report(&ExportEvent::FileTooShort {
                    path,
                    total_ms,
                    reference_ms: reference.duration_ms,
                });
            }
            Err(error) => {
                summary.files_failed += 1;
                warn!("failed to split '{}': {error}", path.display());
                progress.report(&ExportEvent::FileFailed {
                    path,
                    error: &error,
                });
            }
        }
    }

    info!(
        "project '{name}': {} take(s) from {} file(s), {} too short, {} failed",
        summary.takes_written, summary.files_split, summary.files_too_short, summary.files_failed
    );
    progress.report(&ExportEvent::ProjectFinished {
        project: project_path,
        summary: &summary,
    });

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_strips_package_extension() {
        let name = project_name(Path::new("/sessions/MySong.logicx"), "logicx").unwrap();
        assert_eq!(name, "MySong");
    }

    #[test]
    fn project_name_keeps_names_without_the_extension() {
        let name = project_name(Path::new("/sessions/Demo Take"), "logicx").unwrap();
        assert_eq!(name, "Demo Take");
    }

    #[test]
    fn project_name_only_strips_a_trailing_extension() {
        let name = project_name(Path::new("my.logicx.backup"), "logicx").unwrap();
        assert_eq!(name, "my.logicx.backup");
    }

    #[test]
    fn project_name_rejects_bare_package_extension() {
        let err = project_name(Path::new(".logicx"), "logicx").unwrap_err();
        assert!(matches!(err, TakeSplitError::InvalidProjectName(_)));
    }

    #[test]
    fn summaries_merge_by_addition() {
        let mut total = ExportSummary {
            takes_written: 2,
            files_split: 1,
            files_too_short: 0,
            files_failed: 1,
        };
        total.merge(&ExportSummary {
            takes_written: 3,
            files_split: 2,
            files_too_short: 1,
            files_failed: 0,
        });
        assert_eq!(
            total,
            ExportSummary {
                takes_written: 5,
                files_split: 3,
                files_too_short: 1,
                files_failed: 1,
            }
        );
    }
}
