use std::path::Path;

use crate::project::ExportSummary;
use crate::reference::ReferenceTrack;
use crate::TakeSplitError;

/// Notifications emitted while a project is exported.
#[derive(Debug)]
pub enum ExportEvent<'a> {
    ProjectStarted {
        project: &'a Path,
        name: &'a str,
    },
    ReferenceSelected {
        reference: &'a ReferenceTrack,
    },
    FileStarted {
        path: &'a Path,
    },
    TakeExported {
        path: &'a Path,
    },
    /// A take that a dry run would have written.
    TakePlanned {
        path: &'a Path,
    },
    FileTooShort {
        path: &'a Path,
        total_ms: u64,
        reference_ms: u64,
    },
    FileFailed {
        path: &'a Path,
        error: &'a TakeSplitError,
    },
    ProjectFinished {
        project: &'a Path,
        summary: &'a ExportSummary,
    },
}

/// Receives [`ExportEvent`]s; the default implementation ignores them.
pub trait ProgressReporter {
    fn report(&mut self, _event: &ExportEvent<'_>) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(&ExportEvent<'_>),
{
    fn report(&mut self, event: &ExportEvent<'_>) {
        self(event)
    }
}

/// A reporter that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
