use std::time::Duration;

use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};
use takesplit_core::{ExportEvent, ExportSummary, ProgressReporter};

/// Prints export progress for a terminal user.
///
/// Result lines go to stdout and diagnostics to stderr. Both are printed
/// through [`ProgressBar::suspend`] so they never tear the spinner.
pub struct TerminalReporter {
    progress: ProgressBar,
}

impl TerminalReporter {
    pub fn new() -> Self {
        let progress = ProgressBar::new_spinner();
        progress.set_draw_target(ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);

        Self { progress }
    }

    pub fn println(&self, line: impl AsRef<str>) {
        self.progress.suspend(|| println!("{}", line.as_ref()));
    }

    pub fn eprintln(&self, line: impl AsRef<str>) {
        self.progress.suspend(|| eprintln!("{}", line.as_ref()));
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for TerminalReporter {
    fn report(&mut self, event: &ExportEvent<'_>) {
        match event {
            ExportEvent::ProjectStarted { name, .. } => {
                self.progress.enable_steady_tick(Duration::from_millis(100));
                self.progress.set_message(format!("Exporting {name}"));
            }
            ExportEvent::ReferenceSelected { reference } => {
                let length = HumanDuration(Duration::from_millis(reference.duration_ms));
                self.println(format!(
                    "Reference track: {}, Length: {} ms ({length})",
                    reference.path.display(),
                    reference.duration_ms
                ));
            }
            ExportEvent::FileStarted { path } => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.progress.set_message(format!("Splitting {name}"));
            }
            ExportEvent::TakeExported { path } => {
                self.println(format!("Exported: {}", path.display()));
            }
            ExportEvent::TakePlanned { path } => {
                self.println(format!("Would export: {}", path.display()));
            }
            ExportEvent::FileTooShort {
                path,
                total_ms,
                reference_ms,
            } => {
                self.eprintln(format!(
                    "File {} is shorter than reference ({total_ms} ms < {reference_ms} ms). Skipping.",
                    path.display()
                ));
            }
            ExportEvent::FileFailed { path, error } => {
                self.eprintln(format!("Could not process {}: {error}", path.display()));
            }
            ExportEvent::ProjectFinished { .. } => {
                self.progress.set_message(String::from("Completed"));
            }
        }
    }
}

/// One-line description of a whole batch.
pub fn summary_line(summary: &ExportSummary, projects: usize, skipped: usize, dry_run: bool) -> String {
    let verb = if dry_run { "Would export" } else { "Exported" };
    let mut line = format!(
        "{verb} {} take(s) from {} file(s) across {projects} project(s)",
        summary.takes_written, summary.files_split
    );
    if summary.files_too_short > 0 || summary.files_failed > 0 {
        line.push_str(&format!(
            "; {} file(s) too short, {} failed",
            summary.files_too_short, summary.files_failed
        ));
    }
    if skipped > 0 {
        line.push_str(&format!("; {skipped} project(s) skipped"));
    }
    line.push('.');
    line
}
