//! Export overdub takes from multi-track recording projects.
//!
//! A project holds one reference (comp or rough mix) track and several longer
//! recordings that each contain back-to-back takes. Every recording is cut
//! into consecutive pieces as long as the reference, and each piece is
//! written as its own WAV file.

use std::path::{Path, PathBuf};

use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

pub mod format;
pub mod probe;
pub mod progress;
pub mod project;
pub mod reference;
pub mod splitter;

pub use format::AudioFormat;
pub use probe::{decode, probe, DecodedAudio};
pub use progress::{ExportEvent, NoProgress, ProgressReporter};
pub use project::{export_project, project_name, ExportSummary, MEDIA_DIR_NAME};
pub use reference::{is_reference_name, select_reference, ReferenceTrack, REFERENCE_TOKENS};
pub use splitter::{plan_takes, split_takes, take_file_name, SplitOutcome, TakeRange};

/// Package extension of Logic Pro projects.
pub const DEFAULT_PACKAGE_EXTENSION: &str = "logicx";

/// Errors that can occur while exporting takes.
#[derive(Debug, Error)]
pub enum TakeSplitError {
    /// The file could not be demuxed or decoded.
    #[error("could not decode '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: SymphoniaError,
    },

    /// Wrapper around IO errors encountered while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper around errors produced while encoding a take.
    #[error("failed to encode take: {0}")]
    Encode(#[from] hound::Error),

    /// Error returned when the decoder track lacks a sample rate.
    #[error("input stream does not advertise a sample rate")]
    MissingSampleRate,

    /// Error returned when the container does not expose any default track.
    #[error("input stream does not provide a default track")]
    MissingDefaultTrack,

    /// Error returned when the codec of the track cannot be handled.
    #[error("unsupported codec")]
    UnsupportedCodec,

    /// Error returned when the reference length is zero.
    #[error("reference length must be greater than zero milliseconds")]
    InvalidReferenceLength,

    /// The project has no `Media` subdirectory.
    #[error(
        "Media folder not found in '{}'; is this a valid project?",
        .0.display()
    )]
    MissingMediaDirectory(PathBuf),

    /// No usable reference track was found in the media directory.
    #[error("could not find a reference track in '{}'", .0.display())]
    ReferenceNotFound(PathBuf),

    /// A project name cannot be derived from the project path.
    #[error("failed to derive a project name from '{}'", .0.display())]
    InvalidProjectName(PathBuf),
}

/// Configuration shared by every project in one export run.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Directory into which all takes are written.
    pub output_dir: PathBuf,
    /// Plan takes without writing anything.
    pub dry_run: bool,
    /// Extension stripped from project directory names, without the dot.
    pub package_extension: String,
}

impl ExportConfig {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self::builder(output_dir).build()
    }

    pub fn builder<P: AsRef<Path>>(output_dir: P) -> ExportConfigBuilder {
        ExportConfigBuilder {
            output_dir: output_dir.as_ref().to_path_buf(),
            dry_run: false,
            package_extension: DEFAULT_PACKAGE_EXTENSION.to_owned(),
        }
    }
}

/// Builder for [`ExportConfig`].
#[derive(Clone, Debug)]
pub struct ExportConfigBuilder {
    output_dir: PathBuf,
    dry_run: bool,
    package_extension: String,
}

impl ExportConfigBuilder {
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Accepts the extension with or without a leading dot.
    pub fn package_extension<S: AsRef<str>>(mut self, extension: S) -> Self {
        self.package_extension = extension.as_ref().trim_start_matches('.').to_owned();
        self
    }

    pub fn build(self) -> ExportConfig {
        ExportConfig {
            output_dir: self.output_dir,
            dry_run: self.dry_run,
            package_extension: self.package_extension,
        }
    }
}
