use std::path::Path;

/// Audio container formats recognised inside a project's media directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Aif,
    Aiff,
    Wav,
    Mp3,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 4] = [
        AudioFormat::Aif,
        AudioFormat::Aiff,
        AudioFormat::Wav,
        AudioFormat::Mp3,
    ];

    /// Lowercase extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Aif => "aif",
            AudioFormat::Aiff => "aiff",
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    /// Classify a path by its extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| extension.eq_ignore_ascii_case(format.extension()))
    }

    /// Whether a file of this format is split into takes.
    ///
    /// Every recognised format can serve as the reference track, but MP3
    /// files are never split.
    pub fn is_take_source(self) -> bool {
        !matches!(self, AudioFormat::Mp3)
    }
}
