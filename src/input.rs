//! Input validation: the fail-fast gate before any subprocess or network call.

use crate::config::Settings;
use crate::error::{Result, RouteError};
use std::path::{Path, PathBuf};

/// A validated audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInput {
    path: PathBuf,
    extension: String,
}

impl AudioInput {
    /// Absolute path to the recording.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercase extension without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name without extension, used to name batch outputs.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string())
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Validate an audio path against existence, readability and the extension
/// allow-list.
///
/// # Errors
///
/// `FileNotFound` if no regular file exists at `path`, `FileUnreadable` if it
/// cannot be opened, `UnsupportedFileType` if its extension is not allowed.
pub fn validate_audio_file(path: &Path, settings: &Settings) -> Result<AudioInput> {
    let expanded = expand_tilde(path);

    if !expanded.is_file() {
        return Err(RouteError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    if let Err(e) = std::fs::File::open(&expanded) {
        return Err(RouteError::FileUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        });
    }

    let extension = expanded
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if !settings.is_extension_allowed(&extension) {
        return Err(RouteError::UnsupportedFileType {
            path: path.display().to_string(),
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{extension}")
            },
            allowed: settings.allowed_display(),
        });
    }

    let path = std::fs::canonicalize(&expanded)?;

    Ok(AudioInput { path, extension })
}
