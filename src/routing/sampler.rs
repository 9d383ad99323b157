//! Probe clip extraction through an external media tool.
//!
//! Cuts the leading seconds of a recording into a mono WAV in a private
//! scratch directory. The tool being absent or failing is a soft failure:
//! callers get a [`ProbeResult`] that falls back to the original file.

use crate::config::Settings;
use crate::defaults;
use crate::error::{Result, RouteError};
use crate::routing::command::CommandExecutor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A probe clip on disk.
///
/// Owns its scratch directory; dropping the clip deletes the file and the
/// directory, whichever way the caller exits.
#[derive(Debug)]
pub struct ProbeClip {
    path: PathBuf,
    _dir: TempDir,
}

impl ProbeClip {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of a probing attempt.
#[derive(Debug)]
pub struct ProbeResult {
    clip: Option<ProbeClip>,
    fallback_reason: Option<RouteError>,
}

impl ProbeResult {
    /// Probing was not attempted.
    pub fn skipped() -> Self {
        Self {
            clip: None,
            fallback_reason: None,
        }
    }

    /// True if a clip was actually produced.
    pub fn probe_used(&self) -> bool {
        self.clip.is_some()
    }

    /// Why probing fell back to the original file, if it did.
    pub fn fallback_reason(&self) -> Option<&RouteError> {
        self.fallback_reason.as_ref()
    }

    /// Audio to send to the probe transcriber: the clip, or `original`.
    pub fn audio_path<'a>(&'a self, original: &'a Path) -> &'a Path {
        self.clip.as_ref().map(ProbeClip::path).unwrap_or(original)
    }
}

/// Extracts probe clips with the configured media tool.
pub struct Sampler<E: CommandExecutor> {
    executor: E,
    tool: String,
    sample_rate: u32,
    channels: u8,
}

impl<E: CommandExecutor> Sampler<E> {
    pub fn new(executor: E, settings: &Settings) -> Self {
        Self {
            executor,
            tool: settings.probe_tool.clone(),
            sample_rate: settings.probe_sample_rate,
            channels: settings.probe_channels,
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Capability probe: ask the tool for its version.
    ///
    /// Runs on every call, nothing is cached.
    pub fn check_available(&self) -> Result<()> {
        self.executor.execute(&self.tool, &["-version"]).map(|_| ())
    }

    /// Cut the first `seconds` of `source` into a fresh probe clip.
    pub fn sample(&self, source: &Path, seconds: u32) -> Result<ProbeClip> {
        self.check_available()?;

        let dir = tempfile::Builder::new()
            .prefix(defaults::PROBE_DIR_PREFIX)
            .tempdir()
            .map_err(|e| RouteError::ProbeToolFailed {
                message: format!("Failed to create probe directory: {e}"),
            })?;
        let path = dir.path().join(defaults::PROBE_FILE_NAME);

        let source_arg = source.to_string_lossy();
        let output_arg = path.to_string_lossy();
        let seconds_arg = seconds.to_string();
        let channels_arg = self.channels.to_string();
        let rate_arg = self.sample_rate.to_string();

        let args: [&str; 13] = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-y",
            "-i",
            source_arg.as_ref(),
            "-t",
            seconds_arg.as_str(),
            "-ac",
            channels_arg.as_str(),
            "-ar",
            rate_arg.as_str(),
            output_arg.as_ref(),
        ];
        log::debug!("Running {} {}", self.tool, args.join(" "));
        self.executor.execute(&self.tool, &args)?;

        if !path.is_file() {
            return Err(RouteError::ProbeToolFailed {
                message: format!("{} produced no output at {}", self.tool, path.display()),
            });
        }

        Ok(ProbeClip { path, _dir: dir })
    }

    /// Like [`Sampler::sample`], but converts failures into a fallback.
    pub fn probe(&self, source: &Path, seconds: u32) -> ProbeResult {
        match self.sample(source, seconds) {
            Ok(clip) => {
                log::debug!("Probe clip ready at {}", clip.path().display());
                ProbeResult {
                    clip: Some(clip),
                    fallback_reason: None,
                }
            }
            Err(e) => {
                log::warn!("{e}; using the full file for language detection");
                ProbeResult {
                    clip: None,
                    fallback_reason: Some(e),
                }
            }
        }
    }
}
