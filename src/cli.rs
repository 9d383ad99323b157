//! Command-line interface for langroute
//!
//! Provides argument parsing using clap derive macros.

use crate::config::Config;
use crate::defaults;
use crate::error::{Result, RouteError};
use crate::options::RunOptions;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Transcribe audio files, optionally routing each to its spoken language
#[derive(Parser, Debug)]
#[command(name = "langroute", version = crate::version_string(), about)]
pub struct Cli {
    /// Audio files to transcribe (mp3, m4a, wav)
    #[arg(required = true, value_name = "AUDIO")]
    pub audio: Vec<PathBuf>,

    /// Detect the spoken language from a short probe before transcribing
    #[arg(long)]
    pub language_routing: bool,

    /// Force an ISO-639-1 language code (skips routing). Examples: en, pt, es
    #[arg(long, value_name = "CODE")]
    pub language: Option<String>,

    /// Seconds of audio to sample for language detection (default: 25)
    #[arg(long, value_name = "SECONDS")]
    pub probe_seconds: Option<u32>,

    /// Detect the language from the full file instead of a probe clip
    #[arg(long)]
    pub no_probe: bool,

    /// Primary transcription model (default: gpt-4o-transcribe)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Model used for the language probe (default: gpt-4o-mini-transcribe)
    #[arg(long, value_name = "MODEL")]
    pub detect_model: Option<String>,

    /// Decoding temperature between 0.0 and 1.0 (default: 0.0)
    #[arg(long, value_name = "TEMP", allow_negative_numbers = true)]
    pub temperature: Option<f32>,

    /// Write JSON here instead of stdout (a directory when several files are given)
    #[arg(long, short, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Validate inputs and print the result shape without calling anything
    #[arg(long)]
    pub dry_run: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'v', long = "debug", visible_alias = "verbose")]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to <log-dir>/langroute.log
    #[arg(long)]
    pub enable_file_logging: bool,

    /// Directory for the log file (default: logs)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// API request timeout (default: 300s). Examples: 90s, 5m, 120
    #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,
}

/// Parse a timeout string.
///
/// Bare numbers are seconds; anything else goes through `humantime`.
fn parse_timeout(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

impl Cli {
    /// Reject out-of-range values clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.temperature
            && !(defaults::MIN_TEMPERATURE..=defaults::MAX_TEMPERATURE).contains(&t)
        {
            return Err(RouteError::usage(format!(
                "--temperature must be between {} and {}, got {t}",
                defaults::MIN_TEMPERATURE,
                defaults::MAX_TEMPERATURE
            )));
        }

        if let Some(language) = &self.language
            && !is_iso_639_1(language)
        {
            return Err(RouteError::usage(format!(
                "--language must be a two-letter ISO-639-1 code, got '{language}'"
            )));
        }

        if self.probe_seconds == Some(0) {
            return Err(RouteError::usage("--probe-seconds must be greater than 0"));
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(RouteError::usage("--timeout must be greater than 0"));
        }

        Ok(())
    }

    /// Fold flags into the loaded configuration. Flags win.
    pub fn apply_to(&self, config: &mut Config) {
        let t = &mut config.transcription;
        if self.language_routing {
            t.language_routing = true;
        }
        if let Some(seconds) = self.probe_seconds {
            t.probe_seconds = seconds;
        }
        if let Some(model) = &self.model {
            t.model = model.clone();
        }
        if let Some(model) = &self.detect_model {
            t.detect_model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            t.temperature = temperature;
        }
        if self.no_probe {
            config.probe.enabled = false;
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_secs = timeout.as_secs().max(1);
        }
        if let Some(dir) = &self.log_dir {
            config.logging.log_dir = dir.clone();
        }
        if self.enable_file_logging {
            config.logging.file_logging = true;
        }
    }

    /// Run options for this invocation, on top of `config`.
    pub fn run_options(&self, config: &Config) -> RunOptions {
        RunOptions {
            language: self.language.as_ref().map(|l| l.to_lowercase()),
            dry_run: self.dry_run,
            ..RunOptions::from_config(config)
        }
    }
}

fn is_iso_639_1(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["langroute", "clip.mp3"]).unwrap();
        assert_eq!(cli.audio, vec![PathBuf::from("clip.mp3")]);
        assert!(!cli.language_routing);
        assert!(cli.language.is_none());
        assert!(cli.probe_seconds.is_none());
        assert!(!cli.no_probe);
        assert!(cli.model.is_none());
        assert!(cli.temperature.is_none());
        assert!(cli.out.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.debug);
        assert!(!cli.quiet);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_audio_is_required() {
        assert!(Cli::try_parse_from(["langroute"]).is_err());
    }

    #[test]
    fn test_parse_multiple_files() {
        let cli = Cli::try_parse_from(["langroute", "a.mp3", "b.wav", "c.m4a"]).unwrap();
        assert_eq!(cli.audio.len(), 3);
    }

    #[test]
    fn test_parse_with_options() {
        let cli = Cli::try_parse_from([
            "langroute",
            "--language-routing",
            "--probe-seconds",
            "10",
            "--no-probe",
            "--model",
            "whisper-1",
            "--detect-model",
            "whisper-1",
            "--temperature",
            "0.2",
            "--out",
            "result.json",
            "--dry-run",
            "clip.mp3",
        ])
        .unwrap();

        assert!(cli.language_routing);
        assert_eq!(cli.probe_seconds, Some(10));
        assert!(cli.no_probe);
        assert_eq!(cli.model.as_deref(), Some("whisper-1"));
        assert_eq!(cli.temperature, Some(0.2));
        assert_eq!(cli.out, Some(PathBuf::from("result.json")));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_debug_aliases() {
        for flag in ["-v", "--debug", "--verbose"] {
            let cli = Cli::try_parse_from(["langroute", flag, "a.mp3"]).unwrap();
            assert!(cli.debug, "{flag}");
        }
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("90"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_timeout("90s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_timeout("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_timeout("1m30s"), Ok(Duration::from_secs(90)));
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_validate_temperature_range() {
        for bad in ["1.5", "-0.1"] {
            let cli =
                Cli::try_parse_from(["langroute", "--temperature", bad, "a.mp3"]).unwrap();
            let err = cli.validate().unwrap_err();
            assert_eq!(err.exit_code(), 1);
        }
        for good in ["0", "0.5", "1.0"] {
            let cli =
                Cli::try_parse_from(["langroute", "--temperature", good, "a.mp3"]).unwrap();
            assert!(cli.validate().is_ok());
        }
    }

    #[test]
    fn test_negative_temperature_reaches_validation() {
        let cli = Cli::try_parse_from(["langroute", "--temperature", "-0.1", "a.mp3"]).unwrap();
        assert_eq!(cli.temperature, Some(-0.1));
        assert_eq!(cli.audio, vec![PathBuf::from("a.mp3")]);

        let err = cli.validate().unwrap_err();
        assert!(matches!(err, RouteError::Usage { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_out_of_range_config_fails_after_merge() {
        let cli = Cli::try_parse_from(["langroute", "a.mp3"]).unwrap();
        let mut config = Config::default();
        config.transcription.temperature = 5.0;
        cli.apply_to(&mut config);
        assert!(cli.validate().is_ok());
        assert_eq!(config.validate().unwrap_err().exit_code(), 1);

        // A valid flag repairs a bad file value.
        let cli = Cli::try_parse_from(["langroute", "--temperature", "0.3", "a.mp3"]).unwrap();
        cli.apply_to(&mut config);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_language_code() {
        let cli = Cli::try_parse_from(["langroute", "--language", "english", "a.mp3"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["langroute", "--language", "PT", "a.mp3"]).unwrap();
        assert!(cli.validate().is_ok());
        let options = cli.run_options(&Config::default());
        assert_eq!(options.language.as_deref(), Some("pt"));
    }

    #[test]
    fn test_validate_probe_seconds() {
        let cli = Cli::try_parse_from(["langroute", "--probe-seconds", "0", "a.mp3"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_apply_overrides_config() {
        let cli = Cli::try_parse_from([
            "langroute",
            "--language-routing",
            "--no-probe",
            "--model",
            "whisper-1",
            "--timeout",
            "90s",
            "--enable-file-logging",
            "--log-dir",
            "/tmp/lr-logs",
            "a.mp3",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert!(config.transcription.language_routing);
        assert!(!config.probe.enabled);
        assert_eq!(config.transcription.model, "whisper-1");
        assert_eq!(config.api.timeout_secs, 90);
        assert!(config.logging.file_logging);
        assert_eq!(config.logging.log_dir, PathBuf::from("/tmp/lr-logs"));

        let options = cli.run_options(&config);
        assert!(options.language_routing);
        assert!(!options.use_probe);
        assert_eq!(options.model, "whisper-1");
        assert_eq!(options.detect_model, defaults::DETECT_MODEL);
    }

    #[test]
    fn test_flags_leave_config_when_absent() {
        let cli = Cli::try_parse_from(["langroute", "a.mp3"]).unwrap();
        let mut config = Config::default();
        config.transcription.language_routing = true;
        config.transcription.probe_seconds = 12;
        cli.apply_to(&mut config);
        assert!(config.transcription.language_routing);
        assert_eq!(config.transcription.probe_seconds, 12);
    }
}
