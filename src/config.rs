use crate::defaults;
use crate::error::{Result, RouteError};
use crate::routing::classifier::KeywordTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub transcription: TranscriptionConfig,
    pub probe: ProbeConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Model and routing defaults for each run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model: String,
    pub detect_model: String,
    pub temperature: f32,
    pub probe_seconds: u32,
    pub language_routing: bool,
}

/// External probing tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    pub enabled: bool,
    pub tool: String,
    pub sample_rate: u32,
    pub channels: u8,
}

/// Transcription API client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub file_logging: bool,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: defaults::MAIN_MODEL.to_string(),
            detect_model: defaults::DETECT_MODEL.to_string(),
            temperature: defaults::TEMPERATURE,
            probe_seconds: defaults::PROBE_SECONDS,
            language_routing: defaults::LANGUAGE_ROUTING,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tool: defaults::PROBE_TOOL.to_string(),
            sample_rate: defaults::PROBE_SAMPLE_RATE,
            channels: defaults::PROBE_CHANNELS,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            timeout_secs: defaults::API_TIMEOUT_SECS,
            max_retries: defaults::API_MAX_RETRIES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(defaults::LOG_DIR),
            file_logging: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LANGROUTE_MODEL → transcription.model
    /// - LANGROUTE_DETECT_MODEL → transcription.detect_model
    /// - LANGROUTE_PROBE_TOOL → probe.tool
    /// - OPENAI_BASE_URL → api.base_url
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("LANGROUTE_MODEL")
            && !model.is_empty()
        {
            self.transcription.model = model;
        }

        if let Ok(model) = std::env::var("LANGROUTE_DETECT_MODEL")
            && !model.is_empty()
        {
            self.transcription.detect_model = model;
        }

        if let Ok(tool) = std::env::var("LANGROUTE_PROBE_TOOL")
            && !tool.is_empty()
        {
            self.probe.tool = tool;
        }

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL")
            && !base_url.is_empty()
        {
            self.api.base_url = base_url;
        }

        self
    }

    /// Reject out-of-range values, whether they came from the file or flags.
    ///
    /// Runs on the merged configuration so nothing invalid reaches the
    /// engine or the probe tool.
    pub fn validate(&self) -> Result<()> {
        let t = &self.transcription;
        if !(defaults::MIN_TEMPERATURE..=defaults::MAX_TEMPERATURE).contains(&t.temperature) {
            return Err(RouteError::usage(format!(
                "temperature must be between {} and {}, got {}",
                defaults::MIN_TEMPERATURE,
                defaults::MAX_TEMPERATURE,
                t.temperature
            )));
        }

        if t.probe_seconds == 0 {
            return Err(RouteError::usage("probe_seconds must be greater than 0"));
        }

        if self.api.timeout_secs == 0 {
            return Err(RouteError::usage("api.timeout_secs must be greater than 0"));
        }

        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/langroute/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("langroute").join("config.toml"))
    }
}

/// Immutable reference data shared by every pipeline stage.
///
/// Built once at start-up and passed by reference; nothing mutates it
/// after construction.
#[derive(Debug, Clone)]
pub struct Settings {
    extensions: Vec<String>,
    keywords: KeywordTable,
    pub probe_tool: String,
    pub probe_sample_rate: u32,
    pub probe_channels: u8,
}

impl Settings {
    pub fn new(extensions: &[&str], keywords: KeywordTable, probe: &ProbeConfig) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            keywords,
            probe_tool: probe.tool.clone(),
            probe_sample_rate: probe.sample_rate,
            probe_channels: probe.channels,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &defaults::SUPPORTED_EXTENSIONS,
            KeywordTable::builtin(),
            &config.probe,
        )
    }

    /// Allowed extensions, lowercase and without the leading dot, in order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    /// Check an extension against the allow-list.
    ///
    /// Comparison is case-insensitive and a leading dot is optional.
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let ext = normalize_extension(extension);
        !ext.is_empty() && self.extensions.contains(&ext)
    }

    /// Allowed extensions formatted for messages, e.g. ".mp3, .m4a, .wav".
    pub fn allowed_display(&self) -> String {
        self.extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}
