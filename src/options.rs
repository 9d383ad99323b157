use crate::config::Config;

/// Per-run choices, resolved from config then CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub language_routing: bool,
    /// Explicit ISO-639-1 code; bypasses routing when set.
    pub language: Option<String>,
    pub use_probe: bool,
    pub probe_seconds: u32,
    pub model: String,
    pub detect_model: String,
    pub temperature: f32,
    pub dry_run: bool,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        let t = &config.transcription;
        Self {
            language_routing: t.language_routing,
            language: None,
            use_probe: config.probe.enabled,
            probe_seconds: t.probe_seconds,
            model: t.model.clone(),
            detect_model: t.detect_model.clone(),
            temperature: t.temperature,
            dry_run: false,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
