//! Result envelope: transcript text, engine fields and the `_meta` block.

use crate::defaults;
use crate::input::AudioInput;
use crate::options::RunOptions;
use crate::routing::RoutingDecision;
use crate::stt::Transcript;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provenance of one transcription.
///
/// Real and dry runs fill the same fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub language_routing_enabled: bool,
    pub routed_language: Option<String>,
    pub forced_language: Option<String>,
    pub probe_used: bool,
    pub probe_seconds: u32,
    pub model: String,
    pub detect_model: String,
    pub temperature: f32,
    pub source_file: String,
    pub dry_run: bool,
    pub routing_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

impl TranscriptionResult {
    /// Pretty-printed JSON, non-ASCII kept as-is.
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn base_meta(input: &AudioInput, options: &RunOptions) -> Meta {
    Meta {
        language_routing_enabled: options.language_routing,
        routed_language: None,
        forced_language: None,
        probe_used: false,
        probe_seconds: options.probe_seconds,
        model: options.model.clone(),
        detect_model: options.detect_model.clone(),
        temperature: options.temperature,
        source_file: input.path().display().to_string(),
        dry_run: options.dry_run,
        routing_error: None,
    }
}

/// Merge a transcript and its routing decision into the result envelope.
pub fn assemble(
    transcript: Transcript,
    decision: &RoutingDecision,
    options: &RunOptions,
    input: &AudioInput,
) -> TranscriptionResult {
    let meta = Meta {
        routed_language: decision.routed_language().map(str::to_string),
        forced_language: decision.forced_language().map(str::to_string),
        probe_used: decision.probe_used,
        routing_error: decision.routing_error.clone(),
        ..base_meta(input, options)
    };

    TranscriptionResult {
        text: transcript.text,
        fields: transcript.fields,
        meta,
    }
}

/// The result a real run would produce, minus anything only the engine knows.
///
/// `tool_available` decides `probe_used` the way a real run would.
pub fn dry_run_result(
    input: &AudioInput,
    options: &RunOptions,
    tool_available: bool,
) -> TranscriptionResult {
    let routes = options.language_routing && options.language.is_none();
    let meta = Meta {
        forced_language: options.language.clone(),
        probe_used: routes && options.use_probe && tool_available,
        ..base_meta(input, options)
    };

    TranscriptionResult {
        text: defaults::DRY_RUN_TEXT.to_string(),
        fields: Map::new(),
        meta,
    }
}
