//! Per-file transcription pipeline.
//!
//! validate → route → transcribe (full file) → assemble
//!
//! Stages run strictly in sequence. Only the full transcription can fail
//! after validation; routing problems are folded into the decision.

use crate::config::Settings;
use crate::error::Result;
use crate::input::{AudioInput, validate_audio_file};
use crate::options::RunOptions;
use crate::result::{TranscriptionResult, assemble, dry_run_result};
use crate::routing::{CommandExecutor, LanguageSource, Router, RoutingDecision};
use crate::stt::{Transcript, TranscriptionEngine, TranscriptionRequest};
use std::path::Path;

/// Transcribe the whole file with the primary model.
///
/// # Errors
///
/// Any engine error; these are fatal for the file.
pub async fn transcribe_full(
    engine: &dyn TranscriptionEngine,
    input: &AudioInput,
    language: Option<&str>,
    options: &RunOptions,
) -> Result<Transcript> {
    let request = TranscriptionRequest {
        audio_path: input.path(),
        model: &options.model,
        language,
        temperature: options.temperature,
    };
    log::info!(
        "Transcribing {} with {} (language: {})",
        input.path().display(),
        options.model,
        language.unwrap_or("auto")
    );
    engine.transcribe_normalized(&request).await
}

pub struct Pipeline<'a, E: CommandExecutor> {
    engine: &'a dyn TranscriptionEngine,
    router: Router<'a, E>,
    settings: &'a Settings,
}

impl<'a, E: CommandExecutor> Pipeline<'a, E> {
    pub fn new(engine: &'a dyn TranscriptionEngine, executor: E, settings: &'a Settings) -> Self {
        Self {
            engine,
            router: Router::new(engine, executor, settings),
            settings,
        }
    }

    /// Validate `path` and run it through the pipeline.
    pub async fn run(&self, path: &Path, options: &RunOptions) -> Result<TranscriptionResult> {
        let input = validate_audio_file(path, self.settings)?;
        self.run_validated(&input, options).await
    }

    pub async fn run_validated(
        &self,
        input: &AudioInput,
        options: &RunOptions,
    ) -> Result<TranscriptionResult> {
        let decision = self.router.route(input, options).await;
        let transcript =
            transcribe_full(self.engine, input, decision.forced_language(), options).await?;
        log_language_outcome(&decision, options);
        Ok(assemble(transcript, &decision, options, input))
    }
}

/// Build the result a real run would produce without calling anything.
///
/// Probe tool availability is looked up on `PATH` rather than executed.
pub fn dry_run(
    input: &AudioInput,
    options: &RunOptions,
    settings: &Settings,
) -> TranscriptionResult {
    log::info!("[DRY RUN] File validation: OK ({})", input.path().display());

    let routes = options.language_routing && options.language.is_none();
    let tool_available = routes && options.use_probe && probe_tool_on_path(&settings.probe_tool);
    if routes && options.use_probe {
        log::info!(
            "[DRY RUN] {} available: {}",
            settings.probe_tool,
            if tool_available { "yes" } else { "no" }
        );
    }

    log::info!("[DRY RUN] API calls that would be made:");
    if routes {
        log::info!(
            "[DRY RUN]   1. language detection with {} on the first {}s",
            options.detect_model,
            options.probe_seconds
        );
    }
    log::info!(
        "[DRY RUN]   {}. transcription with {} (language: {}, temperature: {})",
        if routes { 2 } else { 1 },
        options.model,
        options.language.as_deref().unwrap_or(if routes { "routed" } else { "auto" }),
        options.temperature
    );

    dry_run_result(input, options, tool_available)
}

fn probe_tool_on_path(tool: &str) -> bool {
    which::which(tool).is_ok()
}

fn log_language_outcome(decision: &RoutingDecision, options: &RunOptions) {
    match decision.source {
        LanguageSource::Explicit => {}
        LanguageSource::Routed => {
            if let Some(language) = decision.forced_language() {
                log::info!("Language routing enabled: detected '{language}'");
            }
        }
        LanguageSource::Auto if options.language_routing => {
            log::info!("Language routing enabled but detection failed; engine will auto-detect");
        }
        LanguageSource::Auto => {
            log::info!("Language routing disabled; the engine will auto-detect language");
        }
    }
}
