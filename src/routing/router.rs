use crate::config::Settings;
use crate::input::AudioInput;
use crate::options::RunOptions;
use crate::routing::classifier::{Classification, KeywordClassifier};
use crate::routing::command::CommandExecutor;
use crate::routing::probe::ProbeTranscriber;
use crate::routing::sampler::{ProbeResult, Sampler};
use crate::stt::TranscriptionEngine;

/// Where the forced language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    /// Supplied by the caller.
    Explicit,
    /// Chosen by the keyword classifier.
    Routed,
    /// Nothing forced; the engine auto-detects.
    Auto,
}

/// The language decision for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub language: Option<String>,
    pub source: LanguageSource,
    pub routing_attempted: bool,
    pub probe_used: bool,
    pub classification: Option<Classification>,
    pub routing_error: Option<String>,
}

impl RoutingDecision {
    pub fn explicit(language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            source: LanguageSource::Explicit,
            ..Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Self {
            language: None,
            source: LanguageSource::Auto,
            routing_attempted: false,
            probe_used: false,
            classification: None,
            routing_error: None,
        }
    }

    /// Language sent to the full transcription, if any.
    pub fn forced_language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Classifier verdict, when routing got that far and was decisive.
    pub fn routed_language(&self) -> Option<&str> {
        self.classification.as_ref().and_then(Classification::language)
    }
}

/// Composes sampling, probe transcription and keyword classification.
pub struct Router<'a, E: CommandExecutor> {
    engine: &'a dyn TranscriptionEngine,
    sampler: Sampler<E>,
    classifier: KeywordClassifier<'a>,
}

impl<'a, E: CommandExecutor> Router<'a, E> {
    pub fn new(engine: &'a dyn TranscriptionEngine, executor: E, settings: &'a Settings) -> Self {
        Self {
            engine,
            sampler: Sampler::new(executor, settings),
            classifier: KeywordClassifier::new(settings.keywords()),
        }
    }

    /// Decide which language to force for `input`.
    ///
    /// Never fails: sampling and probe failures degrade to auto-detection and
    /// are recorded in the decision. The probe clip is removed before this
    /// returns.
    pub async fn route(&self, input: &AudioInput, options: &RunOptions) -> RoutingDecision {
        if let Some(language) = options.language.as_deref() {
            log::info!("Using explicit language '{language}'; skipping language routing");
            return RoutingDecision::explicit(language);
        }

        if !options.language_routing {
            log::debug!("Language routing disabled");
            return RoutingDecision::disabled();
        }

        let probe = if options.use_probe {
            self.sampler.probe(input.path(), options.probe_seconds)
        } else {
            log::debug!("Probing disabled; detecting language from the full file");
            ProbeResult::skipped()
        };

        let transcriber = ProbeTranscriber::new(self.engine, &options.detect_model);
        let text = match transcriber.transcribe(probe.audio_path(input.path())).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Language routing failed: {e}; falling back to auto-detection");
                return RoutingDecision {
                    routing_attempted: true,
                    probe_used: probe.probe_used(),
                    routing_error: Some(e.to_string()),
                    ..RoutingDecision::disabled()
                };
            }
        };

        let classification = self.classifier.classify(&text);
        log::debug!(
            "Keyword scores: {}",
            classification
                .scores
                .iter()
                .filter(|s| s.hits > 0)
                .map(|s| format!("{}={}", s.language, s.hits))
                .collect::<Vec<_>>()
                .join(" ")
        );

        let language = classification.language().map(str::to_string);
        let source = match language {
            Some(_) => LanguageSource::Routed,
            None => LanguageSource::Auto,
        };

        RoutingDecision {
            language,
            source,
            routing_attempted: true,
            probe_used: probe.probe_used(),
            classification: Some(classification),
            routing_error: None,
        }
    }
}
