//! langroute - Language-routed audio transcription
//!
//! Validates a recording, optionally detects its spoken language from a
//! short probe clip, transcribes it with an OpenAI-compatible engine and
//! returns the transcript with routing metadata.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod input;
pub mod logging;
pub mod options;
pub mod pipeline;
pub mod result;
pub mod routing;
pub mod stt;

// Collaborator seams
pub use routing::{CommandExecutor, SystemCommandExecutor};
pub use stt::{MockEngine, OpenAiEngine, TranscriptionEngine};

// Pipeline
pub use input::{AudioInput, validate_audio_file};
pub use options::RunOptions;
pub use pipeline::Pipeline;
pub use result::{Meta, TranscriptionResult};
pub use routing::{Router, RoutingDecision};

// Error handling
pub use error::{ErrorCategory, Result, RouteError};

// Config
pub use config::{Config, Settings};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
