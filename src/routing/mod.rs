//! Language routing: decide which language to force for a recording.
//!
//! ```text
//! audio ─▶ Sampler ─▶ ProbeTranscriber ─▶ KeywordClassifier ─▶ RoutingDecision
//!          (ffmpeg)   (detect model)      (keyword counts)
//! ```
//!
//! Every stage past the explicit-language check is best-effort. A missing
//! media tool falls back to the original file; an engine failure falls back
//! to engine auto-detection.

pub mod classifier;
pub mod command;
pub mod probe;
pub mod router;
pub mod sampler;

pub use classifier::{
    Classification, KeywordClassifier, KeywordTable, LanguageScore, Verdict,
    detect_language_from_text,
};
pub use command::{CommandExecutor, SystemCommandExecutor};
pub use probe::ProbeTranscriber;
pub use router::{LanguageSource, Router, RoutingDecision};
pub use sampler::{ProbeClip, ProbeResult, Sampler};
