//! Speech-to-text engines.
//!
//! - `engine`: the `TranscriptionEngine` trait, response normalization and `MockEngine`
//! - `openai`: HTTP client for OpenAI-compatible transcription endpoints

pub mod engine;
pub mod openai;

pub use engine::{
    EngineResponse, MockEngine, RecordedCall, Transcript, TranscriptionEngine,
    TranscriptionRequest, normalize_response,
};
pub use openai::OpenAiEngine;
