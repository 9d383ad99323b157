use crate::error::{Result, RouteError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One transcription call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranscriptionRequest<'a> {
    pub audio_path: &'a Path,
    pub model: &'a str,
    /// ISO-639-1 code to force, or `None` for engine auto-detection.
    pub language: Option<&'a str>,
    pub temperature: f32,
}

/// Raw engine reply, before normalization.
///
/// Engines answer either with a JSON document or with a text body that may
/// itself be JSON or a bare transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineResponse {
    Json(Value),
    Text(String),
}

/// Canonical transcription: the text plus every other field the engine sent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    pub text: String,
    pub fields: Map<String, Value>,
}

/// Field names owned by the result envelope; engine values are dropped.
const RESERVED_FIELDS: [&str; 2] = ["text", "_meta"];

/// Normalize any engine reply shape into a [`Transcript`].
///
/// This is the only place that inspects response shapes.
pub fn normalize_response(response: EngineResponse) -> Result<Transcript> {
    match response {
        EngineResponse::Json(Value::Object(mut map)) => {
            let text = match map.remove("text") {
                Some(Value::String(text)) => text,
                Some(other) => {
                    return Err(RouteError::MalformedResponse {
                        message: format!("'text' is not a string: {other}"),
                    });
                }
                None => {
                    return Err(RouteError::MalformedResponse {
                        message: "response has no 'text' field".to_string(),
                    });
                }
            };
            for key in RESERVED_FIELDS {
                map.remove(key);
            }
            Ok(Transcript { text, fields: map })
        }
        EngineResponse::Json(Value::String(text)) => Ok(Transcript {
            text,
            fields: Map::new(),
        }),
        EngineResponse::Json(other) => Err(RouteError::MalformedResponse {
            message: format!("unexpected response shape: {other}"),
        }),
        EngineResponse::Text(body) => match serde_json::from_str::<Value>(&body) {
            Ok(value @ (Value::Object(_) | Value::String(_))) => {
                normalize_response(EngineResponse::Json(value))
            }
            _ => Ok(Transcript {
                text: body.trim().to_string(),
                fields: Map::new(),
            }),
        },
    }
}

/// Speech-to-text engine reachable over the network.
///
/// Injected into the pipeline so it can be swapped for [`MockEngine`].
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, request: &TranscriptionRequest<'_>) -> Result<EngineResponse>;

    /// Transcribe and normalize in one step.
    async fn transcribe_normalized(
        &self,
        request: &TranscriptionRequest<'_>,
    ) -> Result<Transcript> {
        normalize_response(self.transcribe(request).await?)
    }
}

#[async_trait]
impl<T: TranscriptionEngine + ?Sized> TranscriptionEngine for Arc<T> {
    async fn transcribe(&self, request: &TranscriptionRequest<'_>) -> Result<EngineResponse> {
        (**self).transcribe(request).await
    }
}

/// A call seen by [`MockEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub audio_path: PathBuf,
    pub audio_existed: bool,
    pub model: String,
    pub language: Option<String>,
    pub temperature: f32,
}

/// Mock engine for testing.
///
/// Replies per model: queued responses first, then the model's fixed
/// response, then `{"text": "mock transcription"}`.
#[derive(Debug, Default)]
pub struct MockEngine {
    calls: Mutex<Vec<RecordedCall>>,
    fixed: HashMap<String, EngineResponse>,
    queued: Mutex<HashMap<String, VecDeque<EngineResponse>>>,
    failing: Vec<String>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `model` with plain text.
    pub fn with_text(mut self, model: &str, text: &str) -> Self {
        self.fixed
            .insert(model.to_string(), EngineResponse::Text(text.to_string()));
        self
    }

    /// Always answer `model` with a JSON document.
    pub fn with_json(mut self, model: &str, value: Value) -> Self {
        self.fixed
            .insert(model.to_string(), EngineResponse::Json(value));
        self
    }

    /// Answer the next call for `model` with `response`, once.
    pub fn with_queued(self, model: &str, response: EngineResponse) -> Self {
        if let Ok(mut queued) = self.queued.lock() {
            queued
                .entry(model.to_string())
                .or_default()
                .push_back(response);
        }
        self
    }

    /// Fail every call for `model` with a transport error.
    pub fn with_failure(mut self, model: &str) -> Self {
        self.failing.push(model.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls_for(&self, model: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.model == model)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TranscriptionEngine for MockEngine {
    async fn transcribe(&self, request: &TranscriptionRequest<'_>) -> Result<EngineResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                audio_path: request.audio_path.to_path_buf(),
                audio_existed: request.audio_path.exists(),
                model: request.model.to_string(),
                language: request.language.map(str::to_string),
                temperature: request.temperature,
            });
        }

        if self.failing.iter().any(|m| m == request.model) {
            return Err(RouteError::Transport {
                message: "mock engine failure".to_string(),
            });
        }

        let queued = self
            .queued
            .lock()
            .ok()
            .and_then(|mut q| q.get_mut(request.model).and_then(VecDeque::pop_front));
        if let Some(response) = queued {
            return Ok(response);
        }

        let fallback = || EngineResponse::Json(serde_json::json!({"text": "mock transcription"}));
        Ok(self.fixed.get(request.model).cloned().unwrap_or_else(fallback))
    }
}
