//! OpenAI-compatible `/audio/transcriptions` client.

use crate::config::ApiConfig;
use crate::defaults;
use crate::error::{Result, RouteError};
use crate::stt::engine::{EngineResponse, TranscriptionEngine, TranscriptionRequest};
use async_trait::async_trait;
use reqwest::{StatusCode, multipart};
use std::path::Path;
use std::time::Duration;

/// Base delay between retries, doubled on each attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

pub struct OpenAiEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
}

impl std::fmt::Debug for OpenAiEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEngine")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl OpenAiEngine {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RouteError::Transport {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    /// Build from config, reading the key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `ApiKeyMissing` if the variable is unset or blank.
    pub fn from_env(api: &ApiConfig) -> Result<Self> {
        let api_key = std::env::var(defaults::API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RouteError::ApiKeyMissing {
                env: defaults::API_KEY_ENV.to_string(),
            })?;

        Self::new(
            api_key,
            api.base_url.clone(),
            Duration::from_secs(api.timeout_secs),
            api.max_retries,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    fn build_form(
        &self,
        request: &TranscriptionRequest<'_>,
        audio: Vec<u8>,
    ) -> Result<multipart::Form> {
        let file_name = request
            .audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let file_part = multipart::Part::bytes(audio)
            .file_name(file_name)
            .mime_str(mime_for(request.audio_path))
            .map_err(|e| RouteError::Transport {
                message: format!("mime: {e}"),
            })?;

        let mut form = multipart::Form::new()
            .text("model", request.model.to_string())
            .text("temperature", request.temperature.to_string())
            .text("response_format", "json")
            .part("file", file_part);

        if let Some(language) = request.language {
            form = form.text("language", language.to_string());
        }

        Ok(form)
    }

    async fn send_once(&self, request: &TranscriptionRequest<'_>, audio: Vec<u8>) -> Attempt {
        let form = match self.build_form(request, audio) {
            Ok(form) => form,
            Err(e) => return Attempt::Fatal(e),
        };

        let response = match self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Retry(RouteError::Transport {
                    message: format!("request: {e}"),
                });
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Attempt::Retry(RouteError::Transport {
                    message: format!("body: {e}"),
                });
            }
        };

        if status.is_success() {
            return Attempt::Done(parse_body(body));
        }

        let message = error_message(&body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Attempt::Fatal(RouteError::Authentication { message })
            }
            s if s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error() => {
                Attempt::Retry(RouteError::EngineRejected {
                    status: s.as_u16(),
                    message,
                })
            }
            s => Attempt::Fatal(RouteError::EngineRejected {
                status: s.as_u16(),
                message,
            }),
        }
    }
}

enum Attempt {
    Done(EngineResponse),
    Retry(RouteError),
    Fatal(RouteError),
}

#[async_trait]
impl TranscriptionEngine for OpenAiEngine {
    async fn transcribe(&self, request: &TranscriptionRequest<'_>) -> Result<EngineResponse> {
        let audio = tokio::fs::read(request.audio_path)
            .await
            .map_err(|e| RouteError::FileUnreadable {
                path: request.audio_path.display().to_string(),
                reason: e.to_string(),
            })?;

        log::debug!(
            "Sending {} ({} bytes) to {} with model {} language {}",
            request.audio_path.display(),
            audio.len(),
            self.endpoint(),
            request.model,
            request.language.unwrap_or("auto")
        );

        let mut attempt = 0;
        loop {
            match self.send_once(request, audio.clone()).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Fatal(e) => return Err(e),
                Attempt::Retry(e) if attempt >= self.max_retries => return Err(e),
                Attempt::Retry(e) => {
                    let delay = RETRY_BASE_DELAY * 2u32.saturating_pow(attempt);
                    log::warn!(
                        "Transcription attempt {} failed: {e}; retrying in {}",
                        attempt + 1,
                        humantime::format_duration(delay)
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn parse_body(body: String) -> EngineResponse {
    match serde_json::from_str(&body) {
        Ok(value) => EngineResponse::Json(value),
        Err(_) => EngineResponse::Text(body),
    }
}

/// Pull `error.message` out of an API error body, or fall back to the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no error details".to_string()
            } else {
                trimmed.to_string()
            }
        })
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}
