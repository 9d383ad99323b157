use crate::defaults;
use crate::error::Result;
use crate::stt::{TranscriptionEngine, TranscriptionRequest};
use std::path::Path;

/// Transcribes probe audio with the cheap detection model.
///
/// Never forces a language and always decodes at the minimum temperature.
pub struct ProbeTranscriber<'a> {
    engine: &'a dyn TranscriptionEngine,
    model: &'a str,
}

impl<'a> ProbeTranscriber<'a> {
    pub fn new(engine: &'a dyn TranscriptionEngine, model: &'a str) -> Self {
        Self { engine, model }
    }

    pub async fn transcribe(&self, audio: &Path) -> Result<String> {
        let request = TranscriptionRequest {
            audio_path: audio,
            model: self.model,
            language: None,
            temperature: defaults::MIN_TEMPERATURE,
        };
        let transcript = self.engine.transcribe_normalized(&request).await?;
        log::debug!(
            "Probe transcription ({} chars) from {}",
            transcript.text.chars().count(),
            self.model
        );
        Ok(transcript.text)
    }
}
