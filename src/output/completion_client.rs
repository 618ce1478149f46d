//! HTTP client for sending chunks to a chat-completions endpoint.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::note::{Note, DEFAULT_NOTE_PROMPT};
use crate::types::{Chunk, CompletionSettings};

/// System prompt used by the `organize` command.
pub const DEFAULT_ORGANIZE_PROMPT: &str = "You are an experienced non-fiction writer. \
Rewrite the text you are given into a clear, well-structured Markdown article. \
Keep every fact, number and example from the source and do not invent new ones. \
A section headed by a context label repeats the end of the previous part for \
continuity only; do not rewrite it.";

/// Organized text for a run of chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organized {
    /// Whether the completion service answered the health check
    pub available: bool,
    /// One entry per chunk, in chunk order
    pub parts: Vec<String>,
}

impl Organized {
    /// All parts joined into one document.
    pub fn text(&self) -> String {
        self.parts.join("\n\n")
    }
}

/// Client for an OpenAI-compatible chat completions API.
pub struct CompletionClient {
    client: Client,
    settings: CompletionSettings,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Request payload for one chunk.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Response from the completions endpoint.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

impl CompletionClient {
    /// Create a new completion client.
    pub fn new(settings: CompletionSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, settings })
    }

    /// Settings this client was built with.
    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Package one piece of text as a chat request.
    pub fn build_request(&self, system_prompt: &str, content: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(content)],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Send one piece of text and return the generated reply.
    pub async fn complete(&self, system_prompt: &str, content: &str) -> Result<String> {
        let request = self.build_request(system_prompt, content);

        let mut builder = self.client.post(&self.settings.api_url).json(&request);
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if response.status().is_success() {
            let result: CompletionResponse = response.json().await?;
            result
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content.trim().to_string())
                .ok_or_else(|| anyhow!("Completion service returned no choices"))
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(anyhow!("Completion service returned {}: {}", status, text))
        }
    }

    /// Send every chunk in order.
    ///
    /// A chunk that fails keeps its body in the output so the assembled
    /// result never loses text. Carried context headers are not repeated.
    pub async fn complete_all(&self, system_prompt: &str, chunks: &[Chunk]) -> Vec<String> {
        info!(chunk_count = chunks.len(), "Sending chunks to completion service");

        let mut results = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            match self.complete(system_prompt, &chunk.content).await {
                Ok(reply) => {
                    debug!(chunk_index = chunk.chunk_index, "Chunk completed");
                    results.push(reply);
                }
                Err(e) => {
                    warn!(
                        chunk_index = chunk.chunk_index,
                        error = %e,
                        "Completion failed, keeping original content"
                    );
                    results.push(chunk.body());
                }
            }
        }

        results
    }

    /// Organize every chunk, skipping the service entirely when it is down.
    ///
    /// When the health check fails the chunk bodies are returned unchanged
    /// without sending anything.
    pub async fn organize(&self, system_prompt: &str, chunks: &[Chunk]) -> Result<Organized> {
        if !self.health_check().await? {
            warn!(
                api_url = %self.settings.api_url,
                "Completion service unavailable, keeping chunks unchanged"
            );
            return Ok(Organized {
                available: false,
                parts: chunks.iter().map(Chunk::body).collect(),
            });
        }

        Ok(Organized {
            available: true,
            parts: self.complete_all(system_prompt, chunks).await,
        })
    }

    /// Turn organized text into a note with a title and hashtags.
    ///
    /// Falls back to a plain note holding the text when the request fails.
    pub async fn convert_to_note(&self, content: &str) -> Note {
        match self.complete(DEFAULT_NOTE_PROMPT, content).await {
            Ok(reply) => {
                let note = Note::from_reply(&reply);
                info!(title = ?note.title, tags = note.tags.len(), "Converted content to note");
                note
            }
            Err(e) => {
                warn!(error = %e, "Note conversion failed, keeping original content");
                Note::plain(content)
            }
        }
    }

    /// Check if the completion endpoint answers a trivial request.
    pub async fn health_check(&self) -> Result<bool> {
        match self.complete("Reply with OK.", "test").await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Completion service health check failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkKind, ContextHeader};

    fn settings(api_url: &str) -> CompletionSettings {
        CompletionSettings {
            api_url: api_url.to_string(),
            api_key: Some("secret".to_string()),
            model: "test-model".to_string(),
            temperature: 0.3,
            max_tokens: 256,
            timeout_secs: 1,
        }
    }

    #[test]
    fn test_build_request() {
        let client = CompletionClient::new(settings("http://localhost:9")).unwrap();
        let request = client.build_request("Be brief.", "Chunk text.");

        assert_eq!(request.model, "test-model");
        assert_eq!(request.max_tokens, 256);
        assert_eq!(
            request.messages,
            vec![ChatMessage::system("Be brief."), ChatMessage::user("Chunk text.")]
        );

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Chunk text.");
    }

    #[test]
    fn test_settings_hide_api_key() {
        let json = serde_json::to_value(settings("http://localhost:9")).unwrap();
        assert!(json.get("api_key").is_none());
    }

    #[tokio::test]
    async fn test_complete_all_falls_back_to_original() {
        // Nothing listens on the discard port, so every request fails fast
        let client = CompletionClient::new(settings("http://127.0.0.1:9/v1/chat")).unwrap();
        let chunks = vec![
            Chunk::new(0, ChunkKind::Paragraphs, None, vec!["first".to_string()]),
            Chunk::new(1, ChunkKind::Sentences, None, vec!["second".to_string()]),
        ];

        let results = client.complete_all(DEFAULT_ORGANIZE_PROMPT, &chunks).await;

        assert_eq!(results, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_organize_skips_unavailable_service() {
        let client = CompletionClient::new(settings("http://127.0.0.1:9/v1/chat")).unwrap();
        let header = ContextHeader::new("Previous context:", "first");
        let chunks = vec![
            Chunk::new(0, ChunkKind::Paragraphs, None, vec!["first".to_string()]),
            Chunk::new(
                1,
                ChunkKind::Paragraphs,
                Some(header),
                vec!["second".to_string(), "third".to_string()],
            ),
        ];

        let organized = client.organize(DEFAULT_ORGANIZE_PROMPT, &chunks).await.unwrap();

        assert!(!organized.available);
        assert_eq!(organized.parts, vec!["first", "second\n\nthird"]);
        assert_eq!(organized.text(), "first\n\nsecond\n\nthird");
    }

    #[tokio::test]
    async fn test_convert_to_note_falls_back_to_plain() {
        let client = CompletionClient::new(settings("http://127.0.0.1:9/v1/chat")).unwrap();
        let note = client.convert_to_note("Organized text.").await;
        assert_eq!(note, Note::plain("Organized text."));
    }
}
