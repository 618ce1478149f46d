//! Configuration types for chunking.

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;
use crate::{
    CONTEXT_HEADER_OVERHEAD, DEFAULT_BATCH_CONCURRENCY, DEFAULT_CONTEXT_LABEL, DEFAULT_MAX_CHARS,
    DEFAULT_PORT,
};

/// Global service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP port for the `serve` command
    pub port: u16,

    /// Default per-chunk character budget
    pub default_max_chars: usize,

    /// Budget charged for a context header on top of the carried paragraph
    pub context_overhead: usize,

    /// Label printed above a carried paragraph
    pub context_label: String,

    /// Whether to carry the previous chunk's last paragraph forward
    pub carry_context: bool,

    /// Maximum documents chunked concurrently in a batch
    pub batch_concurrency: usize,

    /// Settings for the downstream completion endpoint
    pub completion: CompletionSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            default_max_chars: DEFAULT_MAX_CHARS,
            context_overhead: CONTEXT_HEADER_OVERHEAD,
            context_label: DEFAULT_CONTEXT_LABEL.to_string(),
            carry_context: true,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            completion: CompletionSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT").unwrap_or(DEFAULT_PORT),
            default_max_chars: env_parse("MAX_CHARS").unwrap_or(DEFAULT_MAX_CHARS),
            context_overhead: env_parse("CONTEXT_OVERHEAD").unwrap_or(CONTEXT_HEADER_OVERHEAD),
            context_label: std::env::var("CONTEXT_LABEL")
                .unwrap_or_else(|_| DEFAULT_CONTEXT_LABEL.to_string()),
            carry_context: env_parse("CARRY_CONTEXT").unwrap_or(true),
            batch_concurrency: env_parse("BATCH_CONCURRENCY").unwrap_or(DEFAULT_BATCH_CONCURRENCY),
            completion: CompletionSettings::from_env(),
        }
    }

    /// Chunk configuration derived from the service defaults.
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            max_chars: self.default_max_chars,
            context_overhead: self.context_overhead,
            context_label: self.context_label.clone(),
            carry_context: self.carry_context,
        }
    }

    /// Service defaults with an optional per-request budget.
    ///
    /// Rejects a zero or negative override before any work starts.
    pub fn chunk_config_for(&self, max_chars: Option<i64>) -> Result<ChunkConfig, ChunkError> {
        let mut config = self.chunk_config();
        if let Some(max_chars) = max_chars {
            config.max_chars = ChunkConfig::from_budget(max_chars)?.max_chars;
        }
        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Configuration for individual chunk operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum characters per chunk
    pub max_chars: usize,

    /// Fixed cost charged for the context header wording.
    ///
    /// This is a tunable constant, not the literal length of the label.
    pub context_overhead: usize,

    /// Label printed above a carried paragraph
    pub context_label: String,

    /// Whether to prepend the previous chunk's last paragraph
    pub carry_context: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            context_overhead: CONTEXT_HEADER_OVERHEAD,
            context_label: DEFAULT_CONTEXT_LABEL.to_string(),
            carry_context: true,
        }
    }
}

impl ChunkConfig {
    /// Create a config with the given character budget.
    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars,
            ..Default::default()
        }
    }

    /// Create a config from a signed budget, rejecting zero and negatives.
    pub fn from_budget(max_chars: i64) -> Result<Self, ChunkError> {
        if max_chars <= 0 {
            return Err(ChunkError::invalid_budget(max_chars));
        }
        let max_chars =
            usize::try_from(max_chars).map_err(|_| ChunkError::invalid_budget(max_chars))?;
        Ok(Self::with_max_chars(max_chars))
    }

    /// Set the context header label.
    pub fn with_context_label(mut self, label: &str) -> Self {
        self.context_label = label.to_string();
        self
    }

    /// Set the context header overhead.
    pub fn with_context_overhead(mut self, overhead: usize) -> Self {
        self.context_overhead = overhead;
        self
    }

    /// Disable context carry-over.
    pub fn without_context(mut self) -> Self {
        self.carry_context = false;
        self
    }

    /// Check the budget before any chunking work starts.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.max_chars == 0 {
            return Err(ChunkError::invalid_budget(0));
        }
        Ok(())
    }
}

/// Settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Full URL of the chat completions endpoint
    pub api_url: String,

    /// Bearer token, if the endpoint needs one
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens per request
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            api_key: None,
            model: "google/gemma-2-9b-it:free".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            timeout_secs: 120,
        }
    }
}

impl CompletionSettings {
    /// Load completion settings from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("COMPLETION_API_URL").unwrap_or(defaults.api_url),
            api_key: std::env::var("COMPLETION_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("COMPLETION_MODEL").unwrap_or(defaults.model),
            temperature: env_parse("COMPLETION_TEMPERATURE").unwrap_or(defaults.temperature),
            max_tokens: env_parse("COMPLETION_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            timeout_secs: env_parse("COMPLETION_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunk_config() {
        let config = ChunkConfig::default();
        assert_eq!(config.max_chars, 2000);
        assert_eq!(config.context_overhead, 20);
        assert!(config.carry_context);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_budget_rejects_non_positive() {
        assert_eq!(
            ChunkConfig::from_budget(0),
            Err(ChunkError::InvalidBudget { max_chars: 0 })
        );
        assert_eq!(
            ChunkConfig::from_budget(-3),
            Err(ChunkError::InvalidBudget { max_chars: -3 })
        );
        assert_eq!(ChunkConfig::from_budget(40).map(|c| c.max_chars), Ok(40));
    }

    #[test]
    fn test_zero_budget_fails_validation() {
        let config = ChunkConfig::with_max_chars(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = ChunkConfig::with_max_chars(100)
            .with_context_label("Context:")
            .with_context_overhead(5)
            .without_context();
        assert_eq!(config.context_label, "Context:");
        assert_eq!(config.context_overhead, 5);
        assert!(!config.carry_context);
    }

    #[test]
    fn test_service_config_chunk_view() {
        let service = ServiceConfig::default();
        assert_eq!(service.chunk_config(), ChunkConfig::default());
    }

    #[test]
    fn test_chunk_config_for_applies_override() {
        let service = ServiceConfig {
            context_label: "Context:".to_string(),
            ..Default::default()
        };

        let config = service.chunk_config_for(Some(120)).unwrap();
        assert_eq!(config.max_chars, 120);
        assert_eq!(config.context_label, "Context:");

        assert_eq!(service.chunk_config_for(None).unwrap().max_chars, 2000);
        assert_eq!(
            service.chunk_config_for(Some(-5)),
            Err(ChunkError::InvalidBudget { max_chars: -5 })
        );
    }

    #[test]
    fn test_chunk_config_for_rejects_zero_default() {
        let service = ServiceConfig {
            default_max_chars: 0,
            ..Default::default()
        };
        assert!(service.chunk_config_for(None).is_err());
    }
}
