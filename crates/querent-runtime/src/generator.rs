//! Generator implementations
//!
//! - `OfflineGenerator`: deterministic placeholder answers, no network
//! - `ChatCompletionsGenerator`: OpenAI-compatible chat completions over HTTP
//! - `FallbackGenerator`: primary generator with a secondary on failure

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use querent_config::GenerationConfig;
use querent_core::executor::log_preview;
use querent_core::{GenerationError, Generator};

const PREVIEW_CHARS: usize = 60;
const PROMPT_PREVIEW_CHARS: usize = 600;

pub const PLACEHOLDER_PREFIX: &str = "Generated Answer for: ";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Provide concise, accurate answers. \
If asked to summarize in a specific number of words, follow that constraint exactly.";

/// Placeholder answer for `prompt` without calling any model.
pub fn placeholder_answer(prompt: &str) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, prompt)
}

/// Answers with a short preview of the prompt
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

impl OfflineGenerator {
    pub fn preview(prompt: &str) -> String {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return "[Empty prompt]".to_string();
        }
        if prompt.chars().count() > PREVIEW_CHARS {
            let head: String = prompt.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            prompt.to_string()
        }
    }
}

#[async_trait]
impl Generator for OfflineGenerator {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(placeholder_answer(&Self::preview(prompt)))
    }
}

/// HTTP client config (OpenAI-compatible)
#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub system_prompt: String,
}

impl ChatCompletionsConfig {
    /// Build from config, reading the API key from `api_key_env`.
    pub fn from_generation_config(config: &GenerationConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: std::env::var(&config.api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }
}

/// Generator backed by an OpenAI-compatible chat completions endpoint
pub struct ChatCompletionsGenerator {
    client: reqwest::Client,
    config: ChatCompletionsConfig,
}

impl ChatCompletionsGenerator {
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[async_trait]
impl Generator for ChatCompletionsGenerator {
    fn name(&self) -> &str {
        "chat_completions"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.trim().is_empty() {
            return Ok(placeholder_answer("[Empty prompt]"));
        }
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| GenerationError::Unavailable("API key not configured".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| GenerationError::Http(e.to_string()))?,
        );

        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.config.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            model = %self.config.model,
            prompt = %log_preview(prompt, PROMPT_PREVIEW_CHARS),
            "chat completion request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Response(format!("HTTP {}: {}", status, text)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Serialization(e.to_string()))?;

        parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| GenerationError::Response("Missing choices".to_string()))
    }
}

/// Tries `primary`, answers from `secondary` when it fails
pub struct FallbackGenerator {
    primary: Arc<dyn Generator>,
    secondary: Arc<dyn Generator>,
}

impl FallbackGenerator {
    pub fn new(primary: Arc<dyn Generator>, secondary: Arc<dyn Generator>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl Generator for FallbackGenerator {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        match self.primary.generate(prompt).await {
            Ok(answer) => Ok(answer),
            Err(err) => {
                warn!(
                    generator = self.primary.name(),
                    fallback = self.secondary.name(),
                    error = %err,
                    "generator failed, using fallback"
                );
                self.secondary.generate(prompt).await
            }
        }
    }
}

/// Generator for the configured mode.
///
/// `openai` without an API key in the environment degrades to offline.
pub fn build_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>, GenerationError> {
    match config.mode.trim().to_ascii_lowercase().as_str() {
        "openai" => {
            let chat = ChatCompletionsConfig::from_generation_config(config);
            if chat.api_key.is_none() {
                warn!(
                    api_key_env = %config.api_key_env,
                    "API key not set, generation runs offline"
                );
                return Ok(Arc::new(OfflineGenerator));
            }
            let primary = ChatCompletionsGenerator::new(chat)?;
            info!(
                model = primary.model(),
                endpoint = %config.endpoint,
                "chat completions generation enabled"
            );
            Ok(Arc::new(FallbackGenerator::new(
                Arc::new(primary),
                Arc::new(OfflineGenerator),
            )))
        }
        "offline" => Ok(Arc::new(OfflineGenerator)),
        other => Err(GenerationError::Unavailable(format!(
            "unknown generation mode '{}'",
            other
        ))),
    }
}
