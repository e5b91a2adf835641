//! Chat-completions client implementing `SemanticExtractor`

use crate::config::ExtractorConfig;
use crate::llm::{split_into_chunks, ChunkingConfig, SemanticExtractor};
use crate::{ConfigError, HarvestError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible semantic extractor
///
/// Content is split per `ChunkingConfig`, each chunk is sent as its own
/// JSON-mode completion, and the per-chunk objects are returned together as
/// a JSON list.
#[derive(Clone)]
pub struct OpenAiExtractor {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiExtractor {
    /// Creates an extractor for the given key and model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            temperature: 0.0,
        }
    }

    /// Builds an extractor from configuration
    ///
    /// The API key is read from the environment variable named in the
    /// config. A missing key fails here, before any request is made.
    pub fn from_config(config: &ExtractorConfig) -> std::result::Result<Self, ConfigError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential(config.api_key_env.clone()))?;

        Ok(Self::new(api_key, config.model_name())
            .with_base_url(config.base_url.clone())
            .with_temperature(config.temperature))
    }

    /// Sets a custom base URL (proxies, compatible servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system_prompt: &str, chunk: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: chunk,
                },
            ],
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::Llm(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| HarvestError::Llm("completion contained no content".to_string()))
    }
}

#[async_trait]
impl SemanticExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        content: &str,
        schema: &Value,
        instruction: &str,
        chunking: &ChunkingConfig,
    ) -> Result<String> {
        let system_prompt = format!(
            "{}\n\nRespond with a single JSON object that follows this schema:\n{}",
            instruction.trim(),
            schema
        );

        let chunks = split_into_chunks(content, chunking);
        tracing::debug!(
            "Sending {} chunk(s) to {} for extraction",
            chunks.len(),
            self.model
        );

        let mut blocks = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let raw = self.complete(&system_prompt, chunk).await?;
            let block: Value = serde_json::from_str(&raw).map_err(|e| {
                HarvestError::Parse(format!("chunk {} returned invalid JSON: {}", index, e))
            })?;
            blocks.push(match block {
                Value::Array(members) => serde_json::json!({ "staff_members": members }),
                Value::Object(mut map) => {
                    map.entry("staff_members")
                        .or_insert_with(|| Value::Array(Vec::new()));
                    Value::Object(map)
                }
                _ => serde_json::json!({ "staff_members": [] }),
            });
        }

        Ok(Value::Array(blocks).to_string())
    }
}
