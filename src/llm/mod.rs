//! Semantic (LLM-based) extraction engine
//!
//! The crate talks to the engine only through `SemanticExtractor`; the
//! bundled `OpenAiExtractor` is a chat-completions implementation.

mod chunking;
mod openai;

pub use chunking::{split_into_chunks, ChunkingConfig};
pub use openai::OpenAiExtractor;

use crate::Result;
use async_trait::async_trait;

/// Turns raw page content into schema-conforming JSON
#[async_trait]
pub trait SemanticExtractor: Send + Sync {
    /// Extracts data matching `schema` from `content`
    ///
    /// # Arguments
    ///
    /// * `content` - Page text, usually its markdown rendering
    /// * `schema` - JSON schema the response must follow
    /// * `instruction` - Extraction directive
    /// * `chunking` - How long content is split before extraction
    ///
    /// # Returns
    ///
    /// The engine's raw JSON response
    async fn extract(
        &self,
        content: &str,
        schema: &serde_json::Value,
        instruction: &str,
        chunking: &ChunkingConfig,
    ) -> Result<String>;
}
