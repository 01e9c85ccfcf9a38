use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Seam to the generative-text service. The HTTP transport lives outside
/// this workspace; the pipeline only needs prompt-in, text-out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Knobs an HTTP-backed [`TextGenerator`] implementation consumes. Carried
/// in the ingest config so the whole surface is configurable from the
/// environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 120,
            max_retries: 1,
            temperature: 0.1,
            max_tokens: 1024,
        }
    }
}
