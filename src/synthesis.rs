//! Synthesis gateway
//!
//! Final language-model step: merged evidence plus the original question
//! in, user-facing answer out. Any failure here is fatal for the request.

use crate::error::QueryError;
use crate::llm::{ChatPrompt, CompletionModel};
use crate::models::QueryCategory;
use crate::prompts;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

const SYNTHESIS_MAX_TOKENS: u32 = 2000;

#[async_trait]
pub trait SynthesisGateway: Send + Sync {
    /// Summarize a single evidence body (earnings summaries)
    async fn summarize(&self, evidence: &str, prompt: &str) -> Result<String>;

    /// Extract an answer about `topic` from one or more evidence bodies
    async fn extract(
        &self,
        evidence: &[String],
        topic: &str,
        category: QueryCategory,
        prompt: &str,
    ) -> Result<String>;
}

/// Gateway backed by a chat-completion model
pub struct LlmSynthesizer {
    model: Arc<dyn CompletionModel>,
}

impl LlmSynthesizer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    async fn run(&self, request: ChatPrompt) -> Result<String> {
        self.model.complete(&request).await.map_err(|e| {
            error!("Synthesis call failed: {}", e);
            match e {
                QueryError::Synthesis(_) => e,
                other => QueryError::Synthesis(other.to_string()),
            }
        })
    }
}

#[async_trait]
impl SynthesisGateway for LlmSynthesizer {
    async fn summarize(&self, evidence: &str, prompt: &str) -> Result<String> {
        let request = ChatPrompt::new(
            prompts::summarize_system(),
            prompts::summarize_user(prompt, evidence),
        )
        .with_max_tokens(SYNTHESIS_MAX_TOKENS);

        self.run(request).await
    }

    async fn extract(
        &self,
        evidence: &[String],
        topic: &str,
        category: QueryCategory,
        prompt: &str,
    ) -> Result<String> {
        let combined = evidence.join("\n\n");
        debug!(chars = combined.len(), category = %category, "Extracting from evidence");

        let user = match category {
            QueryCategory::FinancialMetrics => prompts::metrics_user(prompt, &combined),
            _ => prompts::extract_user(prompt, topic, &combined),
        };

        let request = ChatPrompt::new(prompts::extract_system(), user)
            .with_max_tokens(SYNTHESIS_MAX_TOKENS);

        self.run(request).await
    }
}
