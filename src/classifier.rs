//! Intent Classifier
//!
//! Sends the raw prompt to the completion model and turns its JSON reply
//! into an [`Intent`]. The category set is closed: anything outside it is a
//! hard classification failure and the request stops here.

use crate::error::QueryError;
use crate::llm::{ChatPrompt, CompletionModel};
use crate::models::{Intent, QueryCategory};
use crate::prompts;
use crate::Result;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

const CLASSIFICATION_MAX_TOKENS: u32 = 2000;

pub struct IntentClassifier {
    model: Arc<dyn CompletionModel>,
}

impl IntentClassifier {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Classify a prompt into a structured intent
    pub async fn classify(&self, prompt: &str) -> Result<Intent> {
        let request = ChatPrompt::new(
            prompts::classification_system(&QueryCategory::ALL),
            prompts::classification_user(prompt),
        )
        .with_max_tokens(CLASSIFICATION_MAX_TOKENS);

        let raw = self.model.complete(&request).await?;
        debug!(raw = %raw, "Classifier output");

        parse_intent(&raw).map_err(|e| {
            error!("Classifier output rejected: {}", e);
            e
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawIntent {
    category: Option<String>,
    companies: Option<Vec<String>>,
    #[serde(default)]
    ceos: Option<Vec<String>>,
    #[serde(default)]
    topic: Option<String>,
}

/// Parse classifier output into an [`Intent`]
pub fn parse_intent(response: &str) -> Result<Intent> {
    let cleaned = json_object(response);

    let raw: RawIntent = serde_json::from_str(cleaned).map_err(|e| {
        QueryError::Classification(format!(
            "classifier output is not a JSON object: {} | raw={}",
            e, response
        ))
    })?;

    let label = raw
        .category
        .ok_or_else(|| QueryError::Classification("missing 'category'".to_string()))?;

    let category = QueryCategory::from_label(&label).ok_or_else(|| {
        QueryError::Classification(format!("unrecognized category '{}'", label))
    })?;

    let companies = raw
        .companies
        .ok_or_else(|| QueryError::Classification("missing 'companies'".to_string()))?
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let ceos = raw.ceos.map(|names| {
        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
    });

    Ok(Intent {
        category,
        companies,
        ceos,
        topic: raw.topic.unwrap_or_default().trim().to_string(),
    })
}

/// Cut the reply down to its outermost `{ ... }`, dropping code fences and
/// any prose the model wrapped around the object.
fn json_object(response: &str) -> &str {
    let trimmed = response.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
