//! Query pipeline - the end-to-end flow for one prompt
//!
//! PROMPT → CLASSIFY → RESOLVE → AGGREGATE → SYNTHESIZE → ANSWER
//!
//! Only classification and synthesis failures reach the caller. Company
//! and fetch level failures degrade the evidence instead.

use crate::aggregation::AggregationDispatcher;
use crate::classifier::IntentClassifier;
use crate::config::AppConfig;
use crate::fetchers::EvidenceFetchers;
use crate::llm::{ChatClient, CompletionModel};
use crate::models::{Intent, QueryAnswer, QueryCategory};
use crate::prompts;
use crate::resolver::SymbolResolver;
use crate::sources::{FinancialDataSource, FmpClient};
use crate::synthesis::{LlmSynthesizer, SynthesisGateway};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Classified and aggregated request, ready for synthesis
#[derive(Debug, Clone, Serialize)]
pub struct PreparedQuery {
    pub intent: Intent,
    pub symbols: Vec<String>,
    pub evidence: String,
}

pub struct QueryPipeline {
    classifier: IntentClassifier,
    resolver: SymbolResolver,
    dispatcher: AggregationDispatcher,
    synthesizer: Arc<dyn SynthesisGateway>,
}

impl QueryPipeline {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        source: Arc<dyn FinancialDataSource>,
        synthesizer: Arc<dyn SynthesisGateway>,
        transcript_limit: usize,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(model),
            resolver: SymbolResolver::new(source.clone()),
            dispatcher: AggregationDispatcher::new(EvidenceFetchers::new(source, transcript_limit)),
            synthesizer,
        }
    }

    /// Wire the production clients from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let model: Arc<dyn CompletionModel> = Arc::new(ChatClient::new(config)?);
        let source: Arc<dyn FinancialDataSource> = Arc::new(FmpClient::new(config)?);
        let synthesizer = Arc::new(LlmSynthesizer::new(model.clone()));

        Ok(Self::new(model, source, synthesizer, config.transcript_limit))
    }

    /// Classify, resolve and aggregate without calling synthesis
    pub async fn prepare(&self, prompt: &str) -> Result<PreparedQuery> {
        let intent = self.classifier.classify(prompt).await?;
        info!(
            category = %intent.category,
            companies = ?intent.companies,
            ceos = ?intent.ceos,
            topic = %intent.topic,
            "Categorized prompt"
        );

        let symbols: Vec<String> = self
            .resolver
            .resolve_all(&intent.companies)
            .await
            .into_iter()
            .map(|company| company.symbol)
            .collect();

        if symbols.is_empty() {
            warn!(
                category = %intent.category,
                companies = ?intent.companies,
                "No valid companies identified in the prompt"
            );
        }

        let evidence = self.dispatcher.aggregate(&intent, &symbols, prompt).await?;

        Ok(PreparedQuery {
            intent,
            symbols,
            evidence,
        })
    }

    /// Run the full pipeline for one prompt
    pub async fn answer(&self, prompt: &str) -> Result<QueryAnswer> {
        let span = info_span!("query", request_id = %Uuid::new_v4());
        self.run(prompt).instrument(span).await
    }

    async fn run(&self, prompt: &str) -> Result<QueryAnswer> {
        let start = Instant::now();
        let prepared = self.prepare(prompt).await?;

        info!(chars = prepared.evidence.len(), "Sending evidence to synthesis");
        debug!(evidence = %prepared.evidence, "Synthesis evidence");

        let response = self.synthesize(&prepared, prompt).await?;

        info!(
            chars = response.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Final response ready"
        );

        Ok(QueryAnswer {
            evidence_chars: prepared.evidence.len(),
            intent: prepared.intent,
            symbols: prepared.symbols,
            response,
        })
    }

    async fn synthesize(&self, prepared: &PreparedQuery, prompt: &str) -> Result<String> {
        let intent = &prepared.intent;
        match intent.category {
            QueryCategory::EarningsSummary => {
                let framed = prompts::framed_prompt(prompt, intent);
                self.synthesizer.summarize(&prepared.evidence, &framed).await
            }
            category => {
                self.synthesizer
                    .extract(
                        std::slice::from_ref(&prepared.evidence),
                        &intent.topic,
                        category,
                        prompt,
                    )
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::models::SnapshotKind;
    use crate::testing::{MockDataSource, RecordingGateway, ScriptedModel, SynthesisCall};
    use serde_json::json;
    use std::time::Duration;

    fn pipeline(
        classifier_reply: &str,
        source: MockDataSource,
        gateway: RecordingGateway,
    ) -> (QueryPipeline, Arc<MockDataSource>, Arc<RecordingGateway>) {
        let source = Arc::new(source);
        let gateway = Arc::new(gateway);
        let model = Arc::new(ScriptedModel::new(vec![classifier_reply]));
        let pipeline = QueryPipeline::new(model, source.clone(), gateway.clone(), 3);
        (pipeline, source, gateway)
    }

    #[tokio::test]
    async fn test_earnings_summary_scenario() {
        let (pipeline, source, gateway) = pipeline(
            r#"{"category": "Earnings Summary", "companies": ["Spotify"], "topic": "latest conference call"}"#,
            MockDataSource::new()
                .with_symbol("Spotify", "SPOT")
                .with_transcripts("SPOT", &["Spotify Q3 2024 earnings call transcript"]),
            RecordingGateway::new(),
        );

        let answer = pipeline
            .answer("Summarize Spotify's latest conference call")
            .await
            .unwrap();

        assert_eq!(answer.response, "synthesized answer");
        assert_eq!(answer.symbols, vec!["SPOT"]);
        assert_eq!(source.transcript_limits("SPOT"), vec![1]);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            SynthesisCall::Summarize { evidence, prompt } => {
                assert_eq!(evidence, "Spotify Q3 2024 earnings call transcript");
                assert!(prompt.starts_with("Prompt: Summarize Spotify's latest conference call"));
                assert!(prompt.contains("Category: Earnings Summary"));
            }
            other => panic!("expected summarize, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ceo_comments_scenario() {
        let (pipeline, _, gateway) = pipeline(
            r#"{"category": "CEO Comments", "companies": ["Meta", "Microsoft"], "ceos": ["Mark Zuckerberg", "Satya Nadella"], "topic": "AI"}"#,
            MockDataSource::new()
                .with_symbol("Meta", "META")
                .with_symbol("Microsoft", "MSFT")
                .with_transcripts("META", &["Zuckerberg: Llama adoption"])
                .with_transcripts("MSFT", &["Nadella: Copilot growth"])
                .with_transcript_delay("META", Duration::from_millis(30)),
            RecordingGateway::new(),
        );

        let prompt = "What are Mark Zuckerberg's and Satya Nadella's recent comments about AI?";
        let answer = pipeline.answer(prompt).await.unwrap();

        assert_eq!(answer.symbols, vec!["META", "MSFT"]);
        assert_eq!(
            answer.intent.ceos,
            Some(vec!["Mark Zuckerberg".to_string(), "Satya Nadella".to_string()])
        );

        match &gateway.calls()[0] {
            SynthesisCall::Extract {
                evidence,
                topic,
                category,
                prompt: sent_prompt,
            } => {
                assert_eq!(
                    evidence,
                    &vec!["META transcripts:\nZuckerberg: Llama adoption\n\nMSFT transcripts:\nNadella: Copilot growth".to_string()]
                );
                assert_eq!(topic, "AI");
                assert_eq!(*category, QueryCategory::CeoComments);
                assert_eq!(sent_prompt, prompt);
            }
            other => panic!("expected extract, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_category_fails_before_fetching() {
        let (pipeline, source, gateway) = pipeline(
            r#"{"category": "Unknown", "companies": ["Apple"], "topic": "x"}"#,
            MockDataSource::new().with_symbol("Apple", "AAPL"),
            RecordingGateway::new(),
        );

        let result = pipeline.answer("Tell me something").await;

        assert!(matches!(result, Err(QueryError::Classification(_))));
        assert!(source.calls().is_empty());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_all_metrics_failing_still_synthesizes() {
        let (pipeline, source, gateway) = pipeline(
            r#"{"category": "Financial Metrics", "companies": ["ServiceNow"], "topic": "large deals"}"#,
            MockDataSource::new()
                .with_symbol("ServiceNow", "NOW")
                .with_failing_transcripts("NOW"),
            RecordingGateway::new(),
        );

        let answer = pipeline
            .answer("How many new large deals did ServiceNow sign in the last quarter?")
            .await
            .unwrap();

        assert_eq!(answer.evidence_chars, 0);
        assert_eq!(source.fetch_count(), 4);
        match &gateway.calls()[..] {
            [SynthesisCall::Extract { evidence, category, .. }] => {
                assert_eq!(evidence, &vec![String::new()]);
                assert_eq!(*category, QueryCategory::FinancialMetrics);
            }
            other => panic!("expected one extract call, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unresolved_companies_degrade_to_empty_evidence() {
        let (pipeline, source, gateway) = pipeline(
            r#"{"category": "General Inquiry", "companies": ["Nonexistent Corp"], "topic": "outlook"}"#,
            MockDataSource::new(),
            RecordingGateway::new(),
        );

        let answer = pipeline.answer("What is the outlook?").await.unwrap();

        assert!(answer.symbols.is_empty());
        assert_eq!(source.fetch_count(), 0);
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_fatal() {
        let (pipeline, _, _) = pipeline(
            r#"{"category": "Company Info", "companies": ["Spotify"], "topic": "business"}"#,
            MockDataSource::new()
                .with_symbol("Spotify", "SPOT")
                .with_snapshot(SnapshotKind::CompanyProfile, "SPOT", json!({ "ceo": "Daniel Ek" })),
            RecordingGateway::failing(),
        );

        let result = pipeline.answer("What does Spotify do?").await;
        assert!(matches!(result, Err(QueryError::Synthesis(_))));
    }

    #[tokio::test]
    async fn test_prepare_skips_synthesis() {
        let (pipeline, _, gateway) = pipeline(
            r#"{"category": "Earnings Summary", "companies": ["Spotify"], "topic": "call"}"#,
            MockDataSource::new()
                .with_symbol("Spotify", "SPOT")
                .with_transcripts("SPOT", &["body"]),
            RecordingGateway::new(),
        );

        let prepared = pipeline.prepare("Summarize Spotify").await.unwrap();

        assert_eq!(prepared.evidence, "body");
        assert!(gateway.calls().is_empty());
    }
}
