//! In-crate fakes shared by unit tests

use crate::error::QueryError;
use crate::llm::{ChatPrompt, CompletionModel};
use crate::models::{FinancialSnapshot, QueryCategory, SnapshotKind, Transcript};
use crate::sources::FinancialDataSource;
use crate::synthesis::SynthesisGateway;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Completion model that replays canned responses in order
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<ChatPrompt>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(str::to_string).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ChatPrompt> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| QueryError::Llm("no scripted response left".to_string()))
    }
}

/// Map-backed data source with call recording and per-symbol delays
#[derive(Default)]
pub struct MockDataSource {
    symbols: HashMap<String, String>,
    failing_search: HashSet<String>,
    search_delays: HashMap<String, Duration>,
    transcripts: HashMap<String, Vec<String>>,
    failing_transcripts: HashSet<String>,
    transcript_delays: HashMap<String, Duration>,
    snapshots: HashMap<(SnapshotKind, String), Value>,
    snapshot_delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, name: &str, symbol: &str) -> Self {
        self.symbols.insert(name.to_string(), symbol.to_string());
        self
    }

    pub fn with_failing_search(mut self, name: &str) -> Self {
        self.failing_search.insert(name.to_string());
        self
    }

    pub fn with_search_delay(mut self, name: &str, delay: Duration) -> Self {
        self.search_delays.insert(name.to_string(), delay);
        self
    }

    pub fn with_transcripts(mut self, symbol: &str, contents: &[&str]) -> Self {
        self.transcripts.insert(
            symbol.to_string(),
            contents.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn with_failing_transcripts(mut self, symbol: &str) -> Self {
        self.failing_transcripts.insert(symbol.to_string());
        self
    }

    pub fn with_transcript_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.transcript_delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn with_snapshot(mut self, kind: SnapshotKind, symbol: &str, fields: Value) -> Self {
        self.snapshots.insert((kind, symbol.to_string()), fields);
        self
    }

    /// Delay every metric/statement/profile fetch for a symbol
    pub fn with_snapshot_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.snapshot_delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of document/metric fetches, excluding symbol searches
    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !c.starts_with("search:"))
            .count()
    }

    /// Limits passed to each transcript request for a symbol
    pub fn transcript_limits(&self, symbol: &str) -> Vec<usize> {
        let prefix = format!("transcripts:{}:", symbol);
        self.calls()
            .iter()
            .filter_map(|c| c.strip_prefix(&prefix))
            .filter_map(|limit| limit.parse().ok())
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn snapshot(&self, kind: SnapshotKind, symbol: &str) -> Result<FinancialSnapshot> {
        self.record(format!("{:?}:{}", kind, symbol));
        if let Some(delay) = self.snapshot_delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        match self.snapshots.get(&(kind, symbol.to_string())) {
            Some(Value::Object(fields)) => Ok(FinancialSnapshot {
                kind,
                symbol: symbol.to_string(),
                fields: fields.clone(),
            }),
            _ => Err(QueryError::DataUnavailable(format!(
                "no {} for {}",
                kind, symbol
            ))),
        }
    }
}

#[async_trait]
impl FinancialDataSource for MockDataSource {
    async fn search_symbol(&self, company_name: &str) -> Result<Option<String>> {
        self.record(format!("search:{}", company_name));
        if let Some(delay) = self.search_delays.get(company_name) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_search.contains(company_name) {
            return Err(QueryError::DataUnavailable("search failed".to_string()));
        }
        Ok(self.symbols.get(company_name).cloned())
    }

    async fn transcripts(&self, symbol: &str, limit: usize) -> Result<Vec<Transcript>> {
        self.record(format!("transcripts:{}:{}", symbol, limit));
        if let Some(delay) = self.transcript_delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_transcripts.contains(symbol) {
            return Err(QueryError::DataUnavailable(format!(
                "transcript service down for {}",
                symbol
            )));
        }
        Ok(self
            .transcripts
            .get(symbol)
            .map(|contents| {
                contents
                    .iter()
                    .take(limit)
                    .map(|c| Transcript {
                        symbol: Some(symbol.to_string()),
                        ..Transcript::from_content(c.as_str())
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn key_metrics(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.snapshot(SnapshotKind::KeyMetrics, symbol).await
    }

    async fn income_statement(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.snapshot(SnapshotKind::IncomeStatement, symbol).await
    }

    async fn balance_sheet(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.snapshot(SnapshotKind::BalanceSheet, symbol).await
    }

    async fn company_profile(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.snapshot(SnapshotKind::CompanyProfile, symbol).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisCall {
    Summarize {
        evidence: String,
        prompt: String,
    },
    Extract {
        evidence: Vec<String>,
        topic: String,
        category: QueryCategory,
        prompt: String,
    },
}

/// Synthesis gateway that records what it was asked to do
#[derive(Default)]
pub struct RecordingGateway {
    fail: bool,
    calls: Mutex<Vec<SynthesisCall>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SynthesisCall> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, call: SynthesisCall) -> Result<String> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(QueryError::Synthesis("model unavailable".to_string()))
        } else {
            Ok("synthesized answer".to_string())
        }
    }
}

#[async_trait]
impl SynthesisGateway for RecordingGateway {
    async fn summarize(&self, evidence: &str, prompt: &str) -> Result<String> {
        self.respond(SynthesisCall::Summarize {
            evidence: evidence.to_string(),
            prompt: prompt.to_string(),
        })
    }

    async fn extract(
        &self,
        evidence: &[String],
        topic: &str,
        category: QueryCategory,
        prompt: &str,
    ) -> Result<String> {
        self.respond(SynthesisCall::Extract {
            evidence: evidence.to_vec(),
            topic: topic.to_string(),
            category,
            prompt: prompt.to_string(),
        })
    }
}
