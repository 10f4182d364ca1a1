//! Evidence fetchers
//!
//! Independent per-symbol retrievals, plus the [`Fetched`] wrapper that
//! turns any fetch failure into an explicit "unavailable" marker so one
//! failing source never cancels its siblings.

use crate::error::QueryError;
use crate::models::{FinancialSnapshot, Transcript};
use crate::sources::FinancialDataSource;
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Outcome of one fault-isolated fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Available(T),
    Unavailable(String),
}

impl<T> Fetched<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Fetched::Available(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Fetched::Available(value) => Some(value),
            Fetched::Unavailable(_) => None,
        }
    }
}

/// Await a fetch and absorb its failure. Always resolves.
pub async fn guarded<T, F>(label: &str, symbol: &str, fetch: F) -> Fetched<T>
where
    F: Future<Output = Result<T>>,
{
    match fetch.await {
        Ok(value) => Fetched::Available(value),
        Err(e) => {
            warn!(source = %label, symbol = %symbol, error = %e, "Evidence source unavailable");
            Fetched::Unavailable(e.to_string())
        }
    }
}

/// Per-symbol retrieval operations backed by a data source
#[derive(Clone)]
pub struct EvidenceFetchers {
    source: Arc<dyn FinancialDataSource>,
    transcript_limit: usize,
}

impl EvidenceFetchers {
    pub fn new(source: Arc<dyn FinancialDataSource>, transcript_limit: usize) -> Self {
        Self {
            source,
            transcript_limit: transcript_limit.max(1),
        }
    }

    /// Most recent earnings call transcript
    pub async fn latest_transcript(&self, symbol: &str) -> Result<Transcript> {
        self.source
            .transcripts(symbol, 1)
            .await?
            .into_iter()
            .next()
            .filter(|t| !t.content.trim().is_empty())
            .ok_or_else(|| QueryError::DataUnavailable(format!("no transcript for {}", symbol)))
    }

    /// Up to `transcript_limit` recent transcripts. An empty list is a valid
    /// answer here, not a failure.
    pub async fn recent_transcripts(&self, symbol: &str) -> Result<Vec<Transcript>> {
        let transcripts = self.source.transcripts(symbol, self.transcript_limit).await?;
        Ok(transcripts
            .into_iter()
            .filter(|t| !t.content.trim().is_empty())
            .collect())
    }

    pub async fn financial_metrics(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.source.key_metrics(symbol).await
    }

    pub async fn income_statement(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.source.income_statement(symbol).await
    }

    pub async fn balance_sheet(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.source.balance_sheet(symbol).await
    }

    pub async fn company_profile(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.source.company_profile(symbol).await
    }
}
