//! Financial data sources
//!
//! Every lookup the pipeline makes against the financial-data backend goes
//! through [`FinancialDataSource`], keyed by a free-text name (search) or a
//! ticker symbol (everything else).

use crate::models::{FinancialSnapshot, Transcript};
use crate::Result;
use async_trait::async_trait;

pub mod fmp;
pub use fmp::FmpClient;

/// Trait for symbol search and per-symbol document retrieval
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    /// Best single ticker match for a company name, `None` when nothing matches
    async fn search_symbol(&self, company_name: &str) -> Result<Option<String>>;

    /// Up to `limit` most recent earnings call transcripts, newest first
    async fn transcripts(&self, symbol: &str, limit: usize) -> Result<Vec<Transcript>>;

    async fn key_metrics(&self, symbol: &str) -> Result<FinancialSnapshot>;

    async fn income_statement(&self, symbol: &str) -> Result<FinancialSnapshot>;

    async fn balance_sheet(&self, symbol: &str) -> Result<FinancialSnapshot>;

    async fn company_profile(&self, symbol: &str) -> Result<FinancialSnapshot>;
}
