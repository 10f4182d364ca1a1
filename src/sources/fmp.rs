//! Financial Modeling Prep backed data source
//!
//! Thin HTTP wrapper over the v3 REST endpoints. Any transport error,
//! non-2xx status, error body, or empty snapshot becomes `DataUnavailable`.
//! An empty transcript list is passed through as-is.

use crate::config::AppConfig;
use crate::error::QueryError;
use crate::models::{FinancialSnapshot, SnapshotKind, Transcript};
use crate::sources::FinancialDataSource;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct FmpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.fmp_base_url.trim_end_matches('/').to_string(),
            api_key: config.fmp_api_key.clone(),
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        if self.api_key.is_empty() {
            return Err(QueryError::DataUnavailable(
                "FMP_API_KEY is not configured".to_string(),
            ));
        }

        let url = format!("{}/{}", self.base_url, path);
        debug!(path = %path, "Financial data request");

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                QueryError::DataUnavailable(format!("request failed for {}: {}", path, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::DataUnavailable(format!(
                "financial API returned {} for {}",
                status, path
            )));
        }

        let body = response.json::<Value>().await.map_err(|e| {
            QueryError::DataUnavailable(format!("invalid JSON response for {}: {}", path, e))
        })?;

        if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
            return Err(QueryError::DataUnavailable(format!(
                "financial API error for {}: {}",
                path, message
            )));
        }

        Ok(body)
    }

    async fn latest_record(
        &self,
        endpoint: &str,
        symbol: &str,
        kind: SnapshotKind,
    ) -> Result<FinancialSnapshot> {
        let symbol = checked_symbol(symbol)?;
        let body = self
            .get_json(&format!("{}/{}", endpoint, symbol), &[("limit", "1".to_string())])
            .await?;
        first_snapshot(body, kind, symbol)
    }
}

#[async_trait]
impl FinancialDataSource for FmpClient {
    async fn search_symbol(&self, company_name: &str) -> Result<Option<String>> {
        let body = self
            .get_json(
                "search",
                &[
                    ("query", company_name.to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(first_symbol(&body))
    }

    async fn transcripts(&self, symbol: &str, limit: usize) -> Result<Vec<Transcript>> {
        let symbol = checked_symbol(symbol)?;
        let body = self
            .get_json(
                &format!("earning_call_transcript/{}", symbol),
                &[("limit", limit.to_string())],
            )
            .await?;
        parse_transcripts(body, limit)
    }

    async fn key_metrics(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.latest_record("key-metrics", symbol, SnapshotKind::KeyMetrics)
            .await
    }

    async fn income_statement(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.latest_record("income-statement", symbol, SnapshotKind::IncomeStatement)
            .await
    }

    async fn balance_sheet(&self, symbol: &str) -> Result<FinancialSnapshot> {
        self.latest_record("balance-sheet-statement", symbol, SnapshotKind::BalanceSheet)
            .await
    }

    async fn company_profile(&self, symbol: &str) -> Result<FinancialSnapshot> {
        let symbol = checked_symbol(symbol)?;
        let body = self.get_json(&format!("profile/{}", symbol), &[]).await?;
        first_snapshot(body, SnapshotKind::CompanyProfile, symbol)
    }
}

/// Symbols are interpolated into the URL path, so refuse anything that
/// could change the path, including dot-only segments like `..`.
fn checked_symbol(symbol: &str) -> Result<&str> {
    let symbol = symbol.trim();
    if !symbol.chars().any(|c| c.is_ascii_alphanumeric())
        || !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(QueryError::DataUnavailable(format!(
            "invalid ticker symbol '{}'",
            symbol
        )));
    }
    Ok(symbol)
}

fn first_symbol(body: &Value) -> Option<String> {
    body.as_array()?
        .first()?
        .get("symbol")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_transcripts(body: Value, limit: usize) -> Result<Vec<Transcript>> {
    let Value::Array(items) = body else {
        return Err(QueryError::DataUnavailable(
            "transcript response is not an array".to_string(),
        ));
    };

    let mut transcripts = Vec::with_capacity(items.len().min(limit));
    for item in items.into_iter().take(limit) {
        let transcript = serde_json::from_value::<Transcript>(item).map_err(|e| {
            QueryError::DataUnavailable(format!("malformed transcript record: {}", e))
        })?;
        transcripts.push(transcript);
    }
    Ok(transcripts)
}

fn first_snapshot(body: Value, kind: SnapshotKind, symbol: &str) -> Result<FinancialSnapshot> {
    let record = match body {
        Value::Array(items) => items.into_iter().next(),
        other @ Value::Object(_) => Some(other),
        _ => None,
    };

    match record {
        Some(Value::Object(fields)) if !fields.is_empty() => Ok(FinancialSnapshot {
            kind,
            symbol: symbol.to_string(),
            fields,
        }),
        _ => Err(QueryError::DataUnavailable(format!(
            "no {} data for {}",
            kind, symbol
        ))),
    }
}
