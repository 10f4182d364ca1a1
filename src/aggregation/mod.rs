//! Aggregation dispatcher
//!
//! Picks the strategy for the classified category and runs it. A non-fatal
//! strategy failure is logged and collapses the evidence to an empty string
//! so the request still reaches synthesis.

use crate::fetchers::EvidenceFetchers;
use crate::models::{Intent, QueryCategory};
use crate::Result;
use tracing::{error, info};

pub mod strategy;
pub use strategy::{mentions_metrics, Strategy, StrategyInput, METRIC_KEYWORDS};

pub struct AggregationDispatcher {
    fetchers: EvidenceFetchers,
}

impl AggregationDispatcher {
    pub fn new(fetchers: EvidenceFetchers) -> Self {
        Self { fetchers }
    }

    /// Build the evidence payload for one request. Non-fatal strategy
    /// failures collapse to empty evidence; fatal ones are returned.
    pub async fn aggregate(
        &self,
        intent: &Intent,
        symbols: &[String],
        prompt: &str,
    ) -> Result<String> {
        let strategy = Strategy::for_category(intent.category);
        let input = StrategyInput {
            fetchers: &self.fetchers,
            symbols,
            prompt,
        };

        let gathered = strategy.gather(&input).await;
        if let Ok(evidence) = &gathered {
            info!(
                category = %intent.category,
                symbols = ?symbols,
                chars = evidence.len(),
                "Evidence aggregated"
            );
        }
        absorb(intent.category, gathered)
    }
}

fn absorb(category: QueryCategory, gathered: Result<String>) -> Result<String> {
    match gathered {
        Ok(evidence) => Ok(evidence),
        Err(e) if !e.is_fatal() => {
            error!(
                category = %category,
                error = %e,
                "Evidence aggregation failed; continuing with empty evidence"
            );
            Ok(String::new())
        }
        Err(e) => Err(e),
    }
}
