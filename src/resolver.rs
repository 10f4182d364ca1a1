//! Identifier Resolver
//!
//! Maps free-text company names to ticker symbols. A miss is expected and
//! never fatal: the company simply drops out of the working set.

use crate::models::ResolvedCompany;
use crate::sources::FinancialDataSource;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct SymbolResolver {
    source: Arc<dyn FinancialDataSource>,
}

impl SymbolResolver {
    pub fn new(source: Arc<dyn FinancialDataSource>) -> Self {
        Self { source }
    }

    /// Resolve one company name. Lookup errors and empty matches both
    /// come back as `None`.
    pub async fn resolve(&self, company_name: &str) -> Option<String> {
        let name = company_name.trim();
        if name.is_empty() {
            return None;
        }

        match self.source.search_symbol(name).await {
            Ok(Some(symbol)) if !symbol.trim().is_empty() => {
                debug!(company = %name, symbol = %symbol, "Resolved company");
                Some(symbol.trim().to_string())
            }
            Ok(_) => {
                warn!(company = %name, "No ticker match for company");
                None
            }
            Err(e) => {
                warn!(company = %name, error = %e, "Failed to resolve ticker");
                None
            }
        }
    }

    /// Resolve every name concurrently. Output keeps input order with the
    /// misses removed.
    pub async fn resolve_all(&self, company_names: &[String]) -> Vec<ResolvedCompany> {
        let lookups = company_names.iter().map(|name| async move {
            self.resolve(name).await.map(|symbol| ResolvedCompany {
                name: name.clone(),
                symbol,
            })
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}
