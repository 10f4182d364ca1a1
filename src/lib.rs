//! Earnings Query Orchestrator
//!
//! Answers natural-language questions about public companies:
//! - Classifies the prompt into a fixed set of intents
//! - Resolves company names to ticker symbols
//! - Fetches transcripts and financial statements concurrently,
//!   absorbing per-source failures
//! - Merges the evidence and hands it to a language model for the answer
//!
//! PIPELINE:
//! PROMPT → CLASSIFY → RESOLVE → AGGREGATE → SYNTHESIZE → ANSWER

pub mod aggregation;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod resolver;
pub mod sources;
pub mod synthesis;

#[cfg(test)]
mod testing;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use pipeline::{PreparedQuery, QueryPipeline};
