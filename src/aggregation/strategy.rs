//! One evidence-gathering strategy per query category
//!
//! Section order inside every payload is fixed per strategy and never
//! depends on which concurrent fetch finished first.

use crate::error::QueryError;
use crate::fetchers::{guarded, EvidenceFetchers, Fetched};
use crate::models::{FinancialSnapshot, QueryCategory, SnapshotKind, Transcript};
use crate::Result;
use futures::future::join_all;

/// Prompt fragments that pull key metrics into a mixed query
pub const METRIC_KEYWORDS: &[&str] = &["how many", "how much", "revenue", "spend"];

const UNAVAILABLE: &str = "Not available";

/// Everything a strategy needs for one request
pub struct StrategyInput<'a> {
    pub fetchers: &'a EvidenceFetchers,
    /// Resolved symbols in the order the companies were named
    pub symbols: &'a [String],
    pub prompt: &'a str,
}

impl StrategyInput<'_> {
    /// Single-subject strategies only look at the first named company
    fn primary_symbol(&self) -> Result<&str> {
        self.symbols
            .first()
            .map(String::as_str)
            .ok_or_else(|| QueryError::Aggregation("no resolved company to fetch for".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CompanyInfo,
    CeoComments,
    EarningsSummary,
    FinancialMetrics,
    GeneralInquiry,
    MixedQuery,
}

impl Strategy {
    pub fn for_category(category: QueryCategory) -> Self {
        match category {
            QueryCategory::CompanyInfo => Strategy::CompanyInfo,
            QueryCategory::CeoComments => Strategy::CeoComments,
            QueryCategory::EarningsSummary => Strategy::EarningsSummary,
            QueryCategory::FinancialMetrics => Strategy::FinancialMetrics,
            QueryCategory::GeneralInquiry => Strategy::GeneralInquiry,
            QueryCategory::MixedQuery => Strategy::MixedQuery,
        }
    }

    /// Fetch and merge evidence. `Err` means every source behind the
    /// strategy failed (or there was nothing to fetch for).
    pub async fn gather(self, input: &StrategyInput<'_>) -> Result<String> {
        match self {
            Strategy::CompanyInfo => company_info(input).await,
            Strategy::CeoComments => ceo_comments(input).await,
            Strategy::EarningsSummary => earnings_summary(input).await,
            Strategy::FinancialMetrics => financial_metrics(input).await,
            Strategy::GeneralInquiry => general_inquiry(input).await,
            Strategy::MixedQuery => mixed_query(input).await,
        }
    }
}

async fn company_info(input: &StrategyInput<'_>) -> Result<String> {
    let symbol = input.primary_symbol()?;
    let fetchers = input.fetchers;

    let (profile, metrics) = tokio::join!(
        guarded("company_profile", symbol, fetchers.company_profile(symbol)),
        guarded("financial_metrics", symbol, fetchers.financial_metrics(symbol)),
    );

    if !profile.is_available() && !metrics.is_available() {
        return Err(all_failed(symbol, "company info"));
    }

    Ok([
        snapshot_section(SnapshotKind::CompanyProfile, &profile),
        snapshot_section(SnapshotKind::KeyMetrics, &metrics),
    ]
    .join("\n\n"))
}

async fn ceo_comments(input: &StrategyInput<'_>) -> Result<String> {
    let blocks = comment_blocks(input).await;

    if !blocks.is_empty() && blocks.iter().all(|(_, fetched)| !fetched.is_available()) {
        return Err(QueryError::Aggregation(
            "transcripts unavailable for every company".to_string(),
        ));
    }

    Ok(render_comment_blocks(&blocks))
}

async fn earnings_summary(input: &StrategyInput<'_>) -> Result<String> {
    let symbol = input.primary_symbol()?;

    match guarded(
        "latest_transcript",
        symbol,
        input.fetchers.latest_transcript(symbol),
    )
    .await
    {
        Fetched::Available(transcript) => Ok(transcript.content),
        Fetched::Unavailable(_) => Err(all_failed(symbol, "earnings summary")),
    }
}

async fn financial_metrics(input: &StrategyInput<'_>) -> Result<String> {
    let symbol = input.primary_symbol()?;
    let fetchers = input.fetchers;

    let (metrics, transcript, income, balance) = tokio::join!(
        guarded("financial_metrics", symbol, fetchers.financial_metrics(symbol)),
        guarded("latest_transcript", symbol, fetchers.latest_transcript(symbol)),
        guarded("income_statement", symbol, fetchers.income_statement(symbol)),
        guarded("balance_sheet", symbol, fetchers.balance_sheet(symbol)),
    );

    if !metrics.is_available()
        && !transcript.is_available()
        && !income.is_available()
        && !balance.is_available()
    {
        return Err(all_failed(symbol, "financial metrics"));
    }

    let transcript_section = match transcript.as_option() {
        Some(t) => format!("Earnings Call Transcript:\n{}", t.content),
        None => format!("Earnings Call Transcript:\n{}", UNAVAILABLE),
    };

    Ok([
        snapshot_section(SnapshotKind::KeyMetrics, &metrics),
        snapshot_section(SnapshotKind::IncomeStatement, &income),
        snapshot_section(SnapshotKind::BalanceSheet, &balance),
        transcript_section,
    ]
    .join("\n\n"))
}

async fn general_inquiry(input: &StrategyInput<'_>) -> Result<String> {
    let symbol = input.primary_symbol()?;

    match guarded(
        "recent_transcripts",
        symbol,
        input.fetchers.recent_transcripts(symbol),
    )
    .await
    {
        Fetched::Available(transcripts) => Ok(join_contents(&transcripts)),
        Fetched::Unavailable(_) => Err(all_failed(symbol, "general inquiry")),
    }
}

async fn mixed_query(input: &StrategyInput<'_>) -> Result<String> {
    let symbol = input.primary_symbol()?;
    let fetchers = input.fetchers;
    let wants_metrics = mentions_metrics(input.prompt);

    let (summary, comments, metrics) = tokio::join!(
        guarded("latest_transcript", symbol, fetchers.latest_transcript(symbol)),
        comment_blocks(input),
        async {
            if wants_metrics {
                Some(guarded("financial_metrics", symbol, fetchers.financial_metrics(symbol)).await)
            } else {
                None
            }
        },
    );

    let nothing_fetched = !summary.is_available()
        && comments.iter().all(|(_, fetched)| !fetched.is_available())
        && metrics.as_ref().map_or(true, |m| !m.is_available());
    if nothing_fetched {
        return Err(all_failed(symbol, "mixed query"));
    }

    let mut sections = Vec::with_capacity(3);
    if let Some(transcript) = summary.as_option() {
        sections.push(format!("Earnings Summary:\n{}", transcript.content));
    }
    sections.push(format!("Comments:\n{}", render_comment_blocks(&comments)));
    if let Some(metrics) = metrics {
        sections.push(match metrics.as_option() {
            Some(snapshot) => format!("Metrics:\n{}", snapshot.render()),
            None => "Metrics:\nNo financial metrics available".to_string(),
        });
    }

    Ok(sections.join("\n\n"))
}

/// Whether the raw prompt asks for figures
pub fn mentions_metrics(prompt: &str) -> bool {
    let lowered = prompt.to_lowercase();
    METRIC_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Recent transcripts for every symbol, fetched concurrently, in symbol order
async fn comment_blocks<'a>(
    input: &StrategyInput<'a>,
) -> Vec<(&'a str, Fetched<Vec<Transcript>>)> {
    let fetchers = input.fetchers;
    let symbols: &'a [String] = input.symbols;

    join_all(symbols.iter().map(move |symbol| async move {
        let fetched = guarded(
            "recent_transcripts",
            symbol,
            fetchers.recent_transcripts(symbol),
        )
        .await;
        (symbol.as_str(), fetched)
    }))
    .await
}

/// One labeled block per symbol. Symbols without transcripts keep their
/// heading with an empty body.
fn render_comment_blocks(blocks: &[(&str, Fetched<Vec<Transcript>>)]) -> String {
    blocks
        .iter()
        .map(|(symbol, fetched)| {
            let body = fetched
                .as_option()
                .map(|transcripts| join_contents(transcripts))
                .unwrap_or_default();
            if body.is_empty() {
                format!("{} transcripts:", symbol)
            } else {
                format!("{} transcripts:\n{}", symbol, body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn join_contents(transcripts: &[Transcript]) -> String {
    transcripts
        .iter()
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn snapshot_section(kind: SnapshotKind, fetched: &Fetched<FinancialSnapshot>) -> String {
    match fetched.as_option() {
        Some(snapshot) => format!("{}:\n{}", kind.section_title(), snapshot.render()),
        None => format!("{}:\n{}", kind.section_title(), UNAVAILABLE),
    }
}

fn all_failed(symbol: &str, what: &str) -> QueryError {
    QueryError::Aggregation(format!("every {} source failed for {}", what, symbol))
}
