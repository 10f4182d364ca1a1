//! Core data models for the query pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Intent =================
//

/// Closed set of prompt categories the classifier may choose from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QueryCategory {
    #[serde(rename = "Company Info")]
    CompanyInfo,
    #[serde(rename = "CEO Comments")]
    CeoComments,
    #[serde(rename = "Earnings Summary")]
    EarningsSummary,
    #[serde(rename = "Financial Metrics")]
    FinancialMetrics,
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
    #[serde(rename = "Mixed Query")]
    MixedQuery,
}

impl QueryCategory {
    pub const ALL: [QueryCategory; 6] = [
        QueryCategory::CompanyInfo,
        QueryCategory::CeoComments,
        QueryCategory::EarningsSummary,
        QueryCategory::FinancialMetrics,
        QueryCategory::GeneralInquiry,
        QueryCategory::MixedQuery,
    ];

    /// Label used in classifier instructions and synthesis framing
    pub fn label(self) -> &'static str {
        match self {
            QueryCategory::CompanyInfo => "Company Info",
            QueryCategory::CeoComments => "CEO Comments",
            QueryCategory::EarningsSummary => "Earnings Summary",
            QueryCategory::FinancialMetrics => "Financial Metrics",
            QueryCategory::GeneralInquiry => "General Inquiry",
            QueryCategory::MixedQuery => "Mixed Query",
        }
    }

    /// Match a classifier label, ignoring case, spaces, `_` and `-`.
    pub fn from_label(raw: &str) -> Option<Self> {
        let wanted = normalize_label(raw);
        if wanted.is_empty() {
            return None;
        }

        Self::ALL
            .into_iter()
            .find(|category| normalize_label(category.label()) == wanted)
    }
}

fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Structured classification of one prompt. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    pub category: QueryCategory,
    pub companies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceos: Option<Vec<String>>,
    pub topic: String,
}

//
// ================= Resolution =================
//

/// A company name paired with the ticker it resolved to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedCompany {
    pub name: String,
    pub symbol: String,
}

//
// ================= Evidence =================
//

/// Earnings call transcript as returned by the data source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Transcript {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub quarter: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub date: Option<String>,
    pub content: String,
}

impl Transcript {
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    KeyMetrics,
    IncomeStatement,
    BalanceSheet,
    CompanyProfile,
}

impl SnapshotKind {
    /// Section heading used in merged evidence
    pub fn section_title(self) -> &'static str {
        match self {
            SnapshotKind::KeyMetrics => "Key Financial Metrics",
            SnapshotKind::IncomeStatement => "Income Statement",
            SnapshotKind::BalanceSheet => "Balance Sheet",
            SnapshotKind::CompanyProfile => "Company Profile",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section_title())
    }
}

/// Flat record of the most recent reporting period for one symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialSnapshot {
    pub kind: SnapshotKind,
    pub symbol: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl FinancialSnapshot {
    /// Pretty JSON rendering. Keys come out sorted, so identical snapshots
    /// always render identically.
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_else(|_| "{}".to_string())
    }
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub intent: Intent,
    pub symbols: Vec<String>,
    pub evidence_chars: usize,
    pub response: String,
}
