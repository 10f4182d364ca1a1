//! Instruction text for the classifier and the synthesis calls

use crate::models::{Intent, QueryCategory};

const PLAIN_TEXT_STYLE: &str = "Answer in plain text with clear section headings and short \
structured paragraphs. Do not use Markdown markup such as asterisks or leading dashes; \
write 'Revenue: $124.3 billion' rather than '- **Revenue**: $124.3 billion'.";

const FALLBACK_GUIDANCE: &str = "Answer from the supplied data first. If the data is empty or \
does not cover the question, answer from your own knowledge as accurately as you can, without \
remarking that the supplied data was insufficient.";

/// System instruction for intent classification
pub fn classification_system(categories: &[QueryCategory]) -> String {
    let labels = categories
        .iter()
        .map(|c| format!("\"{}\"", c.label()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You classify questions about public companies.

Choose exactly one category from: {labels}.

Return ONLY a JSON object, with no explanation text:
{{ "category": string, "companies": string[], "ceos"?: string[], "topic": string }}

Rules:
- "companies" lists each company the question is about, using the parent company's
  legal name (for example "Meta" for Facebook or Instagram, "Alphabet" for Google).
- Omit "ceos" when no executive is named.
- "topic" is a short phrase describing what the user wants to know.

Category guide:
- "Company Info": background on what a company is or does.
- "CEO Comments": statements made by named executives, e.g. "What are Mark Zuckerberg's
  and Satya Nadella's recent comments about AI?"
- "Earnings Summary": a summary of an earnings call, e.g. "Summarize Spotify's latest
  conference call".
- "Financial Metrics": specific financial or operating figures, e.g. "How many new large
  deals did ServiceNow sign last quarter?"
- "General Inquiry": broader questions that fit nothing else.
- "Mixed Query": questions that combine several of the above intents."#
    )
}

/// User instruction for intent classification
pub fn classification_user(prompt: &str) -> String {
    format!("Categorize this prompt and return the full JSON object: {}", prompt.trim())
}

/// Prompt handed to the summarize path: the raw question framed with the
/// classified metadata.
pub fn framed_prompt(prompt: &str, intent: &Intent) -> String {
    let mut framed = format!("Prompt: {}\nCategory: {}\n", prompt, intent.category);
    if let Some(ceos) = intent.ceos.as_ref().filter(|c| !c.is_empty()) {
        framed.push_str(&format!("CEOs: {}\n", ceos.join(", ")));
    }
    framed.push_str(&format!("Topic: {}", intent.topic));
    framed
}

pub fn summarize_system() -> String {
    format!(
        "You are a financial analyst who writes complete, accurate summaries of earnings \
calls and financial data. Cover every key point and never stop mid-sentence. {}",
        PLAIN_TEXT_STYLE
    )
}

pub fn summarize_user(framed_prompt: &str, evidence: &str) -> String {
    format!(
        "{}\n\nData to summarize:\n{}\n\nProvide a full summary of the data above.\n{}",
        framed_prompt, evidence, FALLBACK_GUIDANCE
    )
}

pub fn extract_system() -> String {
    format!(
        "You are a financial analyst who extracts every statement relevant to a question from \
financial data and summarizes it completely. {}",
        PLAIN_TEXT_STYLE
    )
}

pub fn extract_user(prompt: &str, topic: &str, evidence: &str) -> String {
    format!(
        "The user asked: {}\n\nExtract and summarize every comment related to \"{}\" and to \
the question from the following data:\n{}\n\n{}",
        prompt, topic, evidence, FALLBACK_GUIDANCE
    )
}

pub fn metrics_user(prompt: &str, evidence: &str) -> String {
    format!(
        "The user asked: {}\n\nAnswer it by analysing the following data:\n{}\n\n{} \
Present the relevant figures as a plain-text table.",
        prompt, evidence, FALLBACK_GUIDANCE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(ceos: Option<Vec<String>>) -> Intent {
        Intent {
            category: QueryCategory::CeoComments,
            companies: vec!["Meta".into()],
            ceos,
            topic: "AI".into(),
        }
    }

    #[test]
    fn test_classification_system_lists_every_category() {
        let system = classification_system(&QueryCategory::ALL);
        for category in QueryCategory::ALL {
            assert!(system.contains(&format!("\"{}\"", category.label())));
        }
    }

    #[test]
    fn test_framed_prompt_with_ceos() {
        let framed = framed_prompt(
            "What did Zuckerberg say?",
            &intent(Some(vec!["Mark Zuckerberg".into()])),
        );
        assert_eq!(
            framed,
            "Prompt: What did Zuckerberg say?\nCategory: CEO Comments\nCEOs: Mark Zuckerberg\nTopic: AI"
        );
    }

    #[test]
    fn test_framed_prompt_without_ceos() {
        let framed = framed_prompt("q", &intent(None));
        assert!(!framed.contains("CEOs"));
        assert!(framed.ends_with("Topic: AI"));
    }
}
