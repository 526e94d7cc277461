//! Keyword heuristics that decide whether a chat question also wants numbers.
//!
//! The ticker rule (first run of 2-5 capitals) misfires on ordinary acronyms
//! such as "CEO" or "USA". It is kept as-is: a wrong guess costs one extra
//! forecast/recommendation round trip and a clearly labelled follow-up message.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpRequest {
    pub ticker: String,
}

fn intent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(pr[eé]vision|forecast|reco|recommendation)\b")
            .expect("intent regex is valid")
    })
}

fn ticker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("ticker regex is valid"))
}

pub fn has_forecast_intent(text: &str) -> bool {
    intent_re().is_match(text)
}

pub fn detect_ticker(text: &str) -> Option<&str> {
    ticker_re().find(text).map(|m| m.as_str())
}

/// Both an intent keyword and a ticker-looking word are required.
pub fn detect_mcp_request(text: &str) -> Option<McpRequest> {
    if !has_forecast_intent(text) {
        return None;
    }
    detect_ticker(text).map(|t| McpRequest {
        ticker: t.to_string(),
    })
}
