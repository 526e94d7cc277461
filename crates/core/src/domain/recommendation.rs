use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub ticker: String,
    pub window: u32,
    pub action: Action,
    pub confidence: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Neutral,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RecommendationResponse {
    /// Confidence as a whole percentage, e.g. `0.734` -> `73`.
    ///
    /// The backend clamps confidence; no validation happens here.
    pub fn confidence_pct(&self) -> i64 {
        (self.confidence * 100.0).round() as i64
    }

    /// `BUY (73%)`
    pub fn headline(&self) -> String {
        format!(
            "{} ({}%)",
            self.action.as_str().to_uppercase(),
            self.confidence_pct()
        )
    }
}
