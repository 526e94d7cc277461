use crate::api::error::user_message;
use crate::api::{MarketApi, DEFAULT_HORIZON_DAYS, DEFAULT_WINDOW};
use crate::chat::intent::detect_mcp_request;
use crate::domain::chat::ChatMessage;
use crate::domain::forecast::ForecastResponse;
use crate::domain::recommendation::RecommendationResponse;
use std::sync::Arc;

pub const CHAT_ERROR_TEXT: &str = "Error while calling the chatbot.";
pub const MCP_ERROR_TEXT: &str = "(MCP) Unable to compute the forecast/recommendation right now.";

/// One conversation: the message list plus the backend it talks to.
pub struct ChatSession {
    api: Arc<dyn MarketApi>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        Self {
            api,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Runs one chat turn and returns the messages it appended.
    ///
    /// Failures become assistant messages; nothing is returned as an error.
    pub async fn send(&mut self, input: &str) -> &[ChatMessage] {
        let start = self.messages.len();
        let question = input.trim();
        if question.is_empty() {
            return &self.messages[start..];
        }

        self.messages.push(ChatMessage::user(question));

        match self.api.send_chat(question).await {
            Ok(reply) => {
                self.messages
                    .push(ChatMessage::assistant(reply.reply).with_sources(reply.sources));

                if let Some(req) = detect_mcp_request(question) {
                    let text = self.mcp_summary(&req.ticker).await;
                    self.messages.push(ChatMessage::assistant(text));
                }
            }
            Err(err) => {
                tracing::warn!(error = %user_message(&err), "chat request failed");
                self.messages.push(ChatMessage::assistant(CHAT_ERROR_TEXT));
            }
        }

        &self.messages[start..]
    }

    async fn mcp_summary(&self, ticker: &str) -> String {
        let (forecast, rec) = tokio::join!(
            self.api
                .fetch_forecast(ticker, DEFAULT_HORIZON_DAYS, DEFAULT_WINDOW),
            self.api.fetch_recommendation(ticker, DEFAULT_WINDOW),
        );

        match (forecast, rec) {
            (Ok(forecast), Ok(rec)) => summary_text(ticker, &forecast, &rec),
            (forecast, rec) => {
                if let Err(err) = &forecast {
                    tracing::warn!(%ticker, error = %err, "chat follow-up forecast failed");
                }
                if let Err(err) = &rec {
                    tracing::warn!(%ticker, error = %err, "chat follow-up recommendation failed");
                }
                MCP_ERROR_TEXT.to_string()
            }
        }
    }
}

pub fn summary_text(ticker: &str, forecast: &ForecastResponse, rec: &RecommendationResponse) -> String {
    let projected = forecast
        .projected_value()
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "—".to_string());

    format!(
        "Forecast {ticker} ({DEFAULT_HORIZON_DAYS}d): projected value ~ {projected}; Reco: {}, {}",
        rec.headline(),
        rec.rationale
    )
}
