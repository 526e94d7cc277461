use crate::domain::chat::{ChatReply, HealthStatus};
use crate::domain::forecast::ForecastResponse;
use crate::domain::recommendation::RecommendationResponse;

pub mod client;
pub mod error;

pub use client::ApiClient;

pub const DEFAULT_HORIZON_DAYS: u32 = 7;
pub const DEFAULT_WINDOW: u32 = 14;

pub const CHAT_PATH: &str = "/api/v1/chat";
pub const FORECAST_PATH: &str = "/api/v1/mcp/forecast";
pub const RECOMMENDATION_PATH: &str = "/api/v1/mcp/recommendation";
pub const HEALTH_PATH: &str = "/api/v1/health";

/// The backend endpoints the dashboard and chatbot consume.
///
/// Every call is independent: no retries, no caching, no deduplication.
#[async_trait::async_trait]
pub trait MarketApi: Send + Sync {
    async fn send_chat(&self, message: &str) -> anyhow::Result<ChatReply>;

    async fn fetch_forecast(
        &self,
        ticker: &str,
        horizon_days: u32,
        window: u32,
    ) -> anyhow::Result<ForecastResponse>;

    async fn fetch_recommendation(
        &self,
        ticker: &str,
        window: u32,
    ) -> anyhow::Result<RecommendationResponse>;

    async fn fetch_health(&self) -> anyhow::Result<HealthStatus>;
}
