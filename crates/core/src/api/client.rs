use crate::api::error::{ApiError, ApiErrorKind};
use crate::api::{MarketApi, CHAT_PATH, FORECAST_PATH, HEALTH_PATH, RECOMMENDATION_PATH};
use crate::config::Settings;
use crate::domain::chat::{ChatReply, HealthStatus};
use crate::domain::contract::{ChatReplyWire, HealthWire};
use crate::domain::forecast::ForecastResponse;
use crate::domain::recommendation::RecommendationResponse;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const MAX_DETAIL_LEN: usize = 300;

/// Thin JSON client bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.api_base_url.clone(),
            Duration::from_secs(settings.api_timeout_secs),
        )
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build backend http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn get_json<T, Q>(&self, endpoint: &'static str, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let res = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| network_error(endpoint, e))?;
        decode(endpoint, res).await
    }

    pub async fn post_json<T, B>(&self, endpoint: &'static str, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let res = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(endpoint, e))?;
        decode(endpoint, res).await
    }
}

fn network_error(endpoint: &'static str, err: reqwest::Error) -> anyhow::Error {
    ApiError {
        endpoint,
        kind: ApiErrorKind::Network,
        detail: err.to_string(),
    }
    .into()
}

async fn decode<T: DeserializeOwned>(endpoint: &'static str, res: reqwest::Response) -> Result<T> {
    let status = res.status();
    let text = res.text().await.map_err(|e| network_error(endpoint, e))?;

    if !status.is_success() {
        return Err(ApiError {
            endpoint,
            kind: ApiErrorKind::Status(status.as_u16()),
            detail: error_detail(&text),
        }
        .into());
    }

    serde_json::from_str::<T>(&text).map_err(|e| {
        ApiError {
            endpoint,
            kind: ApiErrorKind::Decode,
            detail: e.to_string(),
        }
        .into()
    })
}

/// FastAPI errors arrive as `{"detail": "..."}`; anything else is passed through truncated.
fn error_detail(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = v.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_DETAIL_LEN).collect()
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ForecastRequest<'a> {
    ticker: &'a str,
    horizon_days: u32,
    window: u32,
}

#[async_trait::async_trait]
impl MarketApi for ApiClient {
    async fn send_chat(&self, message: &str) -> Result<ChatReply> {
        let wire: ChatReplyWire = self
            .post_json("chat", CHAT_PATH, &ChatRequest { message })
            .await?;
        Ok(wire.into_reply())
    }

    async fn fetch_forecast(
        &self,
        ticker: &str,
        horizon_days: u32,
        window: u32,
    ) -> Result<ForecastResponse> {
        tracing::debug!(%ticker, horizon_days, window, "fetching forecast");
        self.post_json(
            "forecast",
            FORECAST_PATH,
            &ForecastRequest {
                ticker,
                horizon_days,
                window,
            },
        )
        .await
    }

    async fn fetch_recommendation(&self, ticker: &str, window: u32) -> Result<RecommendationResponse> {
        tracing::debug!(%ticker, window, "fetching recommendation");
        self.get_json(
            "recommendation",
            RECOMMENDATION_PATH,
            &[("ticker", ticker.to_string()), ("window", window.to_string())],
        )
        .await
    }

    async fn fetch_health(&self) -> Result<HealthStatus> {
        let wire: HealthWire = self
            .get_json("health", HEALTH_PATH, &[] as &[(&str, &str)])
            .await?;
        Ok(wire.into_status())
    }
}
