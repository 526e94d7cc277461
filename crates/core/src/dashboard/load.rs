use crate::api::error::user_message;
use crate::api::{MarketApi, DEFAULT_HORIZON_DAYS, DEFAULT_WINDOW};
use crate::chart::kpi::{dashboard_kpis, Kpi};
use crate::chart::{Chart, ForecastChart};
use crate::domain::forecast::ForecastResponse;
use crate::domain::recommendation::RecommendationResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardParams {
    pub ticker: String,
    pub horizon_days: u32,
    pub window: u32,
}

impl DashboardParams {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_horizon(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }
}

/// Forecast and recommendation for the same parameters; never shown apart.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub forecast: ForecastResponse,
    pub recommendation: RecommendationResponse,
}

impl DashboardData {
    pub fn kpis(&self) -> Vec<Kpi> {
        dashboard_kpis(&self.forecast, &self.recommendation)
    }

    pub fn chart(&self) -> Chart {
        ForecastChart::default().render(&self.forecast.history, &self.forecast.forecast)
    }
}

/// Issues both requests concurrently and waits for both.
///
/// Either side failing fails the whole load; the error text names which side(s) failed.
pub async fn load_dashboard(
    api: &dyn MarketApi,
    params: &DashboardParams,
) -> Result<DashboardData, String> {
    let (forecast, recommendation) = tokio::join!(
        api.fetch_forecast(&params.ticker, params.horizon_days, params.window),
        api.fetch_recommendation(&params.ticker, params.window),
    );

    match (forecast, recommendation) {
        (Ok(forecast), Ok(recommendation)) => Ok(DashboardData {
            forecast,
            recommendation,
        }),
        (Err(f), Ok(_)) => {
            tracing::warn!(ticker = %params.ticker, error = %f, "forecast failed; discarding recommendation");
            Err(user_message(&f))
        }
        (Ok(_), Err(r)) => {
            tracing::warn!(ticker = %params.ticker, error = %r, "recommendation failed; discarding forecast");
            Err(user_message(&r))
        }
        (Err(f), Err(r)) => {
            tracing::warn!(ticker = %params.ticker, forecast_error = %f, recommendation_error = %r, "dashboard load failed");
            Err(format!("{}; {}", user_message(&f), user_message(&r)))
        }
    }
}
