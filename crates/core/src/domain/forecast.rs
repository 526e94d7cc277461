use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub ticker: String,
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
    #[serde(default)]
    pub forecast: Vec<ForecastPoint>,
    #[serde(default)]
    pub metrics: ForecastMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub ts: String,
    pub value: f64,
    /// Older backends omit the smoothed value; charts fall back to `value`.
    #[serde(default)]
    pub ema: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ts: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    #[serde(default)]
    pub last_deviation: Option<f64>,
    #[serde(default)]
    pub window: Option<u32>,
}

impl ForecastResponse {
    pub fn last_history(&self) -> Option<&HistoryPoint> {
        self.history.last()
    }

    /// Value at the end of the projection horizon.
    pub fn projected_value(&self) -> Option<f64> {
        self.forecast.last().map(|p| p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.forecast.is_empty()
    }
}
