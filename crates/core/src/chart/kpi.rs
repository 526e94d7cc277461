use crate::chart::escape_html;
use crate::domain::forecast::ForecastResponse;
use crate::domain::recommendation::RecommendationResponse;

const MISSING: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

impl Kpi {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

fn fmt_value(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| MISSING.to_string())
}

pub fn dashboard_kpis(forecast: &ForecastResponse, rec: &RecommendationResponse) -> Vec<Kpi> {
    let last = forecast.last_history();
    vec![
        Kpi::new("Last close", fmt_value(last.map(|p| p.value))),
        Kpi::new("EMA", fmt_value(last.and_then(|p| p.ema))),
        Kpi::new(
            format!("Projected ({}d)", forecast.forecast.len()),
            fmt_value(forecast.projected_value()),
        ),
        Kpi::new(
            "Last deviation",
            forecast
                .metrics
                .last_deviation
                .map(|v| format!("{v:+.4}"))
                .unwrap_or_else(|| MISSING.to_string()),
        ),
        Kpi::new("Recommendation", rec.headline()),
    ]
}

pub fn render_grid(items: &[Kpi]) -> String {
    let mut out = String::from(r#"<div class="kpi-grid">"#);
    for k in items {
        out.push_str(&format!(
            r#"<div class="card"><div class="muted">{}</div><div class="kpi-value">{}</div></div>"#,
            escape_html(&k.label),
            escape_html(&k.value),
        ));
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::{ForecastMetrics, ForecastPoint, HistoryPoint};
    use crate::domain::recommendation::Action;

    fn rec() -> RecommendationResponse {
        RecommendationResponse {
            ticker: "AAPL".to_string(),
            window: 14,
            action: Action::Buy,
            confidence: 0.128,
            rationale: "price vs EMA delta=2.6000".to_string(),
        }
    }

    #[test]
    fn derives_values_from_last_points() {
        let forecast = ForecastResponse {
            ticker: "AAPL".to_string(),
            history: vec![HistoryPoint {
                ts: "2026-01-06T00:00:00".to_string(),
                value: 103.0,
                ema: Some(100.4),
            }],
            forecast: vec![ForecastPoint {
                ts: "2026-01-07T00:00:00".to_string(),
                value: 100.4,
            }],
            metrics: ForecastMetrics {
                last_deviation: Some(2.6),
                window: Some(14),
            },
        };

        let kpis = dashboard_kpis(&forecast, &rec());
        let values: Vec<&str> = kpis.iter().map(|k| k.value.as_str()).collect();
        assert_eq!(values, vec!["103.00", "100.40", "100.40", "+2.6000", "BUY (13%)"]);
        assert_eq!(kpis[2].label, "Projected (1d)");
    }

    #[test]
    fn missing_values_render_dash() {
        let forecast = ForecastResponse {
            ticker: "AAPL".to_string(),
            history: Vec::new(),
            forecast: Vec::new(),
            metrics: ForecastMetrics::default(),
        };
        let kpis = dashboard_kpis(&forecast, &rec());
        assert!(kpis[..4].iter().all(|k| k.value == MISSING));
        assert!(render_grid(&kpis).contains("Last deviation"));
    }
}
