use crate::chart::{line_path, Chart, Drawing, Frame, PathSpec, YScale};
use crate::domain::forecast::{ForecastPoint, HistoryPoint};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const HISTORY_STROKE: &str = "#1f2937";
const EMA_STROKE: &str = "#2563eb";
const FORECAST_STROKE: &str = "#ef4444";

/// History, EMA and projection on a single shared vertical scale.
#[derive(Debug, Clone)]
pub struct ForecastChart {
    pub frame: Frame,
    pub title: String,
}

impl Default for ForecastChart {
    fn default() -> Self {
        Self {
            frame: Frame {
                width: 720.0,
                height: 220.0,
                pad: 32.0,
            },
            title: "Forecast (EMA)".to_string(),
        }
    }
}

impl ForecastChart {
    pub fn render(&self, history: &[HistoryPoint], forecast: &[ForecastPoint]) -> Chart {
        let values = history
            .iter()
            .map(|p| p.value)
            .chain(history.iter().filter_map(|p| p.ema))
            .chain(forecast.iter().map(|p| p.value));
        let Some(scale) = YScale::from_values(values) else {
            return Chart::NoData;
        };

        let frame = self.frame;
        let n = history.len() + forecast.len();
        let x = |i: usize| frame.x(i, n);
        let y = |v: f64| scale.y(&frame, v);

        let history_d = line_path(history.iter().enumerate().map(|(i, p)| (x(i), y(p.value))));
        let ema_d = line_path(
            history
                .iter()
                .enumerate()
                .map(|(i, p)| (x(i), y(p.ema.unwrap_or(p.value)))),
        );

        // The projection starts on the last observed point so the lines join.
        let start = history.len().saturating_sub(1);
        let forecast_d = line_path(
            forecast
                .iter()
                .enumerate()
                .map(|(k, p)| (x(start + k), y(p.value))),
        );

        let caption = format!(
            "History: {} → {} • Horizon: {}d",
            history.first().map(|p| short_ts(&p.ts)).unwrap_or("—".into()),
            history.last().map(|p| short_ts(&p.ts)).unwrap_or("—".into()),
            forecast.len(),
        );

        Chart::Drawing(Drawing {
            frame,
            title: self.title.clone(),
            lines: Vec::new(),
            paths: vec![
                PathSpec {
                    name: "history",
                    d: history_d,
                    stroke: HISTORY_STROKE,
                    stroke_width: 1.5,
                    dash: None,
                },
                PathSpec {
                    name: "ema",
                    d: ema_d,
                    stroke: EMA_STROKE,
                    stroke_width: 2.0,
                    dash: None,
                },
                PathSpec {
                    name: "forecast",
                    d: forecast_d,
                    stroke: FORECAST_STROKE,
                    stroke_width: 2.0,
                    dash: Some("6,6"),
                },
            ],
            caption,
        })
    }
}

/// Date part of a backend timestamp; unparseable input is shown as-is.
fn short_ts(ts: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.date_naive().to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.date().to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(ts, "%Y-%m-%d") {
        return d.to_string();
    }
    ts.to_string()
}
