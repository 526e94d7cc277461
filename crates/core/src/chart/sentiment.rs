use crate::chart::{line_path, Chart, Drawing, Frame, Line, PathSpec, YScale};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: String,
    pub sentiment_avg: f64,
    pub volume: u64,
}

/// Daily average sentiment; the scale always covers [-1, 1].
#[derive(Debug, Clone)]
pub struct SentimentChart {
    pub frame: Frame,
    pub title: String,
}

impl Default for SentimentChart {
    fn default() -> Self {
        Self {
            frame: Frame {
                width: 600.0,
                height: 180.0,
                pad: 24.0,
            },
            title: "Sentiment (daily average)".to_string(),
        }
    }
}

impl SentimentChart {
    pub fn render(&self, series: &[SentimentPoint]) -> Chart {
        let Some(scale) = YScale::from_values(series.iter().map(|p| p.sentiment_avg)) else {
            return Chart::NoData;
        };
        let scale = scale.include(-1.0, 1.0);
        let frame = self.frame;
        let n = series.len();

        let d = line_path(
            series
                .iter()
                .enumerate()
                .map(|(i, p)| (frame.x(i, n), scale.y(&frame, p.sentiment_avg))),
        );
        let zero = scale.y(&frame, 0.0);

        Chart::Drawing(Drawing {
            frame,
            title: self.title.clone(),
            lines: vec![Line {
                x1: frame.pad,
                y1: zero,
                x2: frame.width - frame.pad,
                y2: zero,
                stroke: "#ddd",
            }],
            paths: vec![PathSpec {
                name: "sentiment",
                d,
                stroke: "#2563eb",
                stroke_width: 2.0,
                dash: None,
            }],
            caption: format!("{} → {}", series[0].date, series[n - 1].date),
        })
    }
}
