//! SVG rendering for the dashboard.
//!
//! Everything here is a pure function of its input points: no I/O, no state.

use std::fmt::Write;

pub mod forecast;
pub mod kpi;
pub mod sentiment;

pub use forecast::ForecastChart;
pub use kpi::Kpi;
pub use sentiment::{SentimentChart, SentimentPoint};

pub const NO_DATA: &str = "No data";

/// Outer size and padding of a drawing, in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub pad: f64,
}

impl Frame {
    /// Horizontal position of the `i`-th of `n` evenly spaced points.
    pub fn x(&self, i: usize, n: usize) -> f64 {
        let steps = n.saturating_sub(1).max(1) as f64;
        self.pad + (i as f64) * (self.width - 2.0 * self.pad) / steps
    }

    pub fn top(&self) -> f64 {
        self.pad
    }

    pub fn bottom(&self) -> f64 {
        self.height - self.pad
    }
}

/// Linear vertical scale over `[min, max]`, larger values drawn higher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YScale {
    pub min: f64,
    pub max: f64,
}

impl YScale {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self { min, max })
    }

    /// Widen the range so it covers `[lo, hi]` too.
    pub fn include(self, lo: f64, hi: f64) -> Self {
        Self {
            min: self.min.min(lo),
            max: self.max.max(hi),
        }
    }

    pub fn y(&self, frame: &Frame, v: f64) -> f64 {
        let range = self.max - self.min;
        // Flat series: everything sits on the bottom edge.
        let range = if range == 0.0 || !range.is_finite() {
            1.0
        } else {
            range
        };
        frame.height - frame.pad - ((v - self.min) / range) * (frame.height - 2.0 * frame.pad)
    }
}

/// `M x y L x y ...` through consecutive points.
pub fn line_path<I: IntoIterator<Item = (f64, f64)>>(points: I) -> String {
    let mut d = String::new();
    for (idx, (x, y)) in points.into_iter().enumerate() {
        if idx != 0 {
            d.push(' ');
        }
        let cmd = if idx == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd} {x:.2} {y:.2}");
    }
    d
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathSpec {
    pub name: &'static str,
    pub d: String,
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub frame: Frame,
    pub title: String,
    pub lines: Vec<Line>,
    pub paths: Vec<PathSpec>,
    pub caption: String,
}

impl Drawing {
    pub fn path(&self, name: &str) -> Option<&PathSpec> {
        self.paths.iter().find(|p| p.name == name)
    }

    /// Standalone `<svg>` element.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.frame.width,
            h = self.frame.height,
        );
        for l in &self.lines {
            let _ = write!(
                out,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}"/>"#,
                l.x1, l.y1, l.x2, l.y2, l.stroke
            );
        }
        for p in &self.paths {
            let _ = write!(
                out,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}""#,
                p.d, p.stroke, p.stroke_width
            );
            if let Some(dash) = p.dash {
                let _ = write!(out, r#" stroke-dasharray="{dash}""#);
            }
            out.push_str("/>");
        }
        out.push_str("</svg>");
        out
    }
}

/// A chart is either a drawing or the placeholder shown for empty input.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    NoData,
    Drawing(Drawing),
}

impl Chart {
    pub fn drawing(&self) -> Option<&Drawing> {
        match self {
            Chart::Drawing(d) => Some(d),
            Chart::NoData => None,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Chart::NoData => format!(r#"<div class="card">{NO_DATA}</div>"#),
            Chart::Drawing(d) => format!(
                r#"<div class="card"><div class="card-title">{}</div>{}<div class="muted">{}</div></div>"#,
                escape_html(&d.title),
                d.to_svg(),
                escape_html(&d.caption),
            ),
        }
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parses the coordinates back out of a path built by [`line_path`].
#[cfg(test)]
pub(crate) fn path_points(d: &str) -> Vec<(f64, f64)> {
    let tokens: Vec<&str> = d.split_whitespace().collect();
    tokens
        .chunks(3)
        .map(|c| (c[1].parse().unwrap(), c[2].parse().unwrap()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Frame = Frame {
        width: 100.0,
        height: 50.0,
        pad: 10.0,
    };

    #[test]
    fn single_point_sits_on_left_padding() {
        assert_eq!(FRAME.x(0, 1), 10.0);
    }

    #[test]
    fn x_spans_padded_width() {
        assert_eq!(FRAME.x(0, 5), 10.0);
        assert_eq!(FRAME.x(4, 5), 90.0);
    }

    #[test]
    fn y_maps_min_to_bottom_and_max_to_top() {
        let scale = YScale::from_values([3.0, 7.0, 5.0]).unwrap();
        assert_eq!(scale.y(&FRAME, 3.0), FRAME.bottom());
        assert_eq!(scale.y(&FRAME, 7.0), FRAME.top());
        assert_eq!(scale.y(&FRAME, 5.0), 25.0);
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let scale = YScale::from_values([4.2, 4.2]).unwrap();
        let y = scale.y(&FRAME, 4.2);
        assert!(y.is_finite());
        assert_eq!(y, FRAME.bottom());
    }

    #[test]
    fn empty_values_have_no_scale() {
        assert!(YScale::from_values(std::iter::empty()).is_none());
    }

    #[test]
    fn line_path_moves_then_draws() {
        let d = line_path([(1.0, 2.0), (3.5, 4.25)]);
        assert_eq!(d, "M 1.00 2.00 L 3.50 4.25");
        assert_eq!(path_points(&d), vec![(1.0, 2.0), (3.5, 4.25)]);
    }

    #[test]
    fn placeholder_html_for_no_data() {
        assert!(Chart::NoData.to_html().contains(NO_DATA));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
