//! Chart rendering for feature distributions.
//!
//! Every series is drawn as a smoothed line over a filled area. The visual
//! parameters are fixed: linear auto-ranged axes, monotone interpolation,
//! no point markers, and a legend in the bottom-right corner.

use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition},
};

use crate::series::{ChartSeries, SeriesBounds};
use crate::widgets;

pub const X_AXIS_TITLE: &str = "transportation";
pub const Y_AXIS_TITLE: &str = "count";

/// Series colors, cycled in series order.
const PALETTE: [Color; 6] = [
    Color::Rgb(0xe8, 0xc1, 0xa0),
    Color::Rgb(0xf4, 0x75, 0x60),
    Color::Rgb(0xf1, 0xe1, 0x5b),
    Color::Rgb(0xe8, 0xa8, 0x38),
    Color::Rgb(0x61, 0xcd, 0xbb),
    Color::Rgb(0x97, 0xe3, 0xd5),
];

/// Interpolated points drawn between two consecutive bins.
const MIN_SAMPLES_PER_SEGMENT: usize = 4;

/// Rows of a chart area the legend cannot use: the outer block border (2),
/// x labels and axis line (2), axis titles (2) and the legend border (2).
const LEGEND_RESERVED_ROWS: u16 = 8;

/// How many legend entries fit in a chart drawn into `height` rows, and how
/// many series are left over for the "+N more" entry.
pub fn legend_split(series: usize, height: u16) -> (usize, usize) {
    let capacity = height.saturating_sub(LEGEND_RESERVED_ROWS) as usize;
    if series <= capacity {
        (series, 0)
    } else {
        let shown = capacity.saturating_sub(1);
        (shown, series - shown)
    }
}

/// Monotone cubic Hermite interpolation (Steffen's method). The curve passes
/// through every knot and never overshoots between two of them.
pub struct MonotoneCurve {
    xs: Vec<f64>,
    ys: Vec<f64>,
    tangents: Vec<f64>,
}

impl MonotoneCurve {
    /// Returns `None` unless x is strictly increasing over at least two
    /// points.
    pub fn new(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 || points.windows(2).any(|w| !(w[1].0 > w[0].0)) {
            return None;
        }
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let n = xs.len();

        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let d: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

        let mut tangents = vec![0.0; n];
        if n == 2 {
            tangents[0] = d[0];
            tangents[1] = d[0];
        } else {
            for i in 1..n - 1 {
                let p = (d[i - 1] * h[i] + d[i] * h[i - 1]) / (h[i - 1] + h[i]);
                // local extrema and flat neighbours get a zero tangent
                tangents[i] = if d[i - 1] * d[i] <= 0.0 {
                    0.0
                } else {
                    2.0 * d[i].signum() * d[i - 1].abs().min(d[i].abs()).min(0.5 * p.abs())
                };
            }
            tangents[0] = end_tangent(d[0], h[0], h[1], d[1]);
            tangents[n - 1] = end_tangent(d[n - 2], h[n - 2], h[n - 3], d[n - 3]);
        }

        Some(Self { xs, ys, tangents })
    }

    /// Value of the curve at `x`, clamped to the knot range.
    pub fn eval(&self, x: f64) -> f64 {
        let last = self.xs.len() - 1;
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[last] {
            return self.ys[last];
        }
        let k = self.xs.partition_point(|&xk| xk <= x) - 1;
        self.hermite(k, x)
    }

    /// The knots plus `per_segment - 1` evenly spaced points inside each
    /// segment.
    pub fn sample(&self, per_segment: usize) -> Vec<(f64, f64)> {
        let per_segment = per_segment.max(1);
        let mut out = Vec::with_capacity((self.xs.len() - 1) * per_segment + 1);
        for k in 0..self.xs.len() - 1 {
            let h = self.xs[k + 1] - self.xs[k];
            for s in 0..per_segment {
                let x = self.xs[k] + h * s as f64 / per_segment as f64;
                out.push((x, self.hermite(k, x)));
            }
        }
        let last = self.xs.len() - 1;
        out.push((self.xs[last], self.ys[last]));
        out
    }

    fn hermite(&self, k: usize, x: f64) -> f64 {
        let h = self.xs[k + 1] - self.xs[k];
        let t = (x - self.xs[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;
        (2.0 * t3 - 3.0 * t2 + 1.0) * self.ys[k]
            + (t3 - 2.0 * t2 + t) * h * self.tangents[k]
            + (-2.0 * t3 + 3.0 * t2) * self.ys[k + 1]
            + (t3 - t2) * h * self.tangents[k + 1]
    }
}

/// One-sided tangent at an end knot, limited so the end segment stays
/// monotone.
fn end_tangent(d0: f64, h0: f64, h1: f64, d1: f64) -> f64 {
    let p = d0 * (1.0 + h0 / (h0 + h1)) - d1 * (h0 / (h0 + h1));
    if p * d0 <= 0.0 {
        0.0
    } else if p.abs() > 2.0 * d0.abs() {
        2.0 * d0
    } else {
        p
    }
}

/// Smooth a series for drawing. Series that cannot be interpolated (fewer
/// than two points, or unsorted bins) are drawn as given.
pub fn smooth(points: &[(f64, f64)], per_segment: usize) -> Vec<(f64, f64)> {
    match MonotoneCurve::new(points) {
        Some(curve) => curve.sample(per_segment),
        None => points.to_vec(),
    }
}

struct PlotSeries {
    id: String,
    points: Vec<(f64, f64)>,
    color: Color,
}

/// Chart-ready series with their computed bounds.
pub struct FeatureChart {
    series: Vec<PlotSeries>,
    bounds: SeriesBounds,
}

impl FeatureChart {
    /// `plot_width` is the drawable width in cells; it sets how densely the
    /// curves are sampled so the filled areas have no gaps.
    pub fn new(series: &[ChartSeries], plot_width: u16) -> Self {
        let bounds = SeriesBounds::of(series);
        // two braille dots per cell
        let columns = plot_width as usize * 2;

        let series = series
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let raw = s.xy();
                let segments = raw.len().saturating_sub(1).max(1);
                let per_segment = (columns / segments).max(MIN_SAMPLES_PER_SEGMENT);
                PlotSeries {
                    id: s.id.clone(),
                    points: smooth(&raw, per_segment),
                    color: PALETTE[i % PALETTE.len()],
                }
            })
            .collect();

        Self { series, bounds }
    }

    pub fn bounds(&self) -> SeriesBounds {
        self.bounds
    }

    pub fn render(&self, f: &mut Frame, area: Rect, title: &str) {
        let axis_style = Style::default().fg(Color::Gray);

        // Areas first so the lines draw on top. Unnamed datasets stay out of
        // the legend.
        let mut datasets: Vec<Dataset> = self
            .series
            .iter()
            .map(|s| {
                Dataset::default()
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Bar)
                    .style(Style::default().fg(s.color).add_modifier(Modifier::DIM))
                    .data(&s.points)
            })
            .collect();
        // Only the first `named` lines get a legend entry so the legend
        // always fits; the rest are summed up in one extra entry.
        let (named, more) = legend_split(self.series.len(), area.height);
        datasets.extend(self.series.iter().enumerate().map(|(i, s)| {
            let line = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(s.color))
                .data(&s.points);
            if i < named {
                line.name(s.id.clone())
            } else {
                line
            }
        }));
        if more > 0 && area.height > LEGEND_RESERVED_ROWS {
            datasets.push(
                Dataset::default()
                    .name(format!("+{} more", more))
                    .style(Style::default().fg(Color::DarkGray))
                    .data(&[]),
            );
        }

        let x_axis = Axis::default()
            .title(Span::styled(X_AXIS_TITLE, axis_style))
            .style(axis_style)
            .bounds(self.bounds.x)
            .labels(widgets::axis_labels(self.bounds.x));
        let y_axis = Axis::default()
            .title(Span::styled(Y_AXIS_TITLE, axis_style))
            .style(axis_style)
            .bounds(self.bounds.y)
            .labels(widgets::axis_labels(self.bounds.y));

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(Span::styled(
                        format!(" {} ", title),
                        Style::default().fg(Color::White).bold(),
                    )),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(Some(LegendPosition::BottomRight))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 1)));

        f.render_widget(chart, area);
    }
}
