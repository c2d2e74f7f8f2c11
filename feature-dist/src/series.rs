use crate::histogram::HistogramResponse;

/// A single chart point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One renderable line, built from one distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSeries {
    pub id: String,
    pub data: Vec<Point>,
}

impl ChartSeries {
    /// Points as `(x, y)` tuples, the shape ratatui datasets take.
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.data.iter().map(|p| (p.x, p.y)).collect()
    }
}

/// How series ids are derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeriesIds {
    /// `Life <i>`, where `i` restarts at 0 for every feature.
    #[default]
    PerFeature,
    /// `<feature> Life <i>`, unique across features.
    Qualified,
}

impl SeriesIds {
    fn id(self, feature: &str, index: usize) -> String {
        match self {
            SeriesIds::PerFeature => format!("Life {}", index),
            SeriesIds::Qualified => format!("{} Life {}", feature, index),
        }
    }
}

/// Build one series per (feature, distribution) pair, feature order outer and
/// distribution order inner. Features absent from `data` are skipped.
pub fn build_series(requested: &[String], data: &HistogramResponse) -> Vec<ChartSeries> {
    build_series_with(requested, data, SeriesIds::PerFeature)
}

pub fn build_series_with(
    requested: &[String],
    data: &HistogramResponse,
    ids: SeriesIds,
) -> Vec<ChartSeries> {
    requested
        .iter()
        .filter_map(|feature| data.get(feature).map(|dists| (feature, dists)))
        .flat_map(|(feature, dists)| {
            dists.iter().enumerate().map(move |(i, dist)| ChartSeries {
                id: ids.id(feature, i),
                data: dist.pairs().map(|(x, y)| Point { x, y }).collect(),
            })
        })
        .collect()
}

/// Auto-ranged linear bounds over every point of every series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl SeriesBounds {
    pub fn of(series: &[ChartSeries]) -> Self {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in series.iter().flat_map(|s| s.data.iter()) {
            if !p.x.is_finite() || !p.y.is_finite() {
                continue;
            }
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        Self {
            x: widen(x_min, x_max),
            y: widen(y_min, y_max),
        }
    }
}

/// Chart bounds must span a non-zero range.
fn widen(min: f64, max: f64) -> [f64; 2] {
    if min > max {
        [0.0, 1.0]
    } else if min == max {
        [min - 0.5, max + 0.5]
    } else {
        [min, max]
    }
}
