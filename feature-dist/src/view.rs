use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::chart::FeatureChart;
use crate::config::DEFAULT_CHART_HEIGHT;
use crate::fetcher::{FetchState, Fetcher};
use crate::series::{build_series_with, ChartSeries, SeriesIds};
use crate::widgets;

/// What the distribution widget shows.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderState {
    /// A fetch is outstanding: draw the progress indicator.
    Loading,
    /// Nothing to plot: draw nothing at all.
    Empty,
    Ready(Vec<ChartSeries>),
    Failed(String),
}

/// Pick the render state for the requested features.
pub fn select(requested: &[String], state: FetchState<'_>, ids: SeriesIds) -> RenderState {
    match state {
        FetchState::Loading => RenderState::Loading,
        FetchState::Failed(e) => RenderState::Failed(e.to_string()),
        FetchState::Done(data) if data.is_empty() => RenderState::Empty,
        FetchState::Done(data) => {
            let series = build_series_with(requested, data, ids);
            if series.is_empty() {
                RenderState::Empty
            } else {
                RenderState::Ready(series)
            }
        }
    }
}

/// Per-life histograms of the requested features, overlaid on one chart.
pub struct FeatureDistribution {
    fetcher: Fetcher,
    series_ids: SeriesIds,
    height: u16,
    frame: usize,
}

impl FeatureDistribution {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            series_ids: SeriesIds::PerFeature,
            height: DEFAULT_CHART_HEIGHT,
            frame: 0,
        }
    }

    pub fn series_ids(mut self, ids: SeriesIds) -> Self {
        self.series_ids = ids;
        self
    }

    pub fn height(mut self, rows: u16) -> Self {
        self.height = rows.max(3);
        self
    }

    pub fn features(&self) -> &[String] {
        self.fetcher.features()
    }

    /// Mount or change the feature list; refetches only on an actual change.
    pub fn set_features(&mut self, features: Vec<String>) -> bool {
        self.fetcher.set_features(features)
    }

    /// Re-issue the fetch for the current features.
    pub fn refresh(&mut self) {
        self.fetcher.request();
    }

    pub fn is_loading(&self) -> bool {
        self.fetcher.is_loading()
    }

    pub fn generation(&self) -> u64 {
        self.fetcher.generation()
    }

    /// Seconds since the last completed fetch, if any.
    pub fn updated_secs_ago(&self) -> Option<u64> {
        self.fetcher.updated_at().map(|t| t.elapsed().as_secs())
    }

    /// Apply finished fetches and advance the spinner. Returns true when a
    /// redraw is needed.
    pub fn tick(&mut self) -> bool {
        let changed = self.fetcher.poll();
        if self.fetcher.is_loading() {
            self.frame = self.frame.wrapping_add(1);
            return true;
        }
        changed
    }

    pub fn render_state(&self) -> RenderState {
        select(self.fetcher.features(), self.fetcher.state(), self.series_ids)
    }

    /// Draw into the top of `area`, at most the configured height.
    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let area = Rect {
            height: area.height.min(self.height),
            ..area
        };

        match self.render_state() {
            RenderState::Loading => {
                let line = Line::from(Span::styled(
                    format!("  {}", widgets::spinner(self.frame)),
                    Style::default().fg(Color::Yellow).bold(),
                ));
                f.render_widget(Paragraph::new(vec![Line::from(""), line]), area);
            }
            RenderState::Empty => {}
            RenderState::Ready(series) => {
                let chart = FeatureChart::new(&series, area.width.saturating_sub(10));
                chart.render(f, area, &self.fetcher.features().join(", "));
            }
            RenderState::Failed(msg) => {
                let text = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "  Could not load distributions",
                        Style::default().fg(Color::Red).bold(),
                    )),
                    Line::from(Span::styled(
                        format!("  {}", msg),
                        Style::default().fg(Color::DarkGray),
                    )),
                ];
                f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), area);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::backend::TestBackend;

    use super::*;
    use crate::error::FetchError;
    use crate::fetcher::tests::{names, one_feature, poll_until, GatedSource, StaticSource};
    use crate::histogram::{Distribution, HistogramResponse};
    use crate::series::Point;

    fn screen(widget: &FeatureDistribution) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                widget.draw(f, area);
            })
            .unwrap();
        let buf = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn age_response() -> HistogramResponse {
        let mut data = HistogramResponse::new();
        data.insert(
            "age",
            vec![
                Distribution::new(vec![0.0, 1.0, 2.0], vec![5.0, 7.0, 9.0]),
                Distribution::new(vec![0.0, 1.0], vec![2.0, 4.0]),
            ],
        );
        data
    }

    #[test]
    fn select_follows_fetch_state() {
        let data = age_response();
        let requested = names(&["age"]);

        assert_eq!(
            select(&requested, FetchState::Loading, SeriesIds::PerFeature),
            RenderState::Loading
        );
        assert_eq!(
            select(&requested, FetchState::Done(&HistogramResponse::new()), SeriesIds::PerFeature),
            RenderState::Empty
        );
        assert_eq!(
            select(&[], FetchState::Done(&data), SeriesIds::PerFeature),
            RenderState::Empty
        );

        let err = FetchError::Timeout(std::time::Duration::from_secs(30));
        assert_eq!(
            select(&requested, FetchState::Failed(&err), SeriesIds::PerFeature),
            RenderState::Failed("no response after 30s".into())
        );

        match select(&requested, FetchState::Done(&data), SeriesIds::PerFeature) {
            RenderState::Ready(series) => {
                assert_eq!(series.len(), 2);
                assert_eq!(series[0].id, "Life 0");
                assert_eq!(series[1].id, "Life 1");
                assert_eq!(
                    series[1].data,
                    vec![Point { x: 0.0, y: 2.0 }, Point { x: 1.0, y: 4.0 }]
                );
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn absent_requested_features_render_nothing() {
        let data = one_feature("speed", vec![0.0, 1.0], vec![3.0, 4.0]);
        assert!(!data.is_empty());
        assert_eq!(
            select(&names(&["age", "weight"]), FetchState::Done(&data), SeriesIds::PerFeature),
            RenderState::Empty
        );

        let mut widget = FeatureDistribution::new(Fetcher::new(Arc::new(StaticSource(data))));
        widget.set_features(names(&["age"]));
        poll_until(&mut widget.fetcher, |f| !f.is_loading());
        assert_eq!(widget.render_state(), RenderState::Empty);
        assert!(screen(&widget).chars().all(|c| c == ' ' || c == '\n'));
    }

    #[test]
    fn draws_spinner_while_loading() {
        let source = Arc::new(GatedSource::new());
        let _gate = source.gate("age");
        let mut widget = FeatureDistribution::new(Fetcher::new(source.clone()));
        widget.set_features(names(&["age"]));

        assert_eq!(widget.render_state(), RenderState::Loading);
        assert!(widget.tick());
        assert!(screen(&widget).contains("Loading distributions"));
    }

    #[test]
    fn draws_nothing_for_empty_data() {
        let mut widget =
            FeatureDistribution::new(Fetcher::new(Arc::new(StaticSource(HistogramResponse::new()))));
        widget.set_features(names(&["age"]));
        poll_until(&mut widget.fetcher, |f| !f.is_loading());

        assert_eq!(widget.render_state(), RenderState::Empty);
        assert!(screen(&widget).chars().all(|c| c == ' ' || c == '\n'));
    }

    #[test]
    fn draws_chart_when_ready() {
        let mut widget = FeatureDistribution::new(Fetcher::new(Arc::new(StaticSource(age_response()))));
        widget.set_features(names(&["age"]));
        poll_until(&mut widget.fetcher, |f| !f.is_loading());

        let text = screen(&widget);
        assert!(text.contains("Life 0"));
        assert!(text.contains("Life 1"));
        assert!(text.contains("count"));
    }

    #[test]
    fn chart_height_is_fixed() {
        let mut widget = FeatureDistribution::new(Fetcher::new(Arc::new(StaticSource(age_response()))))
            .height(12);
        widget.set_features(names(&["age"]));
        poll_until(&mut widget.fetcher, |f| !f.is_loading());

        let text = screen(&widget);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[11].contains('└'));
        assert!(rows[12..].iter().all(|r| r.trim().is_empty()));
    }

    #[test]
    fn draws_failure_distinctly() {
        let source = Arc::new(GatedSource::new());
        let gate = source.gate("age");
        let mut widget = FeatureDistribution::new(Fetcher::new(source.clone()));
        widget.set_features(names(&["age"]));
        gate.send(Err(FetchError::Connect {
            addr: "tcp:127.0.0.1:1".into(),
            reason: "refused".into(),
        }))
        .unwrap();
        poll_until(&mut widget.fetcher, |f| !f.is_loading());

        let text = screen(&widget);
        assert!(text.contains("Could not load distributions"));
        assert!(text.contains("refused"));
    }

    #[test]
    fn switching_features_refetches_and_drops_absent_ones() {
        let source = Arc::new(GatedSource::new());
        let age_gate = source.gate("age");
        let mut widget = FeatureDistribution::new(Fetcher::new(source.clone()));
        widget.set_features(names(&["age"]));
        age_gate.send(Ok(age_response())).unwrap();
        poll_until(&mut widget.fetcher, |f| !f.is_loading());

        let speed_gate = source.gate("speed");
        assert!(widget.set_features(names(&["speed"])));
        assert_eq!(widget.render_state(), RenderState::Loading);

        speed_gate
            .send(Ok(one_feature("speed", vec![1.0, 2.0], vec![3.0, 4.0])))
            .unwrap();
        poll_until(&mut widget.fetcher, |f| !f.is_loading());
        match widget.render_state() {
            RenderState::Ready(series) => {
                assert_eq!(series.len(), 1);
                assert_eq!(series[0].id, "Life 0");
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }
}
