//! feature-dist: per-life feature histograms in the terminal.

use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use feature_dist::api_client::DatasetApi;
use feature_dist::app::App;
use feature_dist::config::Config;
use feature_dist::fetcher::Fetcher;
use feature_dist::input;
use feature_dist::ui;
use feature_dist::view::FeatureDistribution;

/// Log to a file; the terminal belongs to the UI.
fn init_logging(cfg: &Config) {
    let file = match OpenOptions::new().create(true).append(true).open(&cfg.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("feature-dist: logging disabled ({}: {})", cfg.log_file.display(), e);
            return;
        }
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("feature-dist: logging disabled ({})", e);
    }
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(150);

    while !app.quit {
        app.widget.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.apply(input::route(key));
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cfg = Config::from_env().context("reading configuration")?;
    init_logging(&cfg);

    let features = input::parse_features(&std::env::args().skip(1).collect::<Vec<_>>().join(" "));
    info!(api = %cfg.api_addr, features = ?features, "starting feature-dist");

    let api = DatasetApi::new(cfg.api_addr.clone(), cfg.timeout);
    let fetcher = Fetcher::new(Arc::new(api))
        .with_timeout(cfg.timeout)
        .discard_stale(cfg.discard_stale);
    let widget = FeatureDistribution::new(fetcher)
        .series_ids(cfg.series_ids)
        .height(cfg.chart_height);

    // Set up terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut app = App::new(widget, features);
    let result = run(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    info!("exiting");
    result
}
