use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::FetchError;
use crate::histogram::HistogramResponse;

/// Anything that can produce histogram data for a set of features.
///
/// Called from a worker thread; an implementation must return exactly once
/// per call.
pub trait HistogramSource: Send + Sync + 'static {
    fn features_histogram(&self, features: &[String]) -> Result<HistogramResponse, FetchError>;
}

/// Completion message from a fetch worker.
struct FetchUpdate {
    generation: u64,
    result: Result<HistogramResponse, FetchError>,
}

/// What the fetcher currently has to show.
#[derive(Debug, PartialEq)]
pub enum FetchState<'a> {
    Loading,
    Done(&'a HistogramResponse),
    Failed(&'a FetchError),
}

/// Issues a histogram fetch whenever the requested feature list changes and
/// tracks the loading/ready state on the UI thread.
pub struct Fetcher {
    source: Arc<dyn HistogramSource>,
    features: Vec<String>,
    data: HistogramResponse,
    error: Option<FetchError>,
    loading: bool,
    /// Generation of the most recent request.
    generation: u64,
    requested_at: Instant,
    updated_at: Option<Instant>,
    timeout: Option<Duration>,
    discard_stale: bool,
    update_tx: mpsc::Sender<FetchUpdate>,
    update_rx: mpsc::Receiver<FetchUpdate>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn HistogramSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            features: Vec::new(),
            data: HistogramResponse::default(),
            error: None,
            loading: true,
            generation: 0,
            requested_at: Instant::now(),
            updated_at: None,
            timeout: None,
            discard_stale: false,
            update_tx: tx,
            update_rx: rx,
        }
    }

    /// Surface `FetchError::Timeout` once a request is outstanding this long.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Drop completions from requests that have since been superseded.
    pub fn discard_stale(mut self, discard: bool) -> Self {
        self.discard_stale = discard;
        self
    }

    /// The feature list the widget currently displays.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the last fetch finished, successfully or not.
    pub fn updated_at(&self) -> Option<Instant> {
        self.updated_at
    }

    pub fn state(&self) -> FetchState<'_> {
        if self.loading {
            FetchState::Loading
        } else if let Some(ref e) = self.error {
            FetchState::Failed(e)
        } else {
            FetchState::Done(&self.data)
        }
    }

    /// Change the requested features. A fetch is issued only when the list
    /// differs from the current one, or when nothing was requested yet.
    /// Returns whether a fetch was issued.
    pub fn set_features(&mut self, features: Vec<String>) -> bool {
        if self.generation > 0 && features == self.features {
            return false;
        }
        self.features = features;
        self.request();
        true
    }

    /// Fetch histograms for the current features on a worker thread. The
    /// previous data stays in place until the completion arrives.
    pub fn request(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.requested_at = Instant::now();

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let features = self.features.clone();
        let tx = self.update_tx.clone();
        info!(generation, features = ?features, "fetching feature histograms");

        std::thread::spawn(move || {
            let result = source.features_histogram(&features);
            let _ = tx.send(FetchUpdate { generation, result });
        });

        generation
    }

    /// Apply finished fetches. Returns true if the visible state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(update) = self.update_rx.try_recv() {
            if self.discard_stale && update.generation < self.generation {
                info!(
                    generation = update.generation,
                    latest = self.generation,
                    "dropping superseded histogram response"
                );
                continue;
            }
            match update.result {
                Ok(data) => {
                    info!(
                        generation = update.generation,
                        features = data.len(),
                        "feature histograms ready"
                    );
                    self.data = data;
                    self.error = None;
                }
                Err(e) => {
                    warn!(generation = update.generation, error = %e, "histogram fetch failed");
                    self.error = Some(e);
                }
            }
            self.loading = false;
            self.updated_at = Some(Instant::now());
            changed = true;
        }

        if self.loading {
            if let Some(timeout) = self.timeout {
                if self.requested_at.elapsed() >= timeout {
                    warn!(generation = self.generation, "histogram fetch timed out");
                    self.error = Some(FetchError::Timeout(timeout));
                    self.loading = false;
                    self.updated_at = Some(Instant::now());
                    changed = true;
                }
            }
        }
        changed
    }
}
