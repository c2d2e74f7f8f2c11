use std::collections::HashMap;

use serde::Deserialize;

/// One group's histogram for a feature: bin boundaries and their counts.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Distribution {
    #[serde(default)]
    pub bins: Vec<f64>,
    #[serde(default)]
    pub values: Vec<f64>,
}

impl Distribution {
    pub fn new(bins: Vec<f64>, values: Vec<f64>) -> Self {
        Self { bins, values }
    }

    /// Positional (bin, value) pairs, truncated to the shorter of the two.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.bins.iter().copied().zip(self.values.iter().copied())
    }
}

/// Histogram data keyed by feature name, one `Distribution` per life.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct HistogramResponse {
    features: HashMap<String, Vec<Distribution>>,
}

impl HistogramResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: impl Into<String>, distributions: Vec<Distribution>) {
        self.features.insert(feature.into(), distributions);
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.contains_key(feature)
    }

    pub fn get(&self, feature: &str) -> Option<&[Distribution]> {
        self.features.get(feature).map(Vec::as_slice)
    }

    /// Number of features in the response.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
