//! Batch - the decoded series of one inbound request
//!
//! A `Batch` is created by the front door, handed to one dispatch and shared
//! read-only by every route. Cloning is O(1).

use std::sync::Arc;

use crate::series::Series;

/// Immutable, reference-counted list of series
#[derive(Debug, Clone, Default)]
pub struct Batch {
    series: Arc<[Series]>,
    sample_count: usize,
}

impl Batch {
    /// Create a batch from decoded series
    pub fn new(series: Vec<Series>) -> Self {
        let sample_count = series.iter().map(Series::sample_count).sum();
        Self {
            series: series.into(),
            sample_count,
        }
    }

    /// All series in arrival order
    #[inline]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Iterate over the series
    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }

    /// Number of series
    #[inline]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the batch holds no series
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total samples across all series
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Number of handles sharing the underlying series
    pub fn shared_count(&self) -> usize {
        Arc::strong_count(&self.series)
    }
}

impl From<Vec<Series>> for Batch {
    fn from(series: Vec<Series>) -> Self {
        Self::new(series)
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
