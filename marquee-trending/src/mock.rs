//! Recording trending store for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::TrendingError;
use crate::memory::InMemoryTrendingStore;
use crate::store::TrendingStore;
use crate::types::{RepresentativeMovie, TrendingEntry};

/// In-memory store that logs every `record_hit` call and can be told to fail.
///
/// Calls are recorded even when they fail, so tests can assert on what was
/// attempted.
#[derive(Debug, Clone, Default)]
pub struct RecordingTrendingStore {
    inner: Arc<InMemoryTrendingStore>,
    hits: Arc<Mutex<Vec<(String, RepresentativeMovie)>>>,
    list_calls: Arc<Mutex<Vec<usize>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl RecordingTrendingStore {
    /// Empty store that succeeds until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `record_hit` call so far, in call order.
    pub fn hits(&self) -> Vec<(String, RepresentativeMovie)> {
        self.hits.lock().clone()
    }

    /// The `n` of every `list_top` call so far.
    pub fn list_calls(&self) -> Vec<usize> {
        self.list_calls.lock().clone()
    }

    /// Makes `record_hit` fail with HTTP 503.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes `list_top` fail as if the store were unreachable.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TrendingStore for RecordingTrendingStore {
    async fn record_hit(
        &self,
        term: &str,
        movie: &RepresentativeMovie,
    ) -> Result<TrendingEntry, TrendingError> {
        self.hits.lock().push((term.to_string(), movie.clone()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TrendingError::Status {
                operation: "update",
                status: 503,
            });
        }
        self.inner.record_hit(term, movie).await
    }

    async fn list_top(&self, n: usize) -> Result<Vec<TrendingEntry>, TrendingError> {
        self.list_calls.lock().push(n);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TrendingError::Network {
                operation: "list",
                reason: "connection refused by test".to_string(),
            });
        }
        self.inner.list_top(n).await
    }
}
