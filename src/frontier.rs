//! Shared URL frontier with built-in deduplication.
//!
//! One mutex protects both the pending FIFO and the dedup set so a URL is
//! never in one structure without the other. Critical sections are O(1) and
//! contain no I/O. The queue size is mirrored into a relaxed atomic inside
//! every critical section so the progress observer can read it without
//! taking the guard.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::url_utils;

#[derive(Debug, Default)]
struct FrontierInner {
    pending: VecDeque<String>,
    visited: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    cached_queue_size: AtomicUsize,
    done: AtomicBool,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset internal state and seed the frontier. Must be called exactly
    /// once before any worker starts.
    pub fn init(&self, seed_url: &str) {
        let mut inner = self.inner.lock();
        inner.pending.clear();
        inner.visited.clear();

        inner.pending.push_back(seed_url.to_string());
        inner.visited.insert(seed_url.to_string());

        self.cached_queue_size.store(inner.pending.len(), Ordering::Relaxed);
        self.done.store(false, Ordering::Relaxed);
    }

    /// Remove and return the head of the pending queue, if any.
    pub fn try_dequeue(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        let url = inner.pending.pop_front();
        self.cached_queue_size.store(inner.pending.len(), Ordering::Relaxed);
        url
    }

    /// Add a URL unless it is invalid or already seen.
    ///
    /// Returns true iff the URL was newly enqueued. Invalid URLs (empty,
    /// oversize, bad scheme) are counted as "not added", never as errors.
    pub fn add_if_not_visited(&self, url: &str) -> bool {
        if !url_utils::is_valid_url(url) {
            return false;
        }

        let mut inner = self.inner.lock();
        if inner.visited.contains(url) {
            return false;
        }

        inner.visited.insert(url.to_string());
        inner.pending.push_back(url.to_string());
        self.cached_queue_size.store(inner.pending.len(), Ordering::Relaxed);
        true
    }

    /// Enqueue each URL in turn, returning how many were newly added.
    /// Atomicity is per-URL, not per-batch.
    pub fn batch_enqueue(&self, urls: &[String]) -> usize {
        urls.iter()
            .filter(|url| self.add_if_not_visited(url))
            .count()
    }

    /// Number of URLs currently pending. Lock-free read of the cached size.
    pub fn queue_size(&self) -> usize {
        self.cached_queue_size.load(Ordering::Relaxed)
    }

    /// Number of URLs ever accepted into the dedup set.
    pub fn visited_count(&self) -> usize {
        self.inner.lock().visited.len()
    }

    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Relaxed);
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }
}
