use std::collections::{HashSet, VecDeque};

/// Breadth-first work queue plus the set of URLs already selected for fetch.
///
/// A URL is in at most one of `queued` or `visited`: `pop_batch` moves URLs
/// from the queue into the visited set in one step, so no later `push` of the
/// same URL can enqueue it again.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: impl Into<String>) -> Self {
        let mut frontier = Self::new();
        frontier.push(seed);
        frontier
    }

    /// Enqueue `url` unless it was already visited or queued.
    ///
    /// Returns `true` if the URL was appended.
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Remove up to `n` URLs from the front, marking each as visited.
    pub fn pop_batch(&mut self, n: usize) -> Vec<String> {
        let take = n.min(self.queue.len());
        let batch: Vec<String> = self.queue.drain(..take).collect();
        for url in &batch {
            self.queued.remove(url);
            self.visited.insert(url.clone());
        }
        batch
    }

    pub fn seen(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Record `url` as visited without fetching it. Drops it from the queue if present.
    pub fn mark_seen(&mut self, url: impl Into<String>) {
        let url = url.into();
        if self.queued.remove(&url) {
            self.queue.retain(|queued| queued != &url);
        }
        self.visited.insert(url);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn into_visited(self) -> HashSet<String> {
        self.visited
    }
}
