/// Work queue for comparison paths.
///
/// A path is either queued (never handed out) or in flight (handed out to at
/// least one judge). Once the queue is empty, `next()` re-issues the oldest
/// in-flight path to whoever asks, so an abandoned comparison is eventually
/// picked up by someone else. The tree's identity check decides which of the
/// competing answers wins.
use std::collections::VecDeque;

use tracing::debug;

use crate::path::Path;

/// A path handed out by [`WorkQueue::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub path: Path,
    /// Another judge may already be working on this path.
    pub stolen: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    queued: VecDeque<Path>,
    in_flight: VecDeque<Path>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths(paths: impl IntoIterator<Item = Path>) -> Self {
        let mut queue = Self::new();
        for path in paths {
            queue.enqueue(path);
        }
        queue
    }

    /// Rebuild a queue as it was saved: checked-out paths stay in flight, in
    /// their saved order, and keep being stolen in turn.
    pub fn from_parts(queued: Vec<Path>, in_flight: Vec<Path>) -> Self {
        let mut queue = Self::from_paths(in_flight.iter().cloned().chain(queued));
        for path in &in_flight {
            queue.checkout(path);
        }
        queue
    }

    /// Append a newly ready path. Paths already tracked are left where they are.
    pub fn enqueue(&mut self, path: Path) -> bool {
        if self.contains(&path) {
            return false;
        }
        debug!(path = %path, "enqueued comparison");
        self.queued.push_back(path);
        true
    }

    /// Move a specific queued path to in flight.
    pub fn checkout(&mut self, path: &Path) -> bool {
        match self.queued.iter().position(|p| p == path) {
            Some(idx) => {
                let path = self.queued.remove(idx).expect("index from position");
                self.in_flight.push_back(path);
                true
            }
            None => false,
        }
    }

    /// Hand out the oldest queued path, or steal the oldest in-flight one.
    pub fn next(&mut self) -> Option<Dispatch> {
        if let Some(path) = self.queued.pop_front() {
            self.in_flight.push_back(path.clone());
            return Some(Dispatch { path, stolen: false });
        }

        let path = self.in_flight.pop_front()?;
        self.in_flight.push_back(path.clone());
        debug!(path = %path, "stealing in-flight comparison");
        Some(Dispatch { path, stolen: true })
    }

    /// Drop a path from in flight once a decision for it has been handled.
    pub fn retire(&mut self, path: &Path) -> bool {
        match self.in_flight.iter().position(|p| p == path) {
            Some(idx) => {
                self.in_flight.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Forget a path wherever it is.
    pub fn discard(&mut self, path: &Path) {
        self.queued.retain(|p| p != path);
        self.in_flight.retain(|p| p != path);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.queued.contains(path) || self.in_flight.contains(path)
    }

    pub fn queued(&self) -> impl Iterator<Item = &Path> {
        self.queued.iter()
    }

    pub fn in_flight(&self) -> impl Iterator<Item = &Path> {
        self.in_flight.iter()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty() && self.in_flight.is_empty()
    }
}
