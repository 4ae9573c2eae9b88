/// Thread-safe handle on one ranking session.
///
/// Every call takes the session lock for its whole duration, so each
/// dispatch or decision is a single atomic step. Calls are short and judges are
/// slow, so one lock per session is all the concurrency control needed.
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::{NextComparison, Progress, RankingSession, SessionStats, Snapshot};
use crate::error::RankError;
use crate::types::Item;

pub struct SharedSession<R> {
    inner: Arc<Mutex<RankingSession<R>>>,
}

impl<R> Clone for SharedSession<R> {
    fn clone(&self) -> Self {
        SharedSession {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> SharedSession<R> {
    pub fn new(session: RankingSession<R>) -> Self {
        SharedSession {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RankingSession<R>> {
        self.inner.lock().expect("ranking session lock poisoned")
    }

    pub fn submit_decision(
        &self,
        path: &str,
        left: usize,
        right: usize,
        command: &str,
        side: &str,
    ) -> Result<(), RankError> {
        self.lock().submit_decision(path, left, right, command, side)
    }

    pub fn is_finished(&self) -> bool {
        self.lock().is_finished()
    }

    pub fn progress(&self) -> Progress {
        self.lock().progress()
    }

    pub fn stats(&self) -> SessionStats {
        self.lock().stats()
    }
}

impl<R: Clone> SharedSession<R> {
    pub fn next_comparison(&self) -> NextComparison<R> {
        self.lock().next_comparison()
    }

    pub fn final_ranking(&self) -> Option<Vec<Item<R>>> {
        self.lock()
            .final_ranking()
            .map(|items| items.into_iter().cloned().collect())
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        self.lock().snapshot()
    }
}
