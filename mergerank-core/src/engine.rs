/// Ranking session orchestrator.
///
/// Pure computation: no threads, no IO. The caller hands comparisons to judges
/// however it likes and feeds their decisions back. Every method is one atomic
/// step; wrap the session in [`crate::SharedSession`] when several callers
/// share it.
///
/// Items are identified by their 1-based input position.
use tracing::{debug, info};

use crate::error::RankError;
use crate::path::Path;
use crate::queue::WorkQueue;
use crate::tree::{MergeTree, Step};
use crate::types::{Decision, Item};

/// One comparison handed to a judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison<R> {
    pub path: Path,
    pub left: Item<R>,
    pub right: Item<R>,
    /// The path was already checked out by someone else.
    pub stolen: bool,
}

/// Answer to "what should I compare next?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextComparison<R> {
    Compare(Comparison<R>),
    /// Nothing can be handed out right now; ask again later.
    NoWork,
    /// The ranking is done.
    Finished,
}

/// Counters kept across the life of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionStats {
    /// Decisions that mutated the tree.
    pub applied: usize,
    /// Decisions rejected as stale or malformed.
    pub rejected: usize,
    /// Dispatches of a path that was already checked out.
    pub steals: usize,
    /// Queued paths dropped because their node no longer needs a comparison.
    pub discarded: usize,
}

/// Snapshot of where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Progress {
    pub total_items: usize,
    pub max_pass: usize,
    pub accepted: usize,
    /// Items settled at the root.
    pub settled: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub finished: bool,
}

/// Full session state for external persistence.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot<R> {
    pub tree: MergeTree<R>,
    pub queued: Vec<Path>,
    pub in_flight: Vec<Path>,
    pub accepted: Vec<Item<R>>,
    pub headers: Vec<String>,
    pub max_pass: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: SessionStats,
}

pub struct RankingSession<R> {
    tree: MergeTree<R>,
    queue: WorkQueue,
    /// Items accepted through PASS, in acceptance order.
    accepted: Vec<Item<R>>,
    max_pass: usize,
    /// Column headers of the input, carried through untouched.
    headers: Vec<String>,
    total_items: usize,
    stats: SessionStats,
}

impl<R> RankingSession<R> {
    /// Start a session over `records`. `max_pass` defaults to ranking everything.
    pub fn new(records: Vec<R>, headers: Vec<String>, max_pass: Option<usize>) -> Result<Self, RankError> {
        let total_items = records.len();
        let max_pass = max_pass.unwrap_or(total_items);
        if total_items > 0 && max_pass == 0 {
            return Err(RankError::ZeroCutoff);
        }

        let (tree, ready) = MergeTree::build(records)?;
        debug!(items = total_items, max_pass, ready = ready.len(), "built merge tree");

        Ok(RankingSession {
            tree,
            queue: WorkQueue::from_paths(ready),
            accepted: Vec::new(),
            max_pass,
            headers,
            total_items,
            stats: SessionStats::default(),
        })
    }

    /// Recover a session from a snapshot after its judges are gone. Every
    /// listed path is queued again, in-flight ones included.
    pub fn restore(snapshot: Snapshot<R>) -> Result<Self, RankError> {
        Self::from_snapshot(snapshot, |queued, in_flight| {
            WorkQueue::from_paths(queued.into_iter().chain(in_flight))
        })
    }

    /// Pick a live session back up from a snapshot, for callers that persist
    /// the session between requests. Checkouts stay in flight, so the next
    /// dispatch past the queue is reported as stolen.
    pub fn resume(snapshot: Snapshot<R>) -> Result<Self, RankError> {
        Self::from_snapshot(snapshot, WorkQueue::from_parts)
    }

    fn from_snapshot(
        snapshot: Snapshot<R>,
        queue: impl FnOnce(Vec<Path>, Vec<Path>) -> WorkQueue,
    ) -> Result<Self, RankError> {
        if snapshot.max_pass == 0 {
            return Err(RankError::ZeroCutoff);
        }
        snapshot.tree.check_structure()?;

        let (leaves, _) = snapshot.tree.node_counts();
        let queue = queue(snapshot.queued, snapshot.in_flight);
        debug!(
            queued = queue.queued_len(),
            in_flight = queue.in_flight_len(),
            "loaded ranking session"
        );

        Ok(RankingSession {
            tree: snapshot.tree,
            queue,
            accepted: snapshot.accepted,
            max_pass: snapshot.max_pass,
            headers: snapshot.headers,
            total_items: leaves,
            stats: snapshot.stats,
        })
    }

    /// The session needs no further decisions.
    pub fn is_finished(&self) -> bool {
        self.tree.is_complete() || self.accepted.len() >= self.max_pass
    }

    /// Validate a raw decision from a stateless client and apply it.
    ///
    /// Every failure is recoverable: the client should drop its decision and
    /// ask for new work.
    pub fn submit_decision(
        &mut self,
        path: &str,
        left: usize,
        right: usize,
        command: &str,
        side: &str,
    ) -> Result<(), RankError> {
        let path: Path = match path.parse() {
            Ok(path) => path,
            Err(err) => {
                self.stats.rejected += 1;
                return Err(err);
            }
        };
        let decision = Decision::parse(left, right, command, side);
        self.settle(&path, decision)
    }

    /// Apply an already typed decision.
    pub fn apply_decision(&mut self, path: &Path, decision: Decision) -> Result<(), RankError> {
        self.settle(path, Ok(decision))
    }

    fn settle(&mut self, path: &Path, decision: Result<Decision, RankError>) -> Result<(), RankError> {
        // The checkout ends whatever happens next.
        self.queue.retire(path);

        let result = self.try_apply(path, decision);
        if let Err(ref err) = result {
            self.stats.rejected += 1;
            debug!(path = %path, error = %err, "rejected decision");

            // A bad answer from the only holder must not lose the comparison.
            if !self.is_finished() && !self.queue.contains(path) && self.tree.resolve(path).is_ok() {
                self.queue.enqueue(path.clone());
            }
        }
        result
    }

    fn try_apply(&mut self, path: &Path, decision: Result<Decision, RankError>) -> Result<(), RankError> {
        if self.is_finished() {
            return Err(RankError::Finished);
        }
        let decision = decision?;

        let step = self.tree.apply(path, &decision, &mut self.accepted, self.max_pass)?;
        self.stats.applied += 1;
        debug!(
            path = %path,
            command = %decision.command,
            side = %decision.side,
            accepted = self.accepted.len(),
            "applied decision"
        );

        if let Step::NewlyReady(ready) = step {
            self.queue.enqueue(ready);
        }

        if self.is_finished() {
            info!(
                accepted = self.accepted.len(),
                settled = self.tree.root().run().len(),
                decisions = self.stats.applied,
                "ranking finished"
            );
        }
        Ok(())
    }

    /// Final ranking: accepted items, then the root's settled run, capped at
    /// the cutoff. `None` until the session is finished.
    pub fn final_ranking(&self) -> Option<Vec<&Item<R>>> {
        if !self.is_finished() {
            return None;
        }
        Some(
            self.accepted
                .iter()
                .chain(self.tree.root().run().iter())
                .take(self.max_pass)
                .collect(),
        )
    }

    pub fn accepted(&self) -> &[Item<R>] {
        &self.accepted
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn max_pass(&self) -> usize {
        self.max_pass
    }

    pub fn tree(&self) -> &MergeTree<R> {
        &self.tree
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn progress(&self) -> Progress {
        Progress {
            total_items: self.total_items,
            max_pass: self.max_pass,
            accepted: self.accepted.len(),
            settled: self.tree.root().run().len(),
            queued: self.queue.queued_len(),
            in_flight: self.queue.in_flight_len(),
            finished: self.is_finished(),
        }
    }
}

impl<R: Clone> RankingSession<R> {
    /// Check out the next comparison.
    ///
    /// Queued paths whose node no longer needs a comparison are dropped on the
    /// way. When nothing is queued, the oldest in-flight comparison is handed
    /// out again and marked stolen.
    pub fn next_comparison(&mut self) -> NextComparison<R> {
        if self.is_finished() {
            return NextComparison::Finished;
        }

        let (dispatch, left, right) = loop {
            let Some(dispatch) = self.queue.next() else {
                return NextComparison::NoWork;
            };
            if let Ok((left, right)) = self.tree.resolve(&dispatch.path) {
                let (left, right) = (left.clone(), right.clone());
                break (dispatch, left, right);
            }
            debug!(path = %dispatch.path, "dropping dead path");
            self.queue.discard(&dispatch.path);
            self.stats.discarded += 1;
        };

        if dispatch.stolen {
            self.stats.steals += 1;
        }
        NextComparison::Compare(Comparison {
            left,
            right,
            path: dispatch.path,
            stolen: dispatch.stolen,
        })
    }

    /// Owned copy of the full state.
    pub fn snapshot(&self) -> Snapshot<R> {
        Snapshot {
            tree: self.tree.clone(),
            queued: self.queue.queued().cloned().collect(),
            in_flight: self.queue.in_flight().cloned().collect(),
            accepted: self.accepted.clone(),
            headers: self.headers.clone(),
            max_pass: self.max_pass,
            stats: self.stats,
        }
    }
}
