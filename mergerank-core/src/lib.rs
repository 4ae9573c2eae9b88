/// mergerank-core: merge-tree scheduler for human pairwise ranking.
///
/// A list of items is ranked by merge sort where every comparison is answered
/// by a person. Comparisons are addressed by short path strings, so they can be
/// handed to stateless clients, answered late, answered twice, or stolen from a
/// judge who walked away. No IO, no HTTP, no persistence: the caller moves
/// comparisons to judges and decisions back.
///
/// Items are identified by their 1-based input position. The caller may ask for
/// only the top K items, which lets the tree stop merging early.
///
/// # Quick start
///
/// ```rust
/// use mergerank_core::{NextComparison, RankingSession};
///
/// let mut session = RankingSession::new(vec!["pear", "apple", "fig"], Vec::new(), None).unwrap();
///
/// while let NextComparison::Compare(c) = session.next_comparison() {
///     // Your judge decides; here, alphabetical order wins.
///     let side = if c.left.record <= c.right.record { "l" } else { "r" };
///     let _ = session.submit_decision(
///         &c.path.to_string(),
///         c.left.position,
///         c.right.position,
///         "SORT",
///         side,
///     );
/// }
///
/// let ranked: Vec<_> = session.final_ranking().unwrap().iter().map(|i| i.record).collect();
/// assert_eq!(ranked, ["apple", "fig", "pear"]);
/// ```

pub mod engine;
pub mod error;
pub mod path;
pub mod queue;
pub mod shared;
pub mod tree;
pub mod types;

// Re-export primary public API at crate root.
pub use engine::{Comparison, NextComparison, Progress, RankingSession, SessionStats, Snapshot};
pub use error::RankError;
pub use path::Path;
pub use queue::{Dispatch, WorkQueue};
pub use shared::SharedSession;
pub use tree::{MergeNode, MergeTree, Step};
pub use types::{Command, Decision, Item, Side};
