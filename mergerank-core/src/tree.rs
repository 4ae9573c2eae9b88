/// Merge tree: the scheduling structure behind the ranking.
///
/// The input list is split in half recursively, exactly like a top-down merge
/// sort. Leaves hold one item and are complete from the start. An internal node
/// becomes comparable once both children are complete; each judge decision moves
/// one front item out of a child run, and the node completes when one child
/// runs dry or when the global cutoff makes the rest of its run irrelevant.
///
/// Nodes are addressed by [`Path`]. Every mutation walks down from the root and
/// reports readiness back up as a [`Step`], so at most one new comparison is
/// created per decision.
use std::collections::VecDeque;
use std::mem;

use crate::error::RankError;
use crate::path::Path;
use crate::types::{Command, Decision, Item, Side};

/// A node of the merge tree.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeNode<R> {
    elts: VecDeque<Item<R>>,
    left: Option<Box<MergeNode<R>>>,
    right: Option<Box<MergeNode<R>>>,
    complete: bool,
}

/// What a mutation did to the node a recursive call was made on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The node needs no further comparisons.
    Complete,
    /// The node still needs work, but none that can be handed out yet.
    Pending,
    /// A comparison is now available at this path.
    NewlyReady(Path),
}

impl<R> MergeNode<R> {
    fn leaf(item: Item<R>) -> Self {
        MergeNode {
            elts: VecDeque::from([item]),
            left: None,
            right: None,
            complete: true,
        }
    }

    fn internal(left: MergeNode<R>, right: MergeNode<R>) -> Self {
        MergeNode {
            elts: VecDeque::new(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            complete: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Items settled at this node, best first.
    pub fn run(&self) -> &VecDeque<Item<R>> {
        &self.elts
    }

    pub fn child(&self, side: Side) -> Option<&MergeNode<R>> {
        match side {
            Side::Left => self.left.as_deref(),
            Side::Right => self.right.as_deref(),
        }
    }

    fn children_complete(&self) -> bool {
        matches!(
            (self.left.as_deref(), self.right.as_deref()),
            (Some(l), Some(r)) if l.complete && r.complete
        )
    }

    /// Front items of both child runs, if both exist.
    fn fronts(&self) -> Option<(&Item<R>, &Item<R>)> {
        let left = self.left.as_deref()?.elts.front()?;
        let right = self.right.as_deref()?.elts.front()?;
        Some((left, right))
    }

    /// Drop everything past the items still needed, completing the node when
    /// its run alone fills the remaining slots.
    fn truncate_to_budget(&mut self, remaining: usize) {
        if self.elts.len() > remaining {
            self.elts.truncate(remaining);
        }
        if self.elts.len() == remaining {
            self.complete = true;
        }
    }

    fn apply_at(
        &mut self,
        path: &Path,
        depth: usize,
        decision: &Decision,
        accepted: &mut Vec<Item<R>>,
        max_pass: usize,
    ) -> Result<Step, RankError> {
        if self.complete || self.is_leaf() {
            return Err(RankError::StalePath(path.to_string()));
        }

        if let Some(&side) = path.steps().get(depth) {
            let child = match side {
                Side::Left => self.left.as_deref_mut(),
                Side::Right => self.right.as_deref_mut(),
            }
            .ok_or_else(|| RankError::StalePath(path.to_string()))?;

            let step = child.apply_at(path, depth + 1, decision, accepted, max_pass)?;
            return Ok(match step {
                Step::Complete if self.children_complete() => Step::NewlyReady(path.prefix(depth)),
                Step::Complete => Step::Pending,
                other => other,
            });
        }

        let actual = match self.fronts() {
            Some((l, r)) => (l.position, r.position),
            None => return Err(RankError::StalePath(path.to_string())),
        };
        if actual != (decision.left, decision.right) {
            return Err(RankError::StaleDecision {
                path: path.to_string(),
                expected: (decision.left, decision.right),
                actual,
            });
        }

        let (Some(left), Some(right)) = (self.left.as_deref_mut(), self.right.as_deref_mut()) else {
            unreachable!("fronts exist only on internal nodes");
        };
        let (chosen, opposite) = match decision.side {
            Side::Left => (left, right),
            Side::Right => (right, left),
        };

        let item = chosen
            .elts
            .pop_front()
            .expect("front checked above");
        match decision.command {
            Command::Strike => {}
            Command::Pass => accepted.push(item),
            Command::Sort => self.elts.push_back(item),
        }

        if chosen.elts.is_empty() {
            self.elts.extend(mem::take(&mut opposite.elts));
            self.complete = true;
        }

        self.truncate_to_budget(max_pass.saturating_sub(accepted.len()));

        Ok(if self.complete {
            Step::Complete
        } else {
            Step::NewlyReady(path.clone())
        })
    }

    fn count(&self, leaves: &mut usize, internal: &mut usize) {
        if self.is_leaf() {
            *leaves += 1;
            return;
        }
        *internal += 1;
        for child in [self.left.as_deref(), self.right.as_deref()].into_iter().flatten() {
            child.count(leaves, internal);
        }
    }

    fn check_structure(&self, path: &Path) -> Result<(), String> {
        match (self.left.as_deref(), self.right.as_deref()) {
            (None, None) => {
                if !self.complete || self.elts.len() > 1 {
                    return Err(format!("leaf at {path:?} must be complete with at most one item"));
                }
                Ok(())
            }
            (Some(l), Some(r)) => {
                l.check_structure(&path.child(Side::Left))?;
                r.check_structure(&path.child(Side::Right))
            }
            _ => Err(format!("node at {path:?} has exactly one child")),
        }
    }

    fn render(&self, out: &mut String) {
        let ids: Vec<String> = self.elts.iter().map(|i| i.position.to_string()).collect();
        if self.is_leaf() {
            out.push_str(&format!("[{}]", ids.join(", ")));
            return;
        }
        out.push('(');
        if let Some(l) = self.left.as_deref() {
            l.render(out);
        }
        out.push_str(&format!(" < [{}]{} > ", ids.join(", "), if self.complete { "*" } else { "" }));
        if let Some(r) = self.right.as_deref() {
            r.render(out);
        }
        out.push(')');
    }
}

/// The merge tree built once per ranking session.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MergeTree<R> {
    root: MergeNode<R>,
}

impl<R> MergeTree<R> {
    /// Build the tree from records in input order.
    ///
    /// Records get 1-based positions. Returns the tree and the paths of every
    /// node whose two children are both leaves: the comparisons available
    /// before any decision has been made.
    pub fn build(records: Vec<R>) -> Result<(Self, Vec<Path>), RankError> {
        if records.is_empty() {
            return Err(RankError::EmptyInput);
        }
        let items: Vec<Item<R>> = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Item { position: i + 1, record })
            .collect();

        let mut ready = Vec::new();
        let root = build_node(items, Path::root(), &mut ready);
        Ok((MergeTree { root }, ready))
    }

    pub fn root(&self) -> &MergeNode<R> {
        &self.root
    }

    pub fn is_complete(&self) -> bool {
        self.root.complete
    }

    /// The node at `path` if it is waiting on a comparison.
    ///
    /// A path that crosses a completed node is dead: truncation can complete an
    /// ancestor while work below it is still outstanding.
    fn pending_node(&self, path: &Path) -> Result<&MergeNode<R>, RankError> {
        let stale = || RankError::StalePath(path.to_string());
        let mut node = &self.root;
        for &side in path.steps() {
            if node.complete {
                return Err(stale());
            }
            node = node.child(side).ok_or_else(stale)?;
        }
        if node.complete || node.is_leaf() {
            return Err(stale());
        }
        Ok(node)
    }

    /// The two items currently up for comparison at `path`, left then right.
    pub fn resolve(&self, path: &Path) -> Result<(&Item<R>, &Item<R>), RankError> {
        self.pending_node(path)?
            .fronts()
            .ok_or_else(|| RankError::StalePath(path.to_string()))
    }

    /// Apply a judge decision at `path`.
    ///
    /// Nothing is mutated unless the decision's positions match the live fronts.
    /// Passed items are appended to `accepted`; `max_pass` bounds how many items
    /// the caller wants ranked in total.
    pub fn apply(
        &mut self,
        path: &Path,
        decision: &Decision,
        accepted: &mut Vec<Item<R>>,
        max_pass: usize,
    ) -> Result<Step, RankError> {
        self.root.apply_at(path, 0, decision, accepted, max_pass)
    }

    /// (leaves, internal nodes)
    pub fn node_counts(&self) -> (usize, usize) {
        let (mut leaves, mut internal) = (0, 0);
        self.root.count(&mut leaves, &mut internal);
        (leaves, internal)
    }

    /// Structural sanity check for trees that did not come from `build`.
    pub fn check_structure(&self) -> Result<(), RankError> {
        self.root
            .check_structure(&Path::root())
            .map_err(RankError::CorruptSnapshot)
    }

    /// Debug rendering: `(left < [settled] > right)`, `*` marks complete nodes.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.root.render(&mut out);
        out
    }
}

fn build_node<R>(mut items: Vec<Item<R>>, path: Path, ready: &mut Vec<Path>) -> MergeNode<R> {
    assert!(!items.is_empty(), "merge node built from no items");
    if items.len() == 1 {
        let item = items.pop().expect("length checked");
        return MergeNode::leaf(item);
    }

    let right_items = items.split_off(items.len() / 2);
    let left = build_node(items, path.child(Side::Left), ready);
    let right = build_node(right_items, path.child(Side::Right), ready);
    if left.is_leaf() && right.is_leaf() {
        ready.push(path);
    }
    MergeNode::internal(left, right)
}
