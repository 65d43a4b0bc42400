//! Chain reconstruction over the eligible-commit graph
//!
//! The step set becomes a directed graph of eligible commits (edges touching
//! an Error commit are discarded). The default strategy links u→v only where
//! u has exactly one eligible outgoing edge and v exactly one eligible
//! incoming edge, so every branch or merge point is a chain boundary and the
//! partition is independent of traversal order. Remaining ties (chain
//! emission order, cycle entry in malformed input) are broken by ascending
//! commit id.

use crate::commit::{CommitId, ExtractionStatus, StepSet};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// A non-empty ordered run of commits; consecutive commits form a recorded
/// step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitChain {
    commits: Vec<CommitId>,
}

impl CommitChain {
    fn new(commits: Vec<CommitId>) -> Self {
        debug_assert!(!commits.is_empty());
        Self { commits }
    }

    /// Commits in evolution order
    #[inline]
    #[must_use]
    pub fn commits(&self) -> &[CommitId] {
        &self.commits
    }

    /// Number of commits in the chain
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Chains are never empty; this mirrors the slice API
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// The chain's first commit
    #[inline]
    #[must_use]
    pub fn head(&self) -> &CommitId {
        &self.commits[0]
    }

    /// Consecutive (parent, child) pairs of the chain
    pub fn edges(&self) -> impl Iterator<Item = (&CommitId, &CommitId)> {
        self.commits.windows(2).map(|pair| (&pair[0], &pair[1]))
    }
}

/// Ordered list of maximal disjoint commit chains
///
/// May be empty when no eligible step exists; callers handle that by falling
/// back to the unordered per-commit view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariabilityHistory {
    chains: Vec<CommitChain>,
}

impl VariabilityHistory {
    /// The reconstructed chains, heads in ascending commit-id order
    #[inline]
    #[must_use]
    pub fn chains(&self) -> &[CommitChain] {
        &self.chains
    }

    /// Whether no chain could be derived
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Total number of commits across all chains
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.chains.iter().map(CommitChain::len).sum()
    }

    /// Every commit of every chain, in history order
    pub fn commits(&self) -> impl Iterator<Item = &CommitId> {
        self.chains.iter().flat_map(|c| c.commits().iter())
    }
}

/// Partition eligible commits into disjoint ordered chains
///
/// Implementations must keep every chain consistent with recorded
/// parent→child steps, use each commit at most once, and cover every
/// eligible commit that appears in a kept step.
pub trait SequencingStrategy {
    /// Reconstruct the history from the recorded steps
    fn sequence(&self, steps: &StepSet) -> VariabilityHistory;

    /// Strategy name (for debugging/reports)
    fn name(&self) -> &'static str;
}

/// Default strategy: longest non-overlapping sequences
///
/// Greedy chain extension along edges that are the unique eligible outgoing
/// edge of their source and the unique eligible incoming edge of their
/// target. Branch and merge points always terminate or start a chain; a
/// chain never silently skips one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestChains;

impl LongestChains {
    /// Create the default strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SequencingStrategy for LongestChains {
    fn sequence(&self, steps: &StepSet) -> VariabilityHistory {
        let (ids, graph) = eligible_graph(steps);
        if ids.is_empty() {
            debug!("no eligible steps, history is empty");
            return VariabilityHistory::default();
        }

        let out_degree =
            |n: usize| graph.neighbors_directed(n, Direction::Outgoing).count();
        let in_degree = |n: usize| graph.neighbors_directed(n, Direction::Incoming).count();

        // u→v is a chain link iff it is u's only way out and v's only way in.
        let linked_successor = |n: usize| -> Option<usize> {
            let mut outgoing = graph.neighbors_directed(n, Direction::Outgoing);
            let successor = outgoing.next()?;
            if outgoing.next().is_some() || in_degree(successor) != 1 {
                return None;
            }
            Some(successor)
        };
        let has_linked_predecessor = |n: usize| -> bool {
            if in_degree(n) != 1 {
                return false;
            }
            graph
                .neighbors_directed(n, Direction::Incoming)
                .next()
                .is_some_and(|p| out_degree(p) == 1)
        };

        let mut used = vec![false; ids.len()];
        let mut chains = Vec::new();
        let walk = |start: usize, used: &mut Vec<bool>| {
            let mut commits = Vec::new();
            let mut node = start;
            loop {
                used[node] = true;
                commits.push(ids[node].clone());
                match linked_successor(node) {
                    Some(next) if !used[next] => node = next,
                    _ => break,
                }
            }
            CommitChain::new(commits)
        };

        // Node indices ascend with commit id, so chain heads come out in
        // deterministic order.
        for node in 0..ids.len() {
            if !used[node] && !has_linked_predecessor(node) {
                chains.push(walk(node, &mut used));
            }
        }
        // A cycle of linked edges has no head; malformed input only. Enter it
        // at its smallest commit id.
        for node in 0..ids.len() {
            if !used[node] {
                chains.push(walk(node, &mut used));
            }
        }

        debug!(
            chains = chains.len(),
            commits = ids.len(),
            "history reconstructed"
        );
        VariabilityHistory { chains }
    }

    fn name(&self) -> &'static str {
        "longest_chains"
    }
}

/// Reconstruct a history with the default strategy
#[inline]
#[must_use]
pub fn sequence(steps: &StepSet) -> VariabilityHistory {
    LongestChains::new().sequence(steps)
}

/// Build the graph of eligible commits, discarding edges that touch an
/// Error commit
///
/// Returns the sorted commit ids (index = graph node) and the graph itself.
fn eligible_graph(steps: &StepSet) -> (Vec<CommitId>, DiGraphMap<usize, ()>) {
    let eligible = |id: &CommitId| steps.status_of(id).is_eligible();

    let mut ids = BTreeSet::new();
    for step in steps.steps() {
        if eligible(step.parent()) && eligible(step.child()) {
            ids.insert(step.parent().clone());
            ids.insert(step.child().clone());
        }
    }
    let ids: Vec<CommitId> = ids.into_iter().collect();
    let index_of = |id: &CommitId| ids.binary_search(id).ok();

    let mut graph = DiGraphMap::new();
    for index in 0..ids.len() {
        graph.add_node(index);
    }
    for step in steps.steps() {
        if let (Some(parent), Some(child)) = (index_of(step.parent()), index_of(step.child())) {
            // Self-steps cannot occur in a real history; keeping them out
            // keeps the degree counts honest.
            if parent != child {
                graph.add_edge(parent, child, ());
            }
        }
    }
    (ids, graph)
}
