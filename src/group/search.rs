//! Backtrack search over the elements of a group.
//!
//! Every element `g` of a group with a complete stabilizer chain is determined by its
//! base image `(g(β_0), …, g(β_{k-1}))`. The search walks the tree of base images
//! depth first, extending a prefix product of transversal elements one level at a
//! time, and visits the candidates of each level in ascending image order. Elements
//! therefore come out in lexicographic order of their base images.
//!
//! Two caller predicates steer the walk:
//! - a partial test `P(images)`, called at every node with the base images chosen so
//!   far, which prunes the subtree below the node when it returns `false`;
//! - a completion test `C(g)`, called at every leaf with the full element.
//!
//! ## Contract on `P`
//!
//! `P` must be *prefix-closed*: if it rejects a sequence of base images it must reject
//! every extension of that sequence. The search cannot detect a violation. It simply
//! never visits the pruned subtree, so elements below it are silently missing from the
//! result.
//!
//! ## Budgets
//!
//! A [`SearchBudget`] bounds the number of visited nodes and the wall-clock time. When
//! it runs out, searches report [`SearchOutcome::Incomplete`] with whatever was found,
//! which is distinct from a completed search that found nothing.

use std::{
    iter::FusedIterator,
    time::{Duration, Instant},
};

use log::debug;

use super::{chain::StabilizerChain, GroupError, PermutationGroup};
use crate::permutation::Permutation;

/// Limits on a backtrack search. The default is unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    max_nodes: Option<u64>,
    deadline: Option<Instant>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn max_nodes(&self) -> Option<u64> {
        self.max_nodes
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Result of a budgeted search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<T> {
    /// The search space was exhausted (or the query answered) within the budget.
    Complete(T),
    /// The budget ran out after `nodes` nodes; `partial` holds what was found so far.
    Incomplete { partial: T, nodes: u64 },
}

impl<T> SearchOutcome<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, SearchOutcome::Complete(_))
    }

    /// The result, complete or not.
    pub fn into_inner(self) -> T {
        match self {
            SearchOutcome::Complete(value) | SearchOutcome::Incomplete { partial: value, .. } => {
                value
            }
        }
    }

    /// The complete result, or [`GroupError::SearchIncomplete`].
    pub fn into_result(self) -> Result<T, GroupError> {
        match self {
            SearchOutcome::Complete(value) => Ok(value),
            SearchOutcome::Incomplete { nodes, .. } => Err(GroupError::SearchIncomplete { nodes }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SearchOutcome<U> {
        match self {
            SearchOutcome::Complete(value) => SearchOutcome::Complete(f(value)),
            SearchOutcome::Incomplete { partial, nodes } => SearchOutcome::Incomplete {
                partial: f(partial),
                nodes,
            },
        }
    }
}

/// Node counter shared by the searches of one query.
#[derive(Debug, Clone)]
pub(crate) struct Meter {
    budget: SearchBudget,
    nodes: u64,
    exhausted: bool,
}

impl Meter {
    const DEADLINE_STRIDE: u64 = 64;

    pub(crate) fn new(budget: SearchBudget) -> Self {
        Meter {
            budget,
            nodes: 0,
            exhausted: false,
        }
    }

    /// Counts one node; `false` once the budget is spent.
    fn tick(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        self.nodes += 1;
        let over_nodes = self.budget.max_nodes.is_some_and(|max| self.nodes > max);
        let over_time = self.nodes % Self::DEADLINE_STRIDE == 0
            && self
                .budget
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline);
        if over_nodes || over_time {
            debug!("search budget exhausted after {} nodes", self.nodes);
            self.exhausted = true;
        }
        !self.exhausted
    }

    pub(crate) fn nodes(&self) -> u64 {
        self.nodes
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub(crate) fn outcome<T>(&self, value: T) -> SearchOutcome<T> {
        if self.exhausted {
            SearchOutcome::Incomplete {
                partial: value,
                nodes: self.nodes,
            }
        } else {
            SearchOutcome::Complete(value)
        }
    }
}

/// Choices at one depth of the search tree.
#[derive(Debug, Clone)]
struct Frame {
    /// Product of the transversal elements chosen above this depth.
    prefix: Permutation,
    /// `(image of the base point, orbit point)`, sorted by image.
    candidates: Vec<(usize, usize)>,
    cursor: usize,
}

impl Frame {
    fn new(chain: &StabilizerChain, depth: usize, prefix: Permutation) -> Self {
        let mut candidates: Vec<_> = chain.levels()[depth]
            .orbit()
            .points()
            .iter()
            .map(|&point| (prefix[point], point))
            .collect();
        candidates.sort_unstable();
        Frame {
            prefix,
            candidates,
            cursor: 0,
        }
    }
}

/// Lazy backtrack search, yielding the matching elements in lexicographic base-image
/// order.
///
/// Created by [`PermutationGroup::search`]. Iteration stops early if the budget runs
/// out; check [`is_incomplete`](Self::is_incomplete) afterwards to tell the two apart.
pub struct Backtrack<'a, P, C> {
    chain: &'a StabilizerChain,
    partial: P,
    complete: C,
    stack: Vec<Frame>,
    images: Vec<usize>,
    meter: Meter,
    started: bool,
}

impl<'a, P, C> Backtrack<'a, P, C>
where
    P: FnMut(&[usize]) -> bool,
    C: FnMut(&Permutation) -> bool,
{
    pub fn new(chain: &'a StabilizerChain, budget: SearchBudget, partial: P, complete: C) -> Self {
        Self::with_meter(chain, Meter::new(budget), partial, complete)
    }

    pub(crate) fn with_meter(
        chain: &'a StabilizerChain,
        meter: Meter,
        partial: P,
        complete: C,
    ) -> Self {
        Backtrack {
            chain,
            partial,
            complete,
            stack: Vec::new(),
            images: Vec::with_capacity(chain.levels().len()),
            meter,
            started: false,
        }
    }

    /// Nodes visited so far, counting the root.
    pub fn nodes_visited(&self) -> u64 {
        self.meter.nodes()
    }

    /// Whether the budget ran out before the search space was exhausted.
    pub fn is_incomplete(&self) -> bool {
        self.meter.is_exhausted()
    }

    pub(crate) fn into_meter(self) -> Meter {
        self.meter
    }

    /// Visits the root. Returns the identity if the chain has no levels and it matches.
    fn start(&mut self) -> Option<Permutation> {
        self.started = true;
        if !self.meter.tick() || !(self.partial)(&[]) {
            return None;
        }
        let identity = Permutation::id(self.chain.degree());
        if self.chain.levels().is_empty() {
            return (self.complete)(&identity).then_some(identity);
        }
        self.stack.push(Frame::new(self.chain, 0, identity));
        None
    }
}

impl<P, C> Iterator for Backtrack<'_, P, C>
where
    P: FnMut(&[usize]) -> bool,
    C: FnMut(&Permutation) -> bool,
{
    type Item = Permutation;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            if let Some(identity) = self.start() {
                return Some(identity);
            }
        }
        let leaf_depth = self.chain.levels().len();

        while let Some(depth) = self.stack.len().checked_sub(1) {
            let frame = &mut self.stack[depth];
            let Some(&(image, point)) = frame.candidates.get(frame.cursor) else {
                self.stack.pop();
                continue;
            };
            frame.cursor += 1;

            if !self.meter.tick() {
                self.stack.clear();
                return None;
            }
            self.images.truncate(depth);
            self.images.push(image);
            if !(self.partial)(&self.images) {
                continue;
            }

            let level = &self.chain.levels()[depth];
            let Some(t) = level.transversal(point) else {
                continue;
            };
            let element = frame.prefix.compose_unchecked(&t);
            debug_assert_eq!(element[level.base_point()], image);

            if depth + 1 == leaf_depth {
                if (self.complete)(&element) {
                    return Some(element);
                }
            } else {
                self.stack.push(Frame::new(self.chain, depth + 1, element));
            }
        }
        None
    }
}

impl<P, C> FusedIterator for Backtrack<'_, P, C>
where
    P: FnMut(&[usize]) -> bool,
    C: FnMut(&Permutation) -> bool,
{
}

impl PermutationGroup {
    /// Lazily searches the group for elements accepted by `partial` and `complete`.
    ///
    /// `partial` receives the images of the leading base points and must be
    /// prefix-closed (see the [module documentation](self)). Pass `|_| true` to search
    /// on the completion test alone.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::group::{PermutationGroup, search::SearchBudget};
    /// let s4 = PermutationGroup::symmetric(4);
    /// let base = s4.base();
    /// // elements sending the first base point to 2, with no fixed points
    /// let found: Vec<_> = s4
    ///     .search(
    ///         SearchBudget::unlimited(),
    ///         |images| images.first().map_or(true, |&i| i == 2),
    ///         |g| g.support().len() == 4,
    ///     )
    ///     .collect();
    /// assert!(found.iter().all(|g| g[base[0]] == 2 && g.first_moved() == Some(0)));
    /// assert_eq!(found.len(), 3);
    /// ```
    pub fn search<P, C>(&self, budget: SearchBudget, partial: P, complete: C) -> Backtrack<'_, P, C>
    where
        P: FnMut(&[usize]) -> bool,
        C: FnMut(&Permutation) -> bool,
    {
        Backtrack::new(&self.chain, budget, partial, complete)
    }

    /// The first matching element in base-image order, if any.
    pub fn find_first<P, C>(
        &self,
        budget: SearchBudget,
        partial: P,
        complete: C,
    ) -> SearchOutcome<Option<Permutation>>
    where
        P: FnMut(&[usize]) -> bool,
        C: FnMut(&Permutation) -> bool,
    {
        let mut search = self.search(budget, partial, complete);
        let found = search.next();
        search.into_meter().outcome(found)
    }

    /// All matching elements in base-image order.
    pub fn find_all<P, C>(
        &self,
        budget: SearchBudget,
        partial: P,
        complete: C,
    ) -> SearchOutcome<Vec<Permutation>>
    where
        P: FnMut(&[usize]) -> bool,
        C: FnMut(&Permutation) -> bool,
    {
        let mut search = self.search(budget, partial, complete);
        let found = search.by_ref().collect();
        search.into_meter().outcome(found)
    }

    /// Number of matching elements.
    pub fn count_matching<P, C>(
        &self,
        budget: SearchBudget,
        partial: P,
        complete: C,
    ) -> SearchOutcome<u64>
    where
        P: FnMut(&[usize]) -> bool,
        C: FnMut(&Permutation) -> bool,
    {
        let mut search = self.search(budget, partial, complete);
        let count = search.by_ref().count() as u64;
        search.into_meter().outcome(count)
    }
}
