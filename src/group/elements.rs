//! Enumeration and sampling of group elements.

use std::iter::FusedIterator;

use rand::Rng;

use super::PermutationGroup;
use crate::permutation::Permutation;

/// Iterator over every element of a group, created by [`PermutationGroup::iter`].
///
/// Elements are the products `t_0 ∘ t_1 ∘ … ∘ t_{k-1}` of one transversal element per
/// chain level, run through as a mixed-radix counter with the deepest level varying
/// fastest. Partial products are cached, so each step recomputes only the levels whose
/// counters changed.
#[derive(Debug, Clone)]
pub struct Elements {
    transversals: Vec<Vec<Permutation>>,
    counters: Vec<usize>,
    /// `prefixes[l] = t_0 ∘ … ∘ t_l` for the current counters.
    prefixes: Vec<Permutation>,
    identity: Permutation,
    done: bool,
}

impl Elements {
    fn new(group: &PermutationGroup) -> Self {
        let transversals: Vec<Vec<Permutation>> = group
            .chain
            .levels()
            .iter()
            .map(|level| {
                level
                    .orbit()
                    .points()
                    .iter()
                    .filter_map(|&point| level.transversal(point))
                    .collect()
            })
            .collect();
        let counters = vec![0; transversals.len()];
        let mut elements = Elements {
            transversals,
            counters,
            prefixes: Vec::new(),
            identity: Permutation::id(group.degree),
            done: false,
        };
        elements.refresh_from(0);
        elements
    }

    fn refresh_from(&mut self, level: usize) {
        self.prefixes.truncate(level);
        for l in level..self.transversals.len() {
            let t = &self.transversals[l][self.counters[l]];
            let prefix = self.prefixes.last().unwrap_or(&self.identity);
            let next = prefix.compose_unchecked(t);
            self.prefixes.push(next);
        }
    }

    fn current(&self) -> Permutation {
        self.prefixes.last().unwrap_or(&self.identity).clone()
    }
}

impl Iterator for Elements {
    type Item = Permutation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let element = self.current();

        // increment the counter, carrying towards level 0
        let mut level = self.counters.len();
        loop {
            if level == 0 {
                self.done = true;
                break;
            }
            level -= 1;
            self.counters[level] += 1;
            if self.counters[level] < self.transversals[level].len() {
                self.refresh_from(level);
                break;
            }
            self.counters[level] = 0;
        }
        Some(element)
    }
}

impl FusedIterator for Elements {}

impl PermutationGroup {
    /// All elements of the group, each exactly once, starting with the identity.
    ///
    /// The iterator is independent of the group's generators list and restartable:
    /// calling `iter` again starts over.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::group::PermutationGroup;
    /// let signed = PermutationGroup::antisymmetric(3);
    /// let (odd, even): (Vec<_>, Vec<_>) = signed.iter().partition(|g| g.is_antisymmetric());
    /// assert_eq!((odd.len(), even.len()), (3, 3));
    /// ```
    pub fn iter(&self) -> Elements {
        Elements::new(self)
    }

    /// A uniformly distributed element: one uniform transversal element per level.
    pub fn random_element<R: Rng + ?Sized>(&self, rng: &mut R) -> Permutation {
        let mut element = Permutation::id(self.degree);
        for level in self.chain.levels() {
            let points = level.orbit().points();
            let point = points[rng.gen_range(0..points.len())];
            if let Some(t) = level.transversal(point) {
                element = element.compose_unchecked(&t);
            }
        }
        element
    }
}

impl<'a> IntoIterator for &'a PermutationGroup {
    type Item = Permutation;
    type IntoIter = Elements;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
