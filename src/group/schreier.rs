//! Point stabilizers from Schreier's lemma.
//!
//! For an orbit of `p` under `S` with transversals `t_q` (`t_q(p) = q`), the elements
//!
//! ```text
//! s(q, g) = t_{g(q)}⁻¹ ∘ g ∘ t_q        for q in orbit, g in S
//! ```
//!
//! fix `p` and generate its stabilizer. There are up to `|orbit| · |S|` of them, so
//! identities are dropped and duplicates removed before anything is done with them.

use ahash::RandomState;
use indexmap::IndexSet;

use super::{orbit::Orbit, GroupError};
use crate::permutation::Permutation;

/// Schreier generators for the stabilizer of `orbit.seed()`, in (orbit point, generator)
/// order with duplicates and identities removed.
///
/// `orbit` must have been computed from `generators`. An identity image carrying an
/// antisymmetric sign means the generators are inconsistent.
pub fn schreier_generators(
    generators: &[Permutation],
    orbit: &Orbit,
) -> Result<Vec<Permutation>, GroupError> {
    let mut out: IndexSet<Permutation, RandomState> = IndexSet::default();
    for &q in orbit.points() {
        let Some(t_q) = orbit.transversal(generators, q) else {
            continue;
        };
        for g in generators {
            let s = orbit.unwind(generators, g[q], g.compose_unchecked(&t_q));
            debug_assert_eq!(s[orbit.seed()], orbit.seed());
            if s.is_identity() {
                if s.is_antisymmetric() {
                    return Err(GroupError::InconsistentGenerators);
                }
                continue;
            }
            out.insert(s);
        }
    }
    Ok(out.into_iter().collect())
}

/// Generators of the stabilizer of `point` in `⟨generators⟩`, straight from Schreier's
/// lemma. The list is not reduced beyond deduplication; use
/// [`PermutationGroup::stabilizer`](super::PermutationGroup::stabilizer) for a reduced
/// generating set.
///
/// # Examples
///
/// ```
/// # use permgroup::permutation::Permutation;
/// # use permgroup::group::schreier::stabilizer_generators;
/// let cycle = Permutation::from_map(vec![1, 2, 0]).unwrap();
/// let swap = Permutation::from_map(vec![1, 0, 2]).unwrap();
/// let stab = stabilizer_generators(3, &[cycle, swap], 0).unwrap();
/// assert!(stab.iter().all(|s| s[0] == 0));
/// assert!(stab.contains(&Permutation::from_map(vec![0, 2, 1]).unwrap()));
/// ```
pub fn stabilizer_generators(
    degree: usize,
    generators: &[Permutation],
    point: usize,
) -> Result<Vec<Permutation>, GroupError> {
    let orbit = Orbit::new(degree, generators, point)?;
    schreier_generators(generators, &orbit)
}
