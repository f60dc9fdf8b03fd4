//! Subgroups found by backtrack search: coset representatives, set stabilizers and
//! intersections, plus the sign-preserving subgroup.
//!
//! Intersections and set stabilizers are built level by level. Going up the chain of
//! `G` from the deepest level, the subgroup `K` found so far fixes the base points
//! above the current level `l`. For every point `γ` of the level's orbit that the
//! `K`-orbit of `β_l` does not reach yet, one search over the stabilizer of
//! `β_0, …, β_{l-1}` looks for an element sending `β_l` to `γ` and having the wanted
//! property. Each hit is added to `K`, which merges orbits and saves later searches.

use std::{collections::HashSet, ops::Range};

use ahash::RandomState;
use bitvec::vec::BitVec;
use indexmap::IndexSet;
use log::trace;
use num_traits::ToPrimitive;

use super::{
    chain::StabilizerChain,
    orbit::Orbit,
    search::{Backtrack, Meter, SearchBudget, SearchOutcome},
    GroupError, PermutationGroup,
};
use crate::permutation::{Permutation, PermutationError};

impl PermutationGroup {
    fn check_subgroup(&self, subgroup: &PermutationGroup) -> Result<(), GroupError> {
        if self.degree != subgroup.degree {
            return Err(PermutationError::DegreeMismatch {
                left: self.degree,
                right: subgroup.degree,
            }
            .into());
        }
        if !subgroup.is_subgroup_of(self) {
            return Err(GroupError::NotASubgroup);
        }
        Ok(())
    }

    /// One element of every right coset `H g` of `subgroup` (`H`) in `self`, in
    /// base-image order. There are exactly `|G| / |H|` of them.
    ///
    /// # Errors
    ///
    /// [`GroupError::NotASubgroup`] if `subgroup` is not contained in `self`.
    pub fn right_coset_representatives(
        &self,
        subgroup: &PermutationGroup,
    ) -> Result<Vec<Permutation>, GroupError> {
        self.right_coset_representatives_with_budget(subgroup, SearchBudget::unlimited())?
            .into_result()
    }

    /// Budgeted [`right_coset_representatives`](Self::right_coset_representatives).
    pub fn right_coset_representatives_with_budget(
        &self,
        subgroup: &PermutationGroup,
        budget: SearchBudget,
    ) -> Result<SearchOutcome<Vec<Permutation>>, GroupError> {
        self.check_subgroup(subgroup)?;
        let index = (self.order() / subgroup.order())
            .to_usize()
            .unwrap_or(usize::MAX);

        // Every coset H g reaches the whole H-orbit of g(β_0), in particular its minimum.
        let mut orbit_min = vec![0; self.degree];
        for orbit in subgroup.orbits() {
            let min = orbit.iter().copied().min().unwrap_or_default();
            for point in orbit {
                orbit_min[point] = min;
            }
        }

        let mut seen: HashSet<Permutation, RandomState> = HashSet::default();
        let mut representatives: Vec<Permutation> = Vec::new();
        let mut search = self.search(
            budget,
            |images| images.first().map_or(true, |&image| orbit_min[image] == image),
            |_| true,
        );
        while representatives.len() < index {
            let Some(g) = search.next() else {
                break;
            };
            // H g = H r iff g⁻¹ H = r⁻¹ H
            if seen.insert(canonical_left_coset_element(subgroup.chain(), g.inverse())) {
                representatives.push(g);
            }
        }
        Ok(search.into_meter().outcome(representatives))
    }

    /// One element of every left coset `g H` of `subgroup` (`H`) in `self`. There are
    /// exactly `|G| / |H|` of them.
    ///
    /// # Errors
    ///
    /// [`GroupError::NotASubgroup`] if `subgroup` is not contained in `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::group::PermutationGroup;
    /// let s4 = PermutationGroup::symmetric(4);
    /// let s3 = s4.stabilizer(&[3]).unwrap();
    /// let reps = s4.left_coset_representatives(&s3).unwrap();
    /// assert_eq!(reps.len(), 4);
    ///
    /// // g H is determined by where g sends 3
    /// let mut images: Vec<_> = reps.iter().map(|r| r[3]).collect();
    /// images.sort();
    /// assert_eq!(images, vec![0, 1, 2, 3]);
    /// ```
    pub fn left_coset_representatives(
        &self,
        subgroup: &PermutationGroup,
    ) -> Result<Vec<Permutation>, GroupError> {
        self.left_coset_representatives_with_budget(subgroup, SearchBudget::unlimited())?
            .into_result()
    }

    /// Budgeted [`left_coset_representatives`](Self::left_coset_representatives).
    pub fn left_coset_representatives_with_budget(
        &self,
        subgroup: &PermutationGroup,
        budget: SearchBudget,
    ) -> Result<SearchOutcome<Vec<Permutation>>, GroupError> {
        // (H r)⁻¹ = r⁻¹ H
        Ok(self
            .right_coset_representatives_with_budget(subgroup, budget)?
            .map(|reps| reps.iter().map(Permutation::inverse).collect()))
    }

    /// The elements common to both groups, signs included.
    ///
    /// # Errors
    ///
    /// [`PermutationError::DegreeMismatch`] for groups of different degrees.
    ///
    /// # Examples
    ///
    /// ```
    /// # use num_bigint::BigUint;
    /// # use permgroup::group::PermutationGroup;
    /// # use permgroup::permutation::Permutation;
    /// let s4 = PermutationGroup::symmetric(4);
    /// let rotations = PermutationGroup::cyclic(4);
    /// let pairs = PermutationGroup::new(
    ///     4,
    ///     vec![Permutation::from_disjoint_cycles(4, &[vec![0, 2], vec![1, 3]]).unwrap()],
    /// )
    /// .unwrap();
    /// assert_eq!(rotations.intersection(&s4).unwrap().order(), BigUint::from(4u32));
    /// assert_eq!(rotations.intersection(&pairs).unwrap().order(), BigUint::from(2u32));
    /// ```
    pub fn intersection(&self, other: &PermutationGroup) -> Result<PermutationGroup, GroupError> {
        self.intersection_with_budget(other, SearchBudget::unlimited())?
            .into_result()
    }

    /// Budgeted [`intersection`](Self::intersection). An incomplete outcome holds a
    /// subgroup of the intersection.
    pub fn intersection_with_budget(
        &self,
        other: &PermutationGroup,
        budget: SearchBudget,
    ) -> Result<SearchOutcome<PermutationGroup>, GroupError> {
        if self.degree != other.degree {
            return Err(PermutationError::DegreeMismatch {
                left: self.degree,
                right: other.degree,
            }
            .into());
        }
        if other.is_subgroup_of(self) {
            return Ok(SearchOutcome::Complete(other.clone()));
        }
        if self.is_subgroup_of(other) {
            return Ok(SearchOutcome::Complete(self.clone()));
        }

        let base = self.base();
        let other_chain =
            StabilizerChain::build_with_base(self.degree, &other.strong_generators(), &base)?;
        let (generators, meter) = level_search(
            &self.chain,
            0..base.len(),
            Vec::new(),
            Meter::new(budget),
            |level, images| follows_chain(&other_chain, level, images),
            |g| other_chain.contains(g),
        );
        Ok(meter.outcome(Self::new(self.degree, generators)?))
    }

    /// The elements mapping the set `points` onto itself. Repeated points are ignored.
    ///
    /// # Errors
    ///
    /// [`PermutationError::OutOfRange`] if a point is not below the degree.
    ///
    /// # Examples
    ///
    /// ```
    /// # use num_bigint::BigUint;
    /// # use permgroup::group::PermutationGroup;
    /// let s5 = PermutationGroup::symmetric(5);
    /// let stab = s5.setwise_stabilizer(&[3, 0]).unwrap();
    /// assert_eq!(stab.order(), BigUint::from(12u32));
    /// assert!(stab.generators().iter().all(|g| [0, 3].contains(&g[0])));
    /// ```
    pub fn setwise_stabilizer(&self, points: &[usize]) -> Result<PermutationGroup, GroupError> {
        self.setwise_stabilizer_with_budget(points, SearchBudget::unlimited())?
            .into_result()
    }

    /// Budgeted [`setwise_stabilizer`](Self::setwise_stabilizer).
    pub fn setwise_stabilizer_with_budget(
        &self,
        points: &[usize],
        budget: SearchBudget,
    ) -> Result<SearchOutcome<PermutationGroup>, GroupError> {
        let mut set = points.to_vec();
        set.sort_unstable();
        set.dedup();
        let mut members: BitVec = BitVec::repeat(false, self.degree);
        for &point in &set {
            if point >= self.degree {
                return Err(PermutationError::OutOfRange {
                    point,
                    degree: self.degree,
                }
                .into());
            }
            members.set(point, true);
        }

        let chain = StabilizerChain::build_with_base(self.degree, &self.strong_generators(), &set)?;
        let fixed = set.len();
        let (generators, meter) = level_search(
            &chain,
            0..fixed,
            chain.tail(fixed).strong_generators(),
            Meter::new(budget),
            |level, images| {
                images
                    .iter()
                    .enumerate()
                    .all(|(offset, &image)| level + offset >= fixed || members[image])
            },
            |_| true,
        );
        Ok(meter.outcome(Self::new(self.degree, generators)?))
    }

    /// The elements with a symmetric sign. Its index is 2 if some element is
    /// antisymmetric and 1 otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// # use num_bigint::BigUint;
    /// # use permgroup::group::PermutationGroup;
    /// let signed = PermutationGroup::antisymmetric(4);
    /// let even = signed.sign_preserving_subgroup();
    /// assert_eq!(even.order(), BigUint::from(12u32));
    /// assert!(even.strong_generators().iter().all(|g| g.parity() == 1));
    /// ```
    pub fn sign_preserving_subgroup(&self) -> PermutationGroup {
        let Some(flip) = self.generators.iter().find(|g| g.is_antisymmetric()) else {
            return self.clone();
        };
        // Schreier generators for the transversal {id, flip} of the kernel
        let mut generators: IndexSet<Permutation, RandomState> = IndexSet::default();
        for g in &self.generators {
            for x in [g.clone(), g.compose_unchecked(flip)] {
                let s = if x.is_antisymmetric() {
                    flip.inverse_compose(&x)
                } else {
                    x
                };
                if !s.is_identity() {
                    generators.insert(s);
                }
            }
        }
        Self::new(self.degree, generators.into_iter().collect())
            .expect("symmetric generators are consistent")
    }
}

/// The element of the left coset `x H` with the smallest images of the base points
/// of `H`, taken in base order. `chain` is the chain of `H`.
///
/// Elements of one coset with the same base images are equal, so this picks one
/// element per coset. Level by level, `x` moves within its coset to the element
/// sending the base point to the smallest reachable image; later levels keep it.
fn canonical_left_coset_element(chain: &StabilizerChain, mut x: Permutation) -> Permutation {
    for level in chain.levels() {
        let best = level
            .orbit()
            .points()
            .iter()
            .copied()
            .min_by_key(|&point| x[point])
            .unwrap_or(level.base_point());
        if let Some(u) = level.transversal(best) {
            x = x.compose_unchecked(&u);
        }
    }
    x
}

/// Whether some element of `chain` sends the base points from `first_level` on to
/// `images`.
fn follows_chain(chain: &StabilizerChain, first_level: usize, images: &[usize]) -> bool {
    let mut prefix = Permutation::id(chain.degree());
    for (level, &image) in chain.levels()[first_level..].iter().zip(images) {
        let point = prefix.inv()[image];
        let Some(t) = level.transversal(point) else {
            return false;
        };
        prefix = prefix.compose_unchecked(&t);
    }
    true
}

/// Generators of the subgroup `K` of elements passing `complete`, found level by level
/// over `levels` of `chain`.
///
/// `known` must generate `K` intersected with the stabilizer of the base points before
/// `levels.end`. `partial(l, images)` sees the images of `β_l, β_{l+1}, …` and must be
/// prefix-closed.
fn level_search<P, C>(
    chain: &StabilizerChain,
    levels: Range<usize>,
    mut known: Vec<Permutation>,
    mut meter: Meter,
    mut partial: P,
    mut complete: C,
) -> (Vec<Permutation>, Meter)
where
    P: FnMut(usize, &[usize]) -> bool,
    C: FnMut(&Permutation) -> bool,
{
    let degree = chain.degree();
    for depth in levels.rev() {
        let level = &chain.levels()[depth];
        let base_point = level.base_point();
        let tail = chain.tail(depth);
        let mut reached = Orbit::new_unchecked(degree, &known, base_point);

        let mut targets = level.orbit().points().to_vec();
        targets.sort_unstable();
        for target in targets {
            if reached.contains(target) {
                continue;
            }
            let mut search = Backtrack::with_meter(
                &tail,
                meter,
                |images: &[usize]| {
                    images.first().map_or(true, |&image| image == target)
                        && partial(depth, images)
                },
                &mut complete,
            );
            let found = search.next();
            meter = search.into_meter();
            if let Some(x) = found {
                trace!("level {depth}: {base_point} -> {target} by {x}");
                known.push(x);
                reached = Orbit::new_unchecked(degree, &known, base_point);
            }
            if meter.is_exhausted() {
                return (known, meter);
            }
        }
    }
    (known, meter)
}
