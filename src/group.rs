//! # Permutation groups
//!
//! A [`PermutationGroup`] is a finite group of signed permutations of `0..degree`,
//! given by an ordered list of generators and stored as a complete
//! [`StabilizerChain`](chain::StabilizerChain) built at construction.
//!
//! ## Key Features:
//!
//! - **Construction**: from generators ([`PermutationGroup::new`],
//!   [`PermutationGroup::from_generators`]) or as one of the standard slot symmetries
//!   of a tensor: [`trivial`](PermutationGroup::trivial),
//!   [`symmetric`](PermutationGroup::symmetric),
//!   [`antisymmetric`](PermutationGroup::antisymmetric), [`cyclic`](PermutationGroup::cyclic).
//!   Generators whose signs cannot be realized are rejected with
//!   [`GroupError::InconsistentGenerators`].
//! - **Queries**: order, membership, orbits, base and strong generators.
//! - **Derived groups**: point stabilizers, set stabilizers, unions, intersections and
//!   the sign-preserving subgroup. Each one builds a fresh chain.
//! - **Search**: backtrack search over the group with caller predicates
//!   ([`search`]), coset representatives ([`subgroup`]) and element enumeration
//!   ([`elements`]).
//!
//! ## Example
//!
//! ```
//! # use num_bigint::BigUint;
//! # use permgroup::permutation::Permutation;
//! # use permgroup::group::PermutationGroup;
//! // Riemann-like symmetries on four slots
//! let swap_pair = Permutation::from_disjoint_cycles(4, &[vec![0, 1]]).unwrap().negated();
//! let swap_blocks = Permutation::from_disjoint_cycles(4, &[vec![0, 2], vec![1, 3]]).unwrap();
//! let group = PermutationGroup::new(4, vec![swap_pair, swap_blocks]).unwrap();
//!
//! assert_eq!(group.order(), BigUint::from(8u32));
//! assert!(group.contains(&Permutation::from_disjoint_cycles(4, &[vec![2, 3]]).unwrap().negated()));
//! ```

use num_bigint::BigUint;
use thiserror::Error;

use crate::permutation::{Permutation, PermutationError};

use self::{
    chain::StabilizerChain,
    orbit::{orbits_unchecked, Orbit},
};

pub mod chain;
pub mod elements;
pub mod orbit;
pub mod schreier;
pub mod search;
pub mod subgroup;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error(transparent)]
    Permutation(#[from] PermutationError),

    #[error("No generators given")]
    EmptyGenerators,

    #[error("Generators force an identity permutation to be antisymmetric")]
    InconsistentGenerators,

    #[error("Not a subgroup")]
    NotASubgroup,

    #[error("Search budget exhausted after {nodes} nodes")]
    SearchIncomplete { nodes: u64 },
}

/// A finite group of signed permutations together with its stabilizer chain.
///
/// Groups are immutable; every operation producing another group builds a new chain.
/// Equality compares the generator list and the chain, so it is structural rather
/// than mathematical: use [`is_subgroup_of`](Self::is_subgroup_of) both ways to
/// compare the groups themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationGroup {
    degree: usize,
    generators: Vec<Permutation>,
    chain: StabilizerChain,
}

impl PermutationGroup {
    // --------------------------------------------------------------------------------------------
    // Construction
    // --------------------------------------------------------------------------------------------

    /// Builds the group generated by `generators` acting on `0..degree`. An empty list
    /// gives the trivial group.
    ///
    /// # Errors
    ///
    /// - [`PermutationError::DegreeMismatch`] if a generator has a different degree.
    /// - [`GroupError::InconsistentGenerators`] if some product of the generators has
    ///   an identity image and an antisymmetric sign.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// # use permgroup::group::{GroupError, PermutationGroup};
    /// let signed_cycle = Permutation::from_map(vec![2, 1, 3, 0]).unwrap().negated();
    /// assert_eq!(
    ///     PermutationGroup::new(4, vec![signed_cycle]),
    ///     Err(GroupError::InconsistentGenerators)
    /// );
    /// ```
    pub fn new(degree: usize, generators: Vec<Permutation>) -> Result<Self, GroupError> {
        let chain = StabilizerChain::build(degree, &generators)?;
        Ok(PermutationGroup {
            degree,
            generators,
            chain,
        })
    }

    /// Like [`new`](Self::new), reading the degree off the first generator.
    ///
    /// # Errors
    ///
    /// [`GroupError::EmptyGenerators`] for an empty list, otherwise as [`new`](Self::new).
    pub fn from_generators(generators: Vec<Permutation>) -> Result<Self, GroupError> {
        let degree = generators
            .first()
            .map(Permutation::degree)
            .ok_or(GroupError::EmptyGenerators)?;
        Self::new(degree, generators)
    }

    /// The group containing only the identity.
    pub fn trivial(degree: usize) -> Self {
        PermutationGroup {
            degree,
            generators: Vec::new(),
            chain: StabilizerChain::trivial(degree),
        }
    }

    /// All permutations of `0..degree`, each with a symmetric sign.
    pub fn symmetric(degree: usize) -> Self {
        Self::from_standard_generators(degree, false)
    }

    /// All permutations of `0..degree`, each signed by its parity: the slot symmetry of
    /// a totally antisymmetric tensor.
    pub fn antisymmetric(degree: usize) -> Self {
        Self::from_standard_generators(degree, true)
    }

    /// The rotations of `0..degree`.
    pub fn cyclic(degree: usize) -> Self {
        if degree < 2 {
            return Self::trivial(degree);
        }
        Self::new(degree, vec![Self::rotation(degree)])
            .expect("a single symmetric generator is consistent")
    }

    fn rotation(degree: usize) -> Permutation {
        Permutation::from_map_unchecked((0..degree).map(|i| (i + 1) % degree).collect(), false)
    }

    fn from_standard_generators(degree: usize, signed: bool) -> Self {
        if degree < 2 {
            return Self::trivial(degree);
        }
        let swap = Permutation::from_map_unchecked(
            (0..degree)
                .map(|i| match i {
                    0 => 1,
                    1 => 0,
                    i => i,
                })
                .collect(),
            signed,
        );
        let mut generators = vec![swap];
        if degree > 2 {
            let rotation = Self::rotation(degree);
            let odd = rotation.parity() == -1;
            generators.push(rotation.with_antisymmetric(signed && odd));
        }
        Self::new(degree, generators).expect("signs given by parity are consistent")
    }

    // --------------------------------------------------------------------------------------------
    // Accessors and queries
    // --------------------------------------------------------------------------------------------

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The generators as given at construction.
    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    pub fn chain(&self) -> &StabilizerChain {
        &self.chain
    }

    pub fn base(&self) -> Vec<usize> {
        self.chain.base()
    }

    pub fn strong_generators(&self) -> Vec<Permutation> {
        self.chain.strong_generators()
    }

    /// Number of elements: the product of the orbit lengths down the chain.
    ///
    /// # Examples
    ///
    /// ```
    /// # use num_bigint::BigUint;
    /// # use permgroup::group::PermutationGroup;
    /// assert_eq!(PermutationGroup::symmetric(6).order(), BigUint::from(720u32));
    /// ```
    pub fn order(&self) -> BigUint {
        self.chain.order()
    }

    pub fn is_trivial(&self) -> bool {
        self.chain.is_trivial()
    }

    /// Membership including the sign. A permutation of another degree is never a member.
    pub fn contains(&self, perm: &Permutation) -> bool {
        self.chain.contains(perm)
    }

    /// Every element of `self`, signs included, lies in `other`.
    pub fn is_subgroup_of(&self, other: &PermutationGroup) -> bool {
        self.degree == other.degree && self.generators.iter().all(|g| other.contains(g))
    }

    /// The orbit of `point` under the generators.
    pub fn orbit(&self, point: usize) -> Result<Orbit, PermutationError> {
        Orbit::new(self.degree, &self.generators, point)
    }

    /// The partition of `0..degree` into orbits.
    pub fn orbits(&self) -> Vec<Vec<usize>> {
        orbits_unchecked(self.degree, &self.generators)
    }

    pub fn is_transitive(&self) -> bool {
        self.degree <= 1
            || Orbit::new_unchecked(self.degree, &self.generators, 0).len() == self.degree
    }

    /// Checks the chain against the Schreier-Sims conditions and checks that every
    /// generator sifts through it.
    pub fn verify(&self) -> bool {
        self.chain.verify() && self.generators.iter().all(|g| self.chain.contains(g))
    }

    // --------------------------------------------------------------------------------------------
    // Derived groups
    // --------------------------------------------------------------------------------------------

    /// The pointwise stabilizer of `points`.
    ///
    /// The chain is rebuilt with `points` leading the base and the part below them is
    /// returned as a new group.
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
    /// let stab = s5.stabilizer(&[4, 1]).unwrap();
    /// assert_eq!(stab.order(), BigUint::from(6u32));
    /// assert!(stab.generators().iter().all(|g| g[4] == 4 && g[1] == 1));
    /// ```
    pub fn stabilizer(&self, points: &[usize]) -> Result<PermutationGroup, GroupError> {
        let chain =
            StabilizerChain::build_with_base(self.degree, &self.strong_generators(), points)?;
        let fixed = chain.base().iter().take_while(|&b| points.contains(b)).count();
        let tail = chain.tail(fixed);
        Ok(PermutationGroup {
            degree: self.degree,
            generators: tail.strong_generators(),
            chain: tail,
        })
    }

    /// The group generated by the generators of both groups.
    ///
    /// # Errors
    ///
    /// [`PermutationError::DegreeMismatch`] for groups of different degrees and
    /// [`GroupError::InconsistentGenerators`] if the two sign assignments clash.
    pub fn union(&self, other: &PermutationGroup) -> Result<PermutationGroup, GroupError> {
        if self.degree != other.degree {
            return Err(PermutationError::DegreeMismatch {
                left: self.degree,
                right: other.degree,
            }
            .into());
        }
        let generators = self
            .generators
            .iter()
            .chain(other.generators.iter())
            .cloned()
            .collect();
        Self::new(self.degree, generators)
    }
}

#[cfg(test)]
mod tests;
