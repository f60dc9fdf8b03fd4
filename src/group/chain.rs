//! Base and strong generating set (BSGS) as a stabilizer chain, built with the
//! deterministic Schreier-Sims algorithm.
//!
//! Level `i` of a [`StabilizerChain`] stores
//! - the strong generators fixing the base points `β_0, …, β_{i-1}`,
//! - the orbit of `β_i` under those generators together with its Schreier vector.
//!
//! Only the identity fixes every base point, so every element `g` factors uniquely as
//! `g = t_0 ∘ t_1 ∘ … ∘ t_{k-1}` with `t_i` a transversal element of level `i`, and the
//! group order is the product of the orbit lengths.
//!
//! ## Construction
//!
//! The initial base is an optional caller prefix followed by, for every generator that
//! fixes the base so far, its smallest moved point. Levels are then completed from the
//! deepest one upwards: every Schreier generator of a level is sifted through the levels
//! below it. A residue that does not reduce to the identity becomes a new strong
//! generator of all the levels it was sifted through (appending a base point if it
//! fixes the whole base), and work resumes at the deepest level it touched. When every
//! Schreier generator of every level sifts to the identity, the chain is complete.
//!
//! Signs ride along: a residue with an identity image and an antisymmetric sign proves
//! that the generators force a tensor to equal minus itself, and construction fails
//! with [`GroupError::InconsistentGenerators`].

use itertools::Itertools;
use log::{debug, trace};
use num_bigint::BigUint;

use super::{orbit::Orbit, schreier::schreier_generators, GroupError};
use crate::permutation::{Permutation, PermutationError};

/// One level of the stabilizer chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    generators: Vec<Permutation>,
    orbit: Orbit,
}

impl Level {
    fn new(degree: usize, generators: Vec<Permutation>, base_point: usize) -> Self {
        let orbit = Orbit::new_unchecked(degree, &generators, base_point);
        Level { generators, orbit }
    }

    pub fn base_point(&self) -> usize {
        self.orbit.seed()
    }

    /// Strong generators fixing all earlier base points.
    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    /// Transversal element sending the base point to `point`.
    pub fn transversal(&self, point: usize) -> Option<Permutation> {
        self.orbit.transversal(&self.generators, point)
    }

    pub(crate) fn unwind(&self, point: usize, h: Permutation) -> Permutation {
        self.orbit.unwind(&self.generators, point, h)
    }

    fn add_generator(&mut self, degree: usize, h: Permutation) {
        if !self.generators.contains(&h) {
            self.generators.push(h);
            self.orbit = Orbit::new_unchecked(degree, &self.generators, self.base_point());
        }
    }
}

/// Sifts `h` through `levels`, returning the residue and the number of levels it passed.
///
/// If the count is `levels.len()`, `h` fixes every base point of `levels` after
/// reduction; otherwise the image of the next base point fell outside that level's orbit.
pub(crate) fn sift(levels: &[Level], mut h: Permutation) -> (Permutation, usize) {
    for (depth, level) in levels.iter().enumerate() {
        let image = h[level.base_point()];
        if !level.orbit.contains(image) {
            return (h, depth);
        }
        h = level.unwind(image, h);
    }
    (h, levels.len())
}

/// A complete stabilizer chain of a signed permutation group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilizerChain {
    degree: usize,
    levels: Vec<Level>,
}

impl StabilizerChain {
    /// The chain of the trivial group on `0..degree`.
    pub fn trivial(degree: usize) -> Self {
        StabilizerChain {
            degree,
            levels: Vec::new(),
        }
    }

    /// Runs Schreier-Sims on `generators`.
    pub fn build(degree: usize, generators: &[Permutation]) -> Result<Self, GroupError> {
        Self::build_with_base(degree, generators, &[])
    }

    /// Runs Schreier-Sims with `prefix` as the start of the base. Repeated prefix points
    /// are ignored; the remaining ones become the first levels, in order, even when some
    /// of them are fixed by every generator.
    pub fn build_with_base(
        degree: usize,
        generators: &[Permutation],
        prefix: &[usize],
    ) -> Result<Self, GroupError> {
        let mut base: Vec<usize> = Vec::new();
        for &point in prefix {
            if point >= degree {
                return Err(PermutationError::OutOfRange { point, degree }.into());
            }
            if !base.contains(&point) {
                base.push(point);
            }
        }

        let mut strong: Vec<Permutation> = Vec::new();
        for g in generators {
            if g.degree() != degree {
                return Err(PermutationError::DegreeMismatch {
                    left: degree,
                    right: g.degree(),
                }
                .into());
            }
            if g.is_inconsistent() {
                return Err(GroupError::InconsistentGenerators);
            }
            if g.is_identity() {
                continue;
            }
            if !strong.contains(g) {
                strong.push(g.clone());
            }
        }

        if base.is_empty() {
            if let Some(first) = strong.iter().filter_map(Permutation::first_moved).min() {
                base.push(first);
            }
        }
        for g in &strong {
            if base.iter().all(|&b| g[b] == b) {
                if let Some(point) = g.first_moved() {
                    base.push(point);
                }
            }
        }

        let mut levels: Vec<Level> = base
            .iter()
            .enumerate()
            .map(|(i, &point)| {
                let fixing = strong
                    .iter()
                    .filter(|g| base[..i].iter().all(|&b| g[b] == b))
                    .cloned()
                    .collect();
                Level::new(degree, fixing, point)
            })
            .collect();

        let mut current = levels.len();
        while current > 0 {
            let i = current - 1;
            match Self::first_failing_residue(&levels, i)? {
                None => current = i,
                Some((h, passed)) => {
                    let depth = i + 1 + passed;
                    if depth == levels.len() {
                        // The residue fixes the whole base, so it moves some point.
                        let Some(point) = h.first_moved() else {
                            return Err(GroupError::InconsistentGenerators);
                        };
                        trace!("extending base with {point}");
                        levels.push(Level {
                            generators: Vec::new(),
                            orbit: Orbit::trivial(degree, point),
                        });
                    }
                    trace!("new strong generator {h} for levels {}..={depth}", i + 1);
                    for level in &mut levels[i + 1..=depth] {
                        level.add_generator(degree, h.clone());
                    }
                    current = depth + 1;
                }
            }
        }

        let chain = StabilizerChain { degree, levels };
        debug!(
            "stabilizer chain on {degree} points: base [{}], order {}",
            chain.base().iter().join(", "),
            chain.order()
        );
        Ok(chain)
    }

    /// The first Schreier generator of level `i` that does not sift to the identity
    /// through the levels below, with the number of levels it passed.
    fn first_failing_residue(
        levels: &[Level],
        i: usize,
    ) -> Result<Option<(Permutation, usize)>, GroupError> {
        let level = &levels[i];
        for s in schreier_generators(&level.generators, &level.orbit)? {
            let (h, passed) = sift(&levels[i + 1..], s);
            if passed + i + 1 < levels.len() || !h.is_identity() {
                return Ok(Some((h, passed)));
            }
            if h.is_antisymmetric() {
                return Err(GroupError::InconsistentGenerators);
            }
        }
        Ok(None)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn base(&self) -> Vec<usize> {
        self.levels.iter().map(Level::base_point).collect()
    }

    /// All strong generators, deduplicated, in level order.
    pub fn strong_generators(&self) -> Vec<Permutation> {
        self.levels
            .iter()
            .flat_map(|level| level.generators.iter())
            .unique()
            .cloned()
            .collect()
    }

    /// Product of the orbit lengths.
    pub fn order(&self) -> BigUint {
        self.levels
            .iter()
            .map(|level| BigUint::from(level.orbit.len()))
            .product()
    }

    pub fn is_trivial(&self) -> bool {
        self.levels.iter().all(|level| level.orbit.len() == 1)
    }

    /// The chain of the pointwise stabilizer of the first `depth` base points.
    pub fn tail(&self, depth: usize) -> StabilizerChain {
        StabilizerChain {
            degree: self.degree,
            levels: self.levels.get(depth..).unwrap_or_default().to_vec(),
        }
    }

    /// Sifts `perm` down the whole chain.
    pub fn sift(&self, perm: &Permutation) -> (Permutation, usize) {
        sift(&self.levels, perm.clone())
    }

    /// Membership, sign included: the residue must be the symmetric identity.
    pub fn contains(&self, perm: &Permutation) -> bool {
        if perm.degree() != self.degree {
            return false;
        }
        let (h, passed) = self.sift(perm);
        passed == self.levels.len() && h.is_identity() && !h.is_antisymmetric()
    }

    /// Re-checks the Schreier-Sims conditions: every strong generator fixes the earlier
    /// base points and sifts through its own level, and every Schreier generator of
    /// every level sifts to the symmetric identity through the levels below it.
    pub fn verify(&self) -> bool {
        for (i, level) in self.levels.iter().enumerate() {
            let fixes_prefix = level
                .generators
                .iter()
                .all(|g| self.levels[..i].iter().all(|l| g[l.base_point()] == l.base_point()));
            if !fixes_prefix {
                return false;
            }
            let sifts = level.generators.iter().all(|g| {
                let (h, passed) = sift(&self.levels[i..], g.clone());
                passed + i == self.levels.len() && h.is_identity() && !h.is_antisymmetric()
            });
            if !sifts {
                return false;
            }
            let Ok(schreier) = schreier_generators(&level.generators, &level.orbit) else {
                return false;
            };
            for s in schreier {
                let (h, passed) = sift(&self.levels[i + 1..], s);
                if passed + i + 1 < self.levels.len() || !h.is_identity() || h.is_antisymmetric()
                {
                    return false;
                }
            }
        }
        true
    }
}
