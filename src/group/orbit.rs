//! Orbits and Schreier vectors.
//!
//! An [`Orbit`] is computed breadth-first from a seed, applying the generators in list
//! order, so the discovery order and the [`SchreierVector`] are fully determined by the
//! generator list.
//!
//! ## Transversal convention
//!
//! Walking back from a point `q` to the seed visits the generator indices
//! `i_k, …, i_1` (last step first). The transversal element is
//!
//! ```text
//! t_q = g_{i_k} ∘ … ∘ g_{i_1},   t_q(seed) = q
//! ```
//!
//! i.e. forward generators composed right to left. [`Orbit::unwind`] multiplies by
//! `t_q⁻¹` on the left by retracing the same path through the generators' inverse
//! maps, without building `t_q` first.

use std::fmt;

use bitvec::vec::BitVec;
use itertools::Itertools;

use crate::permutation::{Permutation, PermutationError};

/// How a point of the orbit was first reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SchreierLink {
    /// The seed of the orbit.
    Root,
    /// Generator with this index, applied to an earlier orbit point.
    Generator(usize),
}

/// One entry per point of `0..degree`; `None` for points outside the orbit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchreierVector {
    links: Vec<Option<SchreierLink>>,
}

impl SchreierVector {
    pub fn get(&self, point: usize) -> Option<SchreierLink> {
        self.links.get(point).copied().flatten()
    }

    pub fn as_slice(&self) -> &[Option<SchreierLink>] {
        &self.links
    }

    /// Number of points covered, i.e. the degree.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Compact notation: `*` for the root, the generator index for reached points and
/// `-` for points outside the orbit.
impl fmt::Display for SchreierVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.links.iter().map(|link| match link {
            None => "-".to_string(),
            Some(SchreierLink::Root) => "*".to_string(),
            Some(SchreierLink::Generator(i)) => i.to_string(),
        });
        write!(f, "[{}]", entries.format(", "))
    }
}

/// The orbit of a seed point under an ordered generator list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orbit {
    seed: usize,
    /// Points in discovery order, starting with the seed.
    points: Vec<usize>,
    members: BitVec,
    schreier: SchreierVector,
}

impl Orbit {
    /// Computes the orbit of `seed` under `generators`, all of which must act on
    /// `0..degree`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// # use permgroup::group::orbit::Orbit;
    /// let g = Permutation::from_map(vec![1, 2, 0, 3]).unwrap();
    /// let orbit = Orbit::new(4, &[g], 0).unwrap();
    /// assert_eq!(orbit.points(), &[0, 1, 2]);
    /// assert!(!orbit.contains(3));
    /// ```
    pub fn new(
        degree: usize,
        generators: &[Permutation],
        seed: usize,
    ) -> Result<Self, PermutationError> {
        if seed >= degree {
            return Err(PermutationError::OutOfRange {
                point: seed,
                degree,
            });
        }
        if let Some(g) = generators.iter().find(|g| g.degree() != degree) {
            return Err(PermutationError::DegreeMismatch {
                left: degree,
                right: g.degree(),
            });
        }
        Ok(Self::new_unchecked(degree, generators, seed))
    }

    /// Breadth-first traversal; `points` doubles as the work queue.
    pub(crate) fn new_unchecked(degree: usize, generators: &[Permutation], seed: usize) -> Self {
        let mut members: BitVec = BitVec::repeat(false, degree);
        let mut links = vec![None; degree];
        let mut points = vec![seed];
        members.set(seed, true);
        links[seed] = Some(SchreierLink::Root);

        let mut cursor = 0;
        while cursor < points.len() {
            let point = points[cursor];
            cursor += 1;
            for (i, g) in generators.iter().enumerate() {
                let image = g[point];
                if !members[image] {
                    members.set(image, true);
                    links[image] = Some(SchreierLink::Generator(i));
                    points.push(image);
                }
            }
        }

        Orbit {
            seed,
            points,
            members,
            schreier: SchreierVector { links },
        }
    }

    /// The orbit of a point fixed by everything.
    pub(crate) fn trivial(degree: usize, seed: usize) -> Self {
        Self::new_unchecked(degree, &[], seed)
    }

    pub fn seed(&self) -> usize {
        self.seed
    }

    /// Points in breadth-first discovery order.
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true: the seed is always in its own orbit.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, point: usize) -> bool {
        point < self.members.len() && self.members[point]
    }

    pub fn schreier_vector(&self) -> &SchreierVector {
        &self.schreier
    }

    /// Generator indices leading from the seed to `point`, first step first.
    pub fn path(&self, generators: &[Permutation], point: usize) -> Option<Vec<usize>> {
        if !self.contains(point) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = point;
        while let Some(SchreierLink::Generator(i)) = self.schreier.get(current) {
            path.push(i);
            current = generators[i].inv()[current];
        }
        path.reverse();
        Some(path)
    }

    /// The transversal element `t_point` with `t_point(seed) == point`.
    ///
    /// `generators` must be the list the orbit was computed from.
    pub fn transversal(&self, generators: &[Permutation], point: usize) -> Option<Permutation> {
        if !self.contains(point) {
            return None;
        }
        let mut t = Permutation::id(self.members.len());
        let mut current = point;
        while let Some(SchreierLink::Generator(i)) = self.schreier.get(current) {
            let g = &generators[i];
            t = t.compose_unchecked(g);
            current = g.inv()[current];
        }
        Some(t)
    }

    /// `t_point⁻¹ ∘ h`, for `point` in the orbit.
    pub(crate) fn unwind(
        &self,
        generators: &[Permutation],
        point: usize,
        mut h: Permutation,
    ) -> Permutation {
        debug_assert!(self.contains(point));
        let mut current = point;
        while let Some(SchreierLink::Generator(i)) = self.schreier.get(current) {
            let g = &generators[i];
            h = g.inverse_compose(&h);
            current = g.inv()[current];
        }
        h
    }
}

/// Partition of `0..degree` into orbits, each listed in discovery order and the
/// orbits ordered by their smallest point.
///
/// # Examples
///
/// ```
/// # use permgroup::permutation::Permutation;
/// # use permgroup::group::orbit::orbits;
/// let g = Permutation::from_disjoint_cycles(5, &[vec![0, 3], vec![1, 4]]).unwrap();
/// assert_eq!(orbits(5, &[g]).unwrap(), vec![vec![0, 3], vec![1, 4], vec![2]]);
/// ```
pub fn orbits(
    degree: usize,
    generators: &[Permutation],
) -> Result<Vec<Vec<usize>>, PermutationError> {
    if let Some(g) = generators.iter().find(|g| g.degree() != degree) {
        return Err(PermutationError::DegreeMismatch {
            left: degree,
            right: g.degree(),
        });
    }
    Ok(orbits_unchecked(degree, generators))
}

pub(crate) fn orbits_unchecked(degree: usize, generators: &[Permutation]) -> Vec<Vec<usize>> {
    let mut seen: BitVec = BitVec::repeat(false, degree);
    let mut out = Vec::new();
    for point in 0..degree {
        if seen[point] {
            continue;
        }
        let orbit = Orbit::new_unchecked(degree, generators, point);
        for &p in orbit.points() {
            seen.set(p, true);
        }
        out.push(orbit.points);
    }
    out
}
