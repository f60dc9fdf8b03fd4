//! # Permutations
//!
//! This module provides a `Permutation` struct representing a bijection of `0..n`
//! together with a symmetry sign, as used for tensor index symmetries.
//!
//! ## Key Features:
//!
//! - **Representation**: A `Permutation` is stored by its direct mapping (`map[i]` is
//!   the image of `i`), its inverse mapping and an `antisymmetric` flag recording
//!   whether applying it to a tensor's slots flips the tensor's sign.
//! - **Construction**:
//!   - Identity permutation: `Permutation::id(n)`.
//!   - From a mapping vector: `Permutation::from_map(vec![...])` (validated).
//!   - From disjoint cycles: `Permutation::from_disjoint_cycles(n, &[vec![...]])`.
//!   - From potentially overlapping cycles with specified composition order:
//!     `Permutation::from_cycles_ordered(n, &[vec![...]], order)`.
//!   - Sign: `p.negated()`, `p.with_antisymmetric(true)`.
//! - **Basic Operations**:
//!   - Inverse: `p.inverse()` (keeps the sign).
//!   - Composition: `p1.compose(&p2)` (applies `p2` then `p1`, signs combine by XOR).
//!   - Point images: `p.apply(i)`, `p[i]`.
//!   - Apply to slices: `p.apply_slice(data)` (returns a new `Vec`),
//!     `p.apply_slice_in_place(data_mut)`.
//!   - Power: `p.pow(k)`, order: `p.order()`.
//!   - Parity: `p.parity()` (+1 for even, -1 for odd).
//!   - Check for identity: `p.is_identity()`.
//! - **Cycle Utilities**:
//!   - Find cycle decomposition: `p.find_cycles()`.
//!   - Convert to transpositions: `p.transpositions()`.
//! - **Sorting**:
//!   - `Permutation::sort(slice)`: Returns the permutation that sorts the slice.

use std::{fmt, ops::Index};

use thiserror::Error;

/// A signed permutation of `0..n`.
///
/// The image array is always a bijection. The sign is independent of the parity of
/// the image: it is whatever the generating symmetry says it is, and composes by XOR.
///
/// # Examples
///
/// ```
/// use permgroup::permutation::Permutation;
///
/// // Create a permutation that maps 0->2, 1->0, 2->1, 3->3
/// let p = Permutation::from_map(vec![2, 0, 1, 3]).unwrap();
///
/// // Apply the permutation to a slice
/// let data = vec![10, 20, 30, 40];
/// let permuted = p.apply_slice(&data);
/// assert_eq!(permuted, vec![20, 30, 10, 40]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permutation {
    map: Vec<usize>,
    inv: Vec<usize>,
    antisymmetric: bool,
}

/// Ordering compares the `map` first and the sign second.
impl PartialOrd for Permutation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Permutation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.map
            .cmp(&other.map)
            .then(self.antisymmetric.cmp(&other.antisymmetric))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermutationError {
    #[error("Degree mismatch: {left} vs {right}")]
    DegreeMismatch { left: usize, right: usize },

    #[error("Point {point} out of range for degree {degree}")]
    OutOfRange { point: usize, degree: usize },

    #[error("Map is not a bijection of 0..{degree}")]
    NotABijection { degree: usize },

    #[error("Cycles are not disjoint")]
    NonDisjointCycles,
}

impl Permutation {
    // --------------------------------------------------------------------------------------------
    // Basic Constructors and Accessors
    // --------------------------------------------------------------------------------------------

    /// Creates the identity permutation of length `n`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::id(4);
    /// assert_eq!(p.apply_slice(&[10,20,30,40]), vec![10,20,30,40]);
    /// ```
    pub fn id(n: usize) -> Self {
        Permutation {
            map: (0..n).collect(),
            inv: (0..n).collect(),
            antisymmetric: false,
        }
    }

    /// Creates a symmetric permutation from a mapping vector.
    /// The `map` vector states where index `i` is sent: `map[i]` is the image of `i`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// assert_eq!(p.apply_slice(&[10,20,30]), vec![20,30,10]);
    ///
    /// assert!(Permutation::from_map(vec![0, 0, 1]).is_err());
    /// ```
    pub fn from_map(map: Vec<usize>) -> Result<Self, PermutationError> {
        let degree = map.len();
        let mut inv = vec![usize::MAX; degree];
        for (i, &j) in map.iter().enumerate() {
            if j >= degree || inv[j] != usize::MAX {
                return Err(PermutationError::NotABijection { degree });
            }
            inv[j] = i;
        }
        Ok(Permutation {
            map,
            inv,
            antisymmetric: false,
        })
    }

    /// Builds a permutation from a map already known to be a bijection.
    pub(crate) fn from_map_unchecked(map: Vec<usize>, antisymmetric: bool) -> Self {
        let mut inv = vec![0; map.len()];
        for (i, &j) in map.iter().enumerate() {
            inv[j] = i;
        }
        Permutation {
            map,
            inv,
            antisymmetric,
        }
    }

    /// The transposition exchanging `i` and `j` on `0..n`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let t = Permutation::transposition(4, 1, 3).unwrap();
    /// assert_eq!(t.map(), &[0, 3, 2, 1]);
    /// ```
    pub fn transposition(n: usize, i: usize, j: usize) -> Result<Self, PermutationError> {
        for point in [i, j] {
            if point >= n {
                return Err(PermutationError::OutOfRange { point, degree: n });
            }
        }
        let mut map: Vec<usize> = (0..n).collect();
        map.swap(i, j);
        Ok(Self::from_map_unchecked(map, false))
    }

    /// Returns the same image with the given sign.
    pub fn with_antisymmetric(mut self, antisymmetric: bool) -> Self {
        self.antisymmetric = antisymmetric;
        self
    }

    /// Returns the same image with the opposite sign.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::transposition(3, 0, 1).unwrap().negated();
    /// assert!(p.is_antisymmetric());
    /// assert_eq!(p.symmetry_sign(), -1);
    /// ```
    pub fn negated(&self) -> Self {
        self.clone().with_antisymmetric(!self.antisymmetric)
    }

    /// Returns the internal mapping as a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// assert_eq!(p.map(), &[2, 0, 1]);
    /// ```
    pub fn map(&self) -> &[usize] {
        &self.map
    }

    /// Returns the inverse mapping as a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// assert_eq!(p.inv(), &[1, 2, 0]);
    /// ```
    pub fn inv(&self) -> &[usize] {
        &self.inv
    }

    /// Number of points the permutation acts on.
    pub fn degree(&self) -> usize {
        self.map.len()
    }

    /// Whether applying this permutation to tensor slots flips the sign.
    pub fn is_antisymmetric(&self) -> bool {
        self.antisymmetric
    }

    /// `-1` for antisymmetric permutations, `+1` otherwise.
    pub fn symmetry_sign(&self) -> i8 {
        if self.antisymmetric {
            -1
        } else {
            1
        }
    }

    // --------------------------------------------------------------------------------------------
    // Basic Operations
    // --------------------------------------------------------------------------------------------

    /// Returns the inverse of the permutation. The sign is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// let inv = p.inverse();
    /// assert_eq!(inv.apply_slice(&[10,20,30]), vec![30, 10, 20]);
    /// ```
    pub fn inverse(&self) -> Self {
        Permutation {
            map: self.inv.clone(),
            inv: self.map.clone(),
            antisymmetric: self.antisymmetric,
        }
    }

    /// Image of `point`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::{Permutation, PermutationError};
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// assert_eq!(p.apply(0), Ok(2));
    /// assert_eq!(p.apply(3), Err(PermutationError::OutOfRange { point: 3, degree: 3 }));
    /// ```
    pub fn apply(&self, point: usize) -> Result<usize, PermutationError> {
        self.map
            .get(point)
            .copied()
            .ok_or(PermutationError::OutOfRange {
                point,
                degree: self.degree(),
            })
    }

    /// Preimage of `point`.
    pub fn apply_inv(&self, point: usize) -> Result<usize, PermutationError> {
        self.inv
            .get(point)
            .copied()
            .ok_or(PermutationError::OutOfRange {
                point,
                degree: self.degree(),
            })
    }

    /// Composes `self` with another permutation `other`, returning a new permutation:
    /// `(self ◦ other)(i) = self.map[other.map[i]]`, with the signs combined by XOR.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let a = Permutation::from_map(vec![1, 0, 2]).unwrap().negated();
    /// let b = Permutation::from_map(vec![0, 2, 1]).unwrap();
    /// let ab = a.compose(&b).unwrap();
    /// assert_eq!(ab.map(), &[1, 2, 0]);
    /// assert!(ab.is_antisymmetric());
    ///
    /// assert!(a.compose(&Permutation::id(4)).is_err());
    /// ```
    pub fn compose(&self, other: &Self) -> Result<Self, PermutationError> {
        if self.degree() != other.degree() {
            return Err(PermutationError::DegreeMismatch {
                left: self.degree(),
                right: other.degree(),
            });
        }
        Ok(self.compose_unchecked(other))
    }

    /// `self ◦ other` for operands already known to share a degree.
    pub(crate) fn compose_unchecked(&self, other: &Self) -> Self {
        debug_assert_eq!(self.degree(), other.degree());
        let map = other.map.iter().map(|&i| self.map[i]).collect();
        Self::from_map_unchecked(map, self.antisymmetric ^ other.antisymmetric)
    }

    /// `self⁻¹ ◦ other`, without materialising the inverse.
    pub(crate) fn inverse_compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.degree(), other.degree());
        let map = other.map.iter().map(|&i| self.inv[i]).collect();
        Self::from_map_unchecked(map, self.antisymmetric ^ other.antisymmetric)
    }

    /// Applies `self` to a slice, returning a new `Vec<T>` in permuted order:
    /// the element at position `i` moves to position `self[i]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// let data = vec![10, 20, 30];
    /// assert_eq!(p.apply_slice(&data), vec![20, 30, 10]);
    /// ```
    pub fn apply_slice<T: Clone, S>(&self, slice: S) -> Vec<T>
    where
        S: AsRef<[T]>,
    {
        let s = slice.as_ref();
        self.inv.iter().map(|&idx| s[idx].clone()).collect()
    }

    /// Applies the inverse of `self` to a slice, returning a new `Vec<T>` in permuted order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// let data = vec![10, 20, 30];
    /// assert_eq!(p.apply_slice_inv(&data), vec![30, 10, 20]);
    /// ```
    pub fn apply_slice_inv<T: Clone, S>(&self, slice: S) -> Vec<T>
    where
        S: AsRef<[T]>,
    {
        let s = slice.as_ref();
        self.map.iter().map(|&idx| s[idx].clone()).collect()
    }

    /// Applies `self` in-place to the provided slice by using transpositions
    /// derived from the cycle decomposition.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// let mut data = vec![10, 20, 30];
    /// p.apply_slice_in_place(&mut data);
    /// assert_eq!(data, vec![20, 30, 10]);
    /// ```
    pub fn apply_slice_in_place<T, S>(&self, slice: &mut S)
    where
        S: AsMut<[T]>,
    {
        let transpositions = self.transpositions();
        for (i, j) in transpositions.iter().rev() {
            slice.as_mut().swap(*i, *j);
        }
    }

    /// Applies the inverse of `self` in-place to the provided slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1]).unwrap();
    /// let mut data = vec![10, 20, 30];
    /// p.apply_slice_in_place_inv(&mut data);
    /// assert_eq!(data, vec![30, 10, 20]);
    /// ```
    pub fn apply_slice_in_place_inv<T, S>(&self, slice: &mut S)
    where
        S: AsMut<[T]>,
    {
        let transpositions = self.transpositions();
        for (i, j) in transpositions {
            slice.as_mut().swap(i, j);
        }
    }

    // --------------------------------------------------------------------------------------------
    // Sorting Utilities
    // --------------------------------------------------------------------------------------------

    /// Given a slice of items that implement `Ord`, returns the permutation that sorts them
    /// in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let data = vec![30, 10, 20, 40];
    /// let perm = Permutation::sort(&data);
    /// assert_eq!(perm.apply_slice(&data), vec![10, 20, 30, 40]);
    /// ```
    pub fn sort<T, S>(slice: S) -> Permutation
    where
        T: Ord,
        S: AsRef<[T]>,
    {
        let s = slice.as_ref();
        let mut order: Vec<usize> = (0..s.len()).collect();
        order.sort_by_key(|&i| &s[i]);
        Self::from_map_unchecked(order, false).inverse()
    }

    // --------------------------------------------------------------------------------------------
    // Cycles and Transpositions
    // --------------------------------------------------------------------------------------------

    /// Returns the cycle decomposition of `self` as a `Vec` of cycles,
    /// each cycle represented as a `Vec<usize>`.
    /// Each cycle lists the indices of a single cycle, e.g. `[0, 2, 1]` means `0->2, 2->1, 1->0`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![2, 0, 1, 3]).unwrap();
    /// let cycles = p.find_cycles();
    /// assert_eq!(cycles, vec![vec![0, 2, 1], vec![3]]);
    /// ```
    pub fn find_cycles(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.map.len()];
        let mut cycles = Vec::new();
        for i in 0..self.map.len() {
            if visited[i] {
                continue;
            }
            let mut cycle = Vec::new();
            let mut j = i;
            while !visited[j] {
                visited[j] = true;
                cycle.push(j);
                j = self.map[j];
            }
            cycles.push(cycle);
        }
        cycles
    }

    /// Converts a single cycle to a list of transpositions that produce that cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let cycle = vec![0, 2, 1];
    /// let transpositions = Permutation::cycle_to_transpositions(&cycle);
    /// assert_eq!(transpositions, vec![(0, 1), (0, 2)]);
    /// ```
    pub fn cycle_to_transpositions(cycle: &[usize]) -> Vec<(usize, usize)> {
        let mut transpositions = Vec::new();
        for i in (1..cycle.len()).rev() {
            transpositions.push((cycle[0], cycle[i]));
        }
        transpositions
    }

    /// Returns the list of transpositions for `self`, by decomposing it into cycles
    /// and then converting each cycle to transpositions.
    pub fn transpositions(&self) -> Vec<(usize, usize)> {
        self.find_cycles()
            .iter()
            .flat_map(|cycle| Self::cycle_to_transpositions(cycle))
            .collect()
    }

    // --------------------------------------------------------------------------------------------
    // Predicates and Invariants
    // --------------------------------------------------------------------------------------------

    /// Checks if the image is the identity. The sign is not looked at: an identity image
    /// with `antisymmetric` set is exactly what an inconsistent symmetry produces.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::id(4);
    /// assert!(p.is_identity());
    /// assert!(p.negated().is_identity());
    ///
    /// let q = Permutation::from_map(vec![1,0,2,3]).unwrap();
    /// assert!(!q.is_identity());
    /// ```
    pub fn is_identity(&self) -> bool {
        self.map.iter().enumerate().all(|(i, &m)| i == m)
    }

    /// Identity image carrying a sign flip: a tensor equal to minus itself.
    pub fn is_inconsistent(&self) -> bool {
        self.antisymmetric && self.is_identity()
    }

    /// Smallest point that is not fixed.
    pub fn first_moved(&self) -> Option<usize> {
        self.map.iter().enumerate().find(|&(i, &m)| i != m).map(|(i, _)| i)
    }

    /// All points that are not fixed, ascending.
    pub fn support(&self) -> Vec<usize> {
        self.map
            .iter()
            .enumerate()
            .filter(|&(i, &m)| i != m)
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns the parity (+1 or -1) of the image,
    /// indicating whether it is an even (+1) or odd (-1) permutation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![1,0,3,2]).unwrap();
    /// assert_eq!(p.parity(), 1); // even
    ///
    /// let q = Permutation::from_map(vec![2,1,0]).unwrap();
    /// assert_eq!(q.parity(), -1); // odd
    /// ```
    pub fn parity(&self) -> i8 {
        let mut sign = 1i8;
        for cycle in self.find_cycles() {
            // Each cycle of length k contributes (k-1) to the total parity
            if cycle.len() % 2 == 0 {
                sign = -sign;
            }
        }
        sign
    }

    /// Computes the k-th power of the permutation (composition with itself k times).
    /// For k = 0, it returns the identity of the same size.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_map(vec![1, 2, 0]).unwrap();
    /// let p2 = p.pow(2);
    /// assert_eq!(p2.map(), &[2, 0, 1]);
    /// ```
    pub fn pow(&self, k: usize) -> Self {
        let mut result = Permutation::id(self.map.len());
        let mut base = self.clone();
        let mut exp = k;

        while exp > 0 {
            if exp % 2 == 1 {
                result = result.compose_unchecked(&base);
            }
            base = base.compose_unchecked(&base);
            exp /= 2;
        }
        result
    }

    /// Order of the image: the least common multiple of its cycle lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let p = Permutation::from_disjoint_cycles(5, &[vec![0, 1], vec![2, 3, 4]]).unwrap();
    /// assert_eq!(p.order(), 6);
    /// ```
    pub fn order(&self) -> usize {
        fn gcd(a: usize, b: usize) -> usize {
            if b == 0 {
                a
            } else {
                gcd(b, a % b)
            }
        }
        self.find_cycles()
            .iter()
            .map(Vec::len)
            .fold(1, |acc, len| acc / gcd(acc, len) * len)
    }
}

/// Specifies the direction for reading cycle compositions
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CycleOrder {
    /// Apply rightmost cycles first: (a b)(c d) applies (c d) then (a b)
    LastFirst,
    /// Apply leftmost cycles first: (a b)(c d) applies (a b) then (c d)
    FirstFirst,
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.antisymmetric {
            write!(f, "-")?;
        }
        // First show cycle notation
        let mut first = true;
        for cycle in self.find_cycles() {
            if cycle.len() > 1 {
                // Only show non-trivial cycles
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "(")?;
                for (i, &x) in cycle.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, ")")?;
                first = false;
            }
        }
        if first {
            write!(f, "()")?;
        }

        // Then show one-line notation
        write!(f, " [")?;
        for (i, &x) in self.map.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}

impl Permutation {
    /// Creates a symmetric permutation of `0..n` from a set of disjoint cycles.
    /// Points not mentioned are fixed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let cycles = vec![vec![0, 1, 2], vec![3, 4]];
    /// let p = Permutation::from_disjoint_cycles(5, &cycles).unwrap();
    /// assert_eq!(p.map(), &[1, 2, 0, 4, 3]);
    ///
    /// // Error if cycles are not disjoint
    /// let invalid = vec![vec![0, 1], vec![1, 2]];
    /// assert!(Permutation::from_disjoint_cycles(3, &invalid).is_err());
    /// ```
    pub fn from_disjoint_cycles(n: usize, cycles: &[Vec<usize>]) -> Result<Self, PermutationError> {
        let mut seen = vec![false; n];
        for &idx in cycles.iter().flatten() {
            if idx >= n {
                return Err(PermutationError::OutOfRange {
                    point: idx,
                    degree: n,
                });
            }
            if std::mem::replace(&mut seen[idx], true) {
                return Err(PermutationError::NonDisjointCycles);
            }
        }

        Ok(Self::from_map_unchecked(Self::cycle_map(n, cycles), false))
    }

    fn cycle_map<'a>(n: usize, cycles: impl IntoIterator<Item = &'a Vec<usize>>) -> Vec<usize> {
        let mut map = (0..n).collect::<Vec<_>>();
        for cycle in cycles {
            for i in 0..cycle.len() {
                map[cycle[i]] = cycle[(i + 1) % cycle.len()];
            }
        }
        map
    }

    /// Creates a permutation of `0..n` from any set of cycles with specified reading order.
    pub fn from_cycles_ordered(
        n: usize,
        cycles: &[Vec<usize>],
        order: CycleOrder,
    ) -> Result<Self, PermutationError> {
        if let Some(&point) = cycles.iter().flatten().find(|&&p| p >= n) {
            return Err(PermutationError::OutOfRange { point, degree: n });
        }

        let mut result = Permutation::id(n);

        let cycle_iter: Box<dyn Iterator<Item = &Vec<usize>>> = match order {
            CycleOrder::LastFirst => Box::new(cycles.iter().rev()),
            CycleOrder::FirstFirst => Box::new(cycles.iter()),
        };

        for cycle in cycle_iter {
            if cycle.len() <= 1 {
                continue;
            }
            let mut seen = vec![false; n];
            if cycle.iter().any(|&p| std::mem::replace(&mut seen[p], true)) {
                return Err(PermutationError::NotABijection { degree: n });
            }
            let cycle_perm = Self::from_map_unchecked(Self::cycle_map(n, [cycle]), false);
            result = cycle_perm.compose_unchecked(&result);
        }

        Ok(result)
    }

    /// Creates a permutation from cycles using right-to-left reading order (default).
    ///
    /// # Examples
    ///
    /// ```
    /// # use permgroup::permutation::Permutation;
    /// let cycles = vec![vec![0, 1, 2], vec![1, 2]];
    /// let p = Permutation::from_cycles(3, &cycles).unwrap();
    /// assert_eq!(p.map(), &[1, 0, 2]);
    /// ```
    pub fn from_cycles(n: usize, cycles: &[Vec<usize>]) -> Result<Self, PermutationError> {
        Self::from_cycles_ordered(n, cycles, CycleOrder::LastFirst)
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.map()[index]
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn perm(map: &[usize]) -> Permutation {
        Permutation::from_map(map.to_vec()).unwrap()
    }

    #[test]
    fn test_from_disjoint_cycles() {
        let cycles = vec![vec![0, 3, 2], vec![1, 4]];
        let p = Permutation::from_disjoint_cycles(5, &cycles).unwrap();
        assert_eq!(p.map(), &[3, 4, 0, 2, 1]);

        let cycles = vec![vec![0, 1, 2]];
        let p = Permutation::from_disjoint_cycles(3, &cycles).unwrap();
        assert_eq!(p.map(), &[1, 2, 0]);

        let cycles = vec![vec![0, 1], vec![1, 2]];
        assert_eq!(
            Permutation::from_disjoint_cycles(3, &cycles),
            Err(PermutationError::NonDisjointCycles)
        );

        let p = Permutation::from_disjoint_cycles(0, &[]).unwrap();
        assert!(p.map().is_empty());

        assert_eq!(
            Permutation::from_disjoint_cycles(2, &[vec![0, 2]]),
            Err(PermutationError::OutOfRange {
                point: 2,
                degree: 2
            })
        );
    }

    #[test]
    fn test_from_cycles_ordered() {
        let cycles = vec![vec![0, 1, 2], vec![1, 2]];

        // Right to left: (0 1 2)(1 2)
        let p = Permutation::from_cycles_ordered(3, &cycles, CycleOrder::LastFirst).unwrap();
        assert_eq!(p.map(), &[1, 0, 2]);

        // Left to right: (1 2)(0 1 2)
        let p = Permutation::from_cycles_ordered(3, &cycles, CycleOrder::FirstFirst).unwrap();
        assert_eq!(p.map(), &[2, 1, 0]);
    }

    #[test]
    fn test_cycle_composition_properties() {
        // (0 1)(1 2) = (0 1 2)
        let p = Permutation::from_cycles(3, &[vec![0, 1], vec![1, 2]]).unwrap();
        let q = Permutation::from_cycles(3, &[vec![1, 2, 0]]).unwrap();
        assert_eq!(p, q);

        // a repeated point inside one cycle is not a cycle
        assert!(Permutation::from_cycles(3, &[vec![0, 1, 0]]).is_err());
    }

    #[test]
    fn test_from_map_rejects_non_bijections() {
        assert_eq!(
            Permutation::from_map(vec![0, 3, 1]),
            Err(PermutationError::NotABijection { degree: 3 })
        );
        assert_eq!(
            Permutation::from_map(vec![1, 1]),
            Err(PermutationError::NotABijection { degree: 2 })
        );
        assert_eq!(perm(&[2, 0, 1]).inv(), &[1, 2, 0]);
    }

    #[test]
    fn test_apply_slice() {
        let p = perm(&[2, 1, 3, 0]);
        let data = vec![10, 20, 30, 40];
        assert_eq!(p.apply_slice(&data), vec![40, 20, 10, 30]);
        assert_eq!(p.apply_slice_inv(&data), vec![30, 20, 40, 10]);

        let mut in_place = data.clone();
        p.apply_slice_in_place(&mut in_place);
        assert_eq!(in_place, p.apply_slice(&data));

        let mut in_place = data.clone();
        p.apply_slice_in_place_inv(&mut in_place);
        assert_eq!(in_place, p.apply_slice_inv(&data));
    }

    #[test]
    fn test_apply_out_of_range() {
        let p = perm(&[1, 0]);
        assert_eq!(p.apply(1), Ok(0));
        assert_eq!(p.apply_inv(0), Ok(1));
        assert_eq!(
            p.apply(2),
            Err(PermutationError::OutOfRange {
                point: 2,
                degree: 2
            })
        );
    }

    #[test]
    fn test_sort_inverse() {
        let data = vec![30, 10, 20, 40];
        let perm = Permutation::sort(&data);
        let sorted_data = perm.apply_slice(&data);
        assert_eq!(sorted_data, vec![10, 20, 30, 40]);

        let original_data = perm.inverse().apply_slice(&sorted_data);
        assert_eq!(original_data, data);
    }

    #[test]
    fn test_transpositions() {
        let p = perm(&[2, 0, 1, 3]);
        assert_eq!(p.transpositions(), vec![(0, 1), (0, 2)]);
        assert_eq!(p.find_cycles(), vec![vec![0, 2, 1], vec![3]]);
    }

    #[test]
    fn test_parity_and_order() {
        assert_eq!(perm(&[1, 0, 3, 2]).parity(), 1);
        assert_eq!(perm(&[2, 1, 0]).parity(), -1);
        assert_eq!(perm(&[1, 2, 3, 0]).parity(), -1);
        assert_eq!(Permutation::id(3).parity(), 1);

        assert_eq!(perm(&[1, 2, 3, 0]).order(), 4);
        assert_eq!(Permutation::id(0).order(), 1);
    }

    #[test]
    fn test_pow_tracks_sign() {
        let p = perm(&[1, 2, 0]).negated();
        assert_eq!(p.pow(2).map(), &[2, 0, 1]);
        assert!(!p.pow(2).is_antisymmetric());
        assert!(p.pow(3).is_inconsistent());
        assert_eq!(p.pow(0), Permutation::id(3));
    }

    #[test]
    fn test_compose_signs() {
        let a = perm(&[1, 0, 2]).negated();
        let b = perm(&[0, 2, 1]).negated();
        let ab = a.compose(&b).unwrap();
        assert_eq!(ab.map(), &[1, 2, 0]);
        assert!(!ab.is_antisymmetric());

        assert_eq!(a.inverse_compose(&ab), b);

        let aa = a.compose(&a.inverse()).unwrap();
        assert!(aa.is_identity());
        assert!(!aa.is_antisymmetric());

        assert_eq!(
            a.compose(&Permutation::id(2)),
            Err(PermutationError::DegreeMismatch { left: 3, right: 2 })
        );
    }

    #[test]
    fn test_support() {
        let p = perm(&[0, 2, 1, 3, 5, 4]);
        assert_eq!(p.support(), vec![1, 2, 4, 5]);
        assert_eq!(p.first_moved(), Some(1));
        assert_eq!(Permutation::id(3).first_moved(), None);
    }

    #[test]
    fn test_display() {
        insta::assert_snapshot!(perm(&[2, 0, 1, 3]).to_string(), @"(0 2 1) [2 0 1 3]");
        insta::assert_snapshot!(perm(&[1, 0]).negated().to_string(), @"-(0 1) [1 0]");
        insta::assert_snapshot!(Permutation::id(2).to_string(), @"() [0 1]");
    }

    fn arb_perm(n: usize) -> impl Strategy<Value = Permutation> {
        (Just((0..n).collect::<Vec<_>>()).prop_shuffle(), any::<bool>())
            .prop_map(|(map, sign)| perm(&map).with_antisymmetric(sign))
    }

    fn arb_triple() -> impl Strategy<Value = (Permutation, Permutation, Permutation)> {
        (1usize..9).prop_flat_map(|n| (arb_perm(n), arb_perm(n), arb_perm(n)))
    }

    proptest! {
        #[test]
        fn compose_is_associative((a, b, c) in arb_triple()) {
            let left = a.compose(&b).unwrap().compose(&c).unwrap();
            let right = a.compose(&b.compose(&c).unwrap()).unwrap();
            prop_assert_eq!(left, right);
        }

        #[test]
        fn compose_with_inverse_is_symmetric_identity((a, _, _) in arb_triple()) {
            let id = a.compose(&a.inverse()).unwrap();
            prop_assert!(id.is_identity());
            prop_assert!(!id.is_antisymmetric());
            prop_assert_eq!(id, Permutation::id(a.degree()));
        }

        #[test]
        fn parity_is_a_homomorphism((a, b, _) in arb_triple()) {
            prop_assert_eq!(a.compose(&b).unwrap().parity(), a.parity() * b.parity());
        }
    }
}
