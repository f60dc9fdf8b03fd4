//! # Permgroup
//!
//! Permgroup is a Rust library for finite groups of signed permutations, the
//! symmetries of tensor index slots. A slot permutation may flip the sign of the
//! tensor it acts on, so every permutation carries an antisymmetry flag next to its
//! image.
//!
//! Groups are stored as a base and strong generating set built with the
//! Schreier-Sims algorithm. On top of that the library offers membership and order,
//! point and set stabilizers, unions and intersections, coset representatives, and a
//! budgeted backtrack search for elements satisfying caller predicates.

pub mod group;
pub mod permutation;
