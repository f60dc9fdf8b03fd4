use indexmap::IndexSet;
use num_bigint::BigUint;
use proptest::prelude::*;

use super::{schreier::stabilizer_generators, GroupError, PermutationGroup};
use crate::permutation::{Permutation, PermutationError};

fn perm(map: &[usize]) -> Permutation {
    Permutation::from_map(map.to_vec()).unwrap()
}

/// Every product of the generators, found by closing the identity under left
/// multiplication.
fn closure(degree: usize, generators: &[Permutation]) -> IndexSet<Permutation> {
    let mut elements = IndexSet::new();
    elements.insert(Permutation::id(degree));
    let mut cursor = 0;
    while cursor < elements.len() {
        let x = elements[cursor].clone();
        for g in generators {
            elements.insert(g.compose(&x).unwrap());
        }
        cursor += 1;
    }
    elements
}

#[test]
fn scenario_a_schreier_vector_and_stabilizer() {
    let gens = vec![
        perm(&[1, 0, 2, 3, 4]),
        perm(&[0, 1, 3, 2, 4]),
        perm(&[0, 3, 1, 2, 4]),
    ];
    let group = PermutationGroup::new(5, gens.clone()).unwrap();
    let orbit = group.orbit(0).unwrap();
    similar_asserts::assert_eq!(orbit.points(), &[0, 1, 3, 2]);
    insta::assert_snapshot!(orbit.schreier_vector().to_string(), @"[*, 0, 1, 2, -]");

    assert_eq!(group.order(), BigUint::from(24u32));
    let stab = group.stabilizer(&[0]).unwrap();
    assert_eq!(stab.order(), BigUint::from(6u32));
    for s in stabilizer_generators(5, &gens, 0).unwrap() {
        assert_eq!(s[0], 0);
        assert!(group.contains(&s));
        assert!(stab.contains(&s));
    }
    assert_eq!(BigUint::from(orbit.len()) * stab.order(), group.order());
}

#[test]
fn scenario_b_full_symmetric_groups() {
    let four_cycle = perm(&[1, 2, 3, 0]);
    let swap = perm(&[1, 0, 2, 3]);
    let s4 = PermutationGroup::from_generators(vec![four_cycle, swap]).unwrap();
    assert_eq!(s4.order(), BigUint::from(24u32));
    assert!(s4.is_transitive());

    let six_cycle = perm(&[1, 2, 3, 4, 5, 0]);
    let adjacent = perm(&[1, 0, 2, 3, 4, 5]);
    let s6 = PermutationGroup::from_generators(vec![six_cycle, adjacent]).unwrap();
    assert_eq!(s6.order(), BigUint::from(720u32));
    assert_eq!(s6.order(), PermutationGroup::symmetric(6).order());
    assert!(s6.verify());
}

#[test]
fn scenario_c_levi_civita() {
    let three_cycle = perm(&[1, 2, 0]);
    let flip = perm(&[1, 0, 2]).negated();
    let group = PermutationGroup::new(3, vec![three_cycle, flip]).unwrap();
    assert_eq!(group.order(), BigUint::from(6u32));

    let (antisymmetric, symmetric): (Vec<_>, Vec<_>) =
        group.iter().partition(Permutation::is_antisymmetric);
    assert_eq!(antisymmetric.len(), 3);
    assert_eq!(symmetric.len(), 3);
    assert!(antisymmetric.iter().all(|g| g.parity() == -1));

    assert!(group.contains(&perm(&[0, 2, 1]).negated()));
    assert!(!group.contains(&perm(&[0, 2, 1])));
    assert_eq!(group.sign_preserving_subgroup().order(), BigUint::from(3u32));
    let levi_civita = PermutationGroup::antisymmetric(3);
    assert!(group.is_subgroup_of(&levi_civita) && levi_civita.is_subgroup_of(&group));
}

#[test]
fn scenario_d_inconsistent_generators() {
    let signed = perm(&[2, 1, 3, 0]).negated();
    assert_eq!(
        PermutationGroup::new(4, vec![signed.clone()]),
        Err(GroupError::InconsistentGenerators)
    );
    assert_eq!(
        PermutationGroup::from_generators(vec![signed]),
        Err(GroupError::InconsistentGenerators)
    );
    assert_eq!(
        PermutationGroup::new(2, vec![Permutation::id(2).negated()]),
        Err(GroupError::InconsistentGenerators)
    );
    // (0 1) with both signs
    assert_eq!(
        PermutationGroup::symmetric(3).union(&PermutationGroup::antisymmetric(3)),
        Err(GroupError::InconsistentGenerators)
    );
}

#[test]
fn construction_errors() {
    assert_eq!(
        PermutationGroup::from_generators(vec![]),
        Err(GroupError::EmptyGenerators)
    );
    assert_eq!(
        PermutationGroup::new(3, vec![perm(&[1, 0])]),
        Err(GroupError::Permutation(PermutationError::DegreeMismatch {
            left: 3,
            right: 2
        }))
    );
    assert!(PermutationGroup::new(3, vec![]).unwrap().is_trivial());
    assert_eq!(
        PermutationGroup::symmetric(3).union(&PermutationGroup::symmetric(4)),
        Err(GroupError::Permutation(PermutationError::DegreeMismatch {
            left: 3,
            right: 4
        }))
    );
}

#[test]
fn standard_groups() {
    let orders = [1u32, 1, 2, 6, 24, 120];
    for (degree, &order) in orders.iter().enumerate() {
        assert_eq!(PermutationGroup::symmetric(degree).order(), BigUint::from(order));
        assert_eq!(PermutationGroup::antisymmetric(degree).order(), BigUint::from(order));
        assert_eq!(
            PermutationGroup::cyclic(degree).order(),
            BigUint::from(degree.max(1))
        );
    }
    let signed = PermutationGroup::antisymmetric(5);
    assert!(signed.iter().all(|g| g.is_antisymmetric() == (g.parity() == -1)));
    assert!(PermutationGroup::trivial(0).iter().eq([Permutation::id(0)]));
    assert_eq!(
        PermutationGroup::symmetric(12).order().to_string(),
        "479001600"
    );
}

#[test]
fn queries() {
    let group = PermutationGroup::new(
        6,
        vec![perm(&[1, 0, 2, 3, 4, 5]), perm(&[0, 1, 3, 4, 2, 5])],
    )
    .unwrap();
    assert_eq!(group.orbits(), vec![vec![0, 1], vec![2, 3, 4], vec![5]]);
    assert!(!group.is_transitive());
    assert!(!group.is_trivial());
    assert_eq!(group.order(), BigUint::from(6u32));
    assert_eq!(group.degree(), 6);
    assert_eq!(group.generators().len(), 2);
    assert!(matches!(
        group.orbit(6),
        Err(PermutationError::OutOfRange { point: 6, degree: 6 })
    ));

    let base = group.base();
    for g in group.strong_generators() {
        assert!(group.contains(&g));
    }
    assert!(group.iter().all(|g| {
        g.is_identity() || base.iter().any(|&b| g[b] != b)
    }));
    assert!(!group.contains(&Permutation::id(5)));
    assert!(group.is_subgroup_of(&PermutationGroup::symmetric(6)));
    assert!(!PermutationGroup::symmetric(6).is_subgroup_of(&group));
}

#[test]
fn point_stabilizers() {
    let s6 = PermutationGroup::symmetric(6);
    let stab = s6.stabilizer(&[5, 2, 5]).unwrap();
    assert_eq!(stab.order(), BigUint::from(24u32));
    assert!(stab.iter().all(|g| g[5] == 5 && g[2] == 2));
    assert!(stab.verify());
    assert!(stab.is_subgroup_of(&s6));

    assert_eq!(s6.stabilizer(&[]).unwrap().order(), s6.order());
    assert!(s6.stabilizer(&[0, 1, 2, 3, 4]).unwrap().is_trivial());
    assert_eq!(
        s6.stabilizer(&[6]),
        Err(GroupError::Permutation(PermutationError::OutOfRange {
            point: 6,
            degree: 6
        }))
    );
}

#[test]
fn union_of_groups() {
    let rotations = PermutationGroup::cyclic(4);
    let swap = PermutationGroup::new(4, vec![perm(&[1, 0, 2, 3])]).unwrap();
    let all = rotations.union(&swap).unwrap();
    assert_eq!(all.order(), BigUint::from(24u32));
    assert!(rotations.is_subgroup_of(&all) && swap.is_subgroup_of(&all));
    assert_eq!(all.generators().len(), 2);
}

#[test]
fn construction_is_deterministic() {
    let gens = vec![perm(&[1, 2, 3, 4, 5, 0]), perm(&[1, 0, 2, 3, 4, 5])];
    let a = PermutationGroup::new(6, gens.clone()).unwrap();
    let b = PermutationGroup::new(6, gens).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.base(), b.base());
    for (x, y) in a.chain().levels().iter().zip(b.chain().levels()) {
        assert_eq!(x.orbit().points(), y.orbit().points());
        assert_eq!(x.orbit().schreier_vector(), y.orbit().schreier_vector());
    }
    similar_asserts::assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
}

fn signed_permutation(degree: usize) -> impl Strategy<Value = Permutation> {
    (
        Just((0..degree).collect::<Vec<usize>>()).prop_shuffle(),
        any::<bool>(),
    )
        .prop_map(|(map, antisymmetric)| {
            Permutation::from_map(map)
                .unwrap()
                .with_antisymmetric(antisymmetric)
        })
}

fn generating_sets() -> impl Strategy<Value = (usize, Vec<Permutation>, Permutation)> {
    (1usize..=5).prop_flat_map(|degree| {
        (
            Just(degree),
            prop::collection::vec(signed_permutation(degree), 0..4),
            signed_permutation(degree),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn agrees_with_explicit_enumeration((degree, gens, candidate) in generating_sets()) {
        let elements = closure(degree, &gens);
        let group = PermutationGroup::new(degree, gens.clone());
        if elements.contains(&Permutation::id(degree).negated()) {
            prop_assert_eq!(group, Err(GroupError::InconsistentGenerators));
            return Ok(());
        }
        let group = group.unwrap();

        prop_assert_eq!(group.order(), BigUint::from(elements.len()));
        prop_assert!(group.verify());
        for g in &gens {
            let (residue, passed) = group.chain().sift(g);
            prop_assert_eq!(passed, group.chain().levels().len());
            prop_assert!(residue.is_identity() && !residue.is_antisymmetric());
        }
        prop_assert_eq!(group.contains(&candidate), elements.contains(&candidate));

        let mut listed: Vec<_> = group.iter().collect();
        listed.sort();
        let mut expected: Vec<_> = elements.iter().cloned().collect();
        expected.sort();
        prop_assert_eq!(listed, expected);
    }

    #[test]
    fn orbit_stabilizer((degree, gens, _candidate) in generating_sets()) {
        let Ok(group) = PermutationGroup::new(degree, gens) else {
            return Ok(());
        };
        for point in 0..degree {
            let orbit = group.orbit(point).unwrap();
            let stab = group.stabilizer(&[point]).unwrap();
            prop_assert_eq!(BigUint::from(orbit.len()) * stab.order(), group.order());
            prop_assert!(stab.is_subgroup_of(&group));
        }
    }

    #[test]
    fn cosets_partition((degree, gens, _candidate) in generating_sets()) {
        let Ok(group) = PermutationGroup::new(degree, gens) else {
            return Ok(());
        };
        let subgroup = group.stabilizer(&[0]).unwrap();
        let reps = group.left_coset_representatives(&subgroup).unwrap();
        prop_assert_eq!(
            BigUint::from(reps.len()) * subgroup.order(),
            group.order()
        );
        for (i, a) in reps.iter().enumerate() {
            prop_assert!(group.contains(a));
            for b in &reps[..i] {
                prop_assert!(!subgroup.contains(&a.inverse().compose(b).unwrap()));
            }
        }

        let kernel = group.sign_preserving_subgroup();
        let signed = group.iter().filter(|g| g.is_antisymmetric()).count();
        prop_assert_eq!(
            kernel.order() * BigUint::from(if signed > 0 { 2u32 } else { 1 }),
            group.order()
        );
    }

    #[test]
    fn intersections_match_enumeration(
        (degree, gens, candidate) in generating_sets(),
        other in prop::collection::vec(any::<prop::sample::Index>(), 0..3),
    ) {
        let Ok(group) = PermutationGroup::new(degree, gens) else {
            return Ok(());
        };
        let s = PermutationGroup::symmetric(degree);
        let all: Vec<_> = s.iter().collect();
        let picked: Vec<_> = other.iter().map(|i| i.get(&all).clone()).chain([candidate]).collect();
        let Ok(other) = PermutationGroup::new(degree, picked) else {
            return Ok(());
        };

        let both = group.intersection(&other).unwrap();
        let expected = group.iter().filter(|g| other.contains(g)).count();
        prop_assert_eq!(both.order(), BigUint::from(expected));
        prop_assert!(both.is_subgroup_of(&group) && both.is_subgroup_of(&other));
    }

    #[test]
    fn set_stabilizers_match_enumeration(
        (degree, gens, _candidate) in generating_sets(),
        mask in prop::collection::vec(any::<bool>(), 5),
    ) {
        let Ok(group) = PermutationGroup::new(degree, gens) else {
            return Ok(());
        };
        let set: Vec<usize> = (0..degree).filter(|&i| mask[i]).collect();
        let stab = group.setwise_stabilizer(&set).unwrap();
        let expected = group
            .iter()
            .filter(|g| set.iter().all(|p| set.contains(&g[*p])))
            .count();
        prop_assert_eq!(stab.order(), BigUint::from(expected));
        prop_assert!(stab.is_subgroup_of(&group));
    }
}
