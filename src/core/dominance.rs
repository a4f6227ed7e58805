//! Dominance between requirement branches and redundant-branch elimination.
//!
//! `dominates(a, b)` is a one-sided proof that `a` is never worse than `b`.
//! A `false` answer only means no proof was found.

use super::branch::RequirementBranch;
use super::modifier::{classify_single, ModifierEffect};

/// Start offsets at which `needle` occurs as a contiguous run of `haystack`.
fn window_offsets<'a>(haystack: &'a [String], needle: &'a [String]) -> impl Iterator<Item = usize> + 'a {
    let last = haystack.len().saturating_sub(needle.len());
    (0..=last).filter(move |&start| {
        haystack.len() >= needle.len() && haystack[start..start + needle.len()] == *needle
    })
}

/// True when `inner` occurs contiguously in `outer` and every modifier of
/// `outer` outside that occurrence classifies as `required`.
fn embeds_with_extras(outer: &[String], inner: &[String], required: ModifierEffect) -> bool {
    window_offsets(outer, inner).any(|start| {
        let end = start + inner.len();
        outer[..start]
            .iter()
            .chain(outer[end..].iter())
            .all(|m| classify_single(m) == required)
    })
}

/// Whether branch `a` makes branch `b` redundant.
///
/// Region requirements do not take part in the subset test.
// TODO: confirm with logic maintainers whether region requirements should
// join the subset check once merged branches start carrying them.
pub fn dominates(a: &RequirementBranch, b: &RequirementBranch) -> bool {
    if !a.item_requirements.is_subset(&b.item_requirements)
        || !a.location_requirements.is_subset(&b.location_requirements)
    {
        return false;
    }

    if a.state_modifiers.len() >= b.state_modifiers.len() {
        // `a` does everything `b` does plus only helpful extras.
        embeds_with_extras(&a.state_modifiers, &b.state_modifiers, ModifierEffect::Beneficial)
    } else {
        // `b` does everything `a` does plus only harmful extras.
        embeds_with_extras(&b.state_modifiers, &a.state_modifiers, ModifierEffect::Detrimental)
    }
}

/// Remove every branch dominated by another branch of the same list.
///
/// Single pass: for each position `i`, later branches are compared against
/// it; when a later branch dominates `branches[i]` it is removed and the
/// comparison restarts against the branch that moved into position `i`.
/// Returns the number of removed branches.
pub fn eliminate_redundant(branches: &mut Vec<RequirementBranch>) -> usize {
    let mut removed = 0;
    let mut i = 0;

    while i < branches.len() {
        let mut j = i + 1;
        while j < branches.len() {
            if dominates(&branches[j], &branches[i]) {
                branches.remove(i);
                removed += 1;
                j = i + 1;
            } else if dominates(&branches[i], &branches[j]) {
                branches.remove(j);
                removed += 1;
            } else {
                j += 1;
            }
        }
        i += 1;
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(items: &[&str], modifiers: &[&str]) -> RequirementBranch {
        RequirementBranch::new()
            .with_items(items.iter().copied())
            .with_modifiers(modifiers.iter().copied())
    }

    #[test]
    fn test_subset_without_modifiers_dominates() {
        let a = branch(&["Sword"], &[]);
        let b = branch(&["Sword", "Lantern"], &[]);
        assert!(dominates(&a, &b));
        assert!(!dominates(&b, &a));
    }

    #[test]
    fn test_identical_branches_dominate_each_other() {
        let a = branch(&["Sword"], &["$TAKEDAMAGE"]);
        assert!(dominates(&a, &a.clone()));
    }

    #[test]
    fn test_location_requirements_take_part() {
        let a = RequirementBranch::new().with_locations(["Ledge"]);
        let b = RequirementBranch::new();
        assert!(!dominates(&a, &b));
        assert!(dominates(&b, &a));
    }

    #[test]
    fn test_region_requirements_are_ignored() {
        let a = RequirementBranch::new().with_regions(["Cliffs"]);
        let b = RequirementBranch::new();
        assert!(dominates(&a, &b));
    }

    #[test]
    fn test_shorter_dominates_when_extra_is_detrimental() {
        let longer = branch(&["Sword"], &["$EQUIPPEDCHARM[Grubsong]", "$TAKEDAMAGE"]);
        let shorter = branch(&["Sword"], &["$EQUIPPEDCHARM[Grubsong]"]);
        assert!(dominates(&shorter, &longer));
        assert!(!dominates(&longer, &shorter));
    }

    #[test]
    fn test_shorter_does_not_dominate_when_extra_is_beneficial() {
        let longer = branch(&[], &["$TAKEDAMAGE", "$BENCHRESET"]);
        let shorter = branch(&[], &["$TAKEDAMAGE"]);
        assert!(!dominates(&shorter, &longer));
        assert!(dominates(&longer, &shorter));
    }

    #[test]
    fn test_order_matters() {
        let a = branch(&[], &["$TAKEDAMAGE", "$REGAINSOUL"]);
        let b = branch(&[], &["$REGAINSOUL", "$TAKEDAMAGE"]);
        assert!(!dominates(&a, &b));
        assert!(!dominates(&b, &a));
    }

    #[test]
    fn test_window_must_be_contiguous() {
        let a = branch(&[], &["$TAKEDAMAGE", "$BENCHRESET", "$SPENDSOUL"]);
        let b = branch(&[], &["$TAKEDAMAGE", "$SPENDSOUL"]);
        assert!(!dominates(&a, &b));
    }

    #[test]
    fn test_extras_may_surround_the_window() {
        let a = branch(&[], &["$BENCHRESET", "$TAKEDAMAGE", "$REGAINSOUL"]);
        let b = branch(&[], &["$TAKEDAMAGE"]);
        assert!(dominates(&a, &b));

        let a = branch(&[], &["$TAKEDAMAGE", "$TAKEDAMAGE", "$BENCHRESET"]);
        let b = branch(&[], &["$TAKEDAMAGE", "$BENCHRESET"]);
        assert!(!dominates(&a, &b));
    }

    #[test]
    fn test_unclassifiable_modifiers_are_not_dominated() {
        let a = branch(&[], &["$STARTLOCATION", "$TAKEDAMAGE"]);
        let b = branch(&[], &["$TAKEDAMAGE"]);
        assert!(!dominates(&a, &b));
        assert!(!dominates(&b, &a));
    }

    #[test]
    fn test_eliminate_removes_longer_detrimental_branch() {
        let mut branches = vec![
            branch(&["Sword"], &["$EQUIPPEDCHARM[Grubsong]", "$TAKEDAMAGE"]),
            branch(&["Sword"], &["$EQUIPPEDCHARM[Grubsong]"]),
        ];
        let removed = eliminate_redundant(&mut branches);
        assert_eq!(removed, 1);
        assert_eq!(branches, vec![branch(&["Sword"], &["$EQUIPPEDCHARM[Grubsong]"])]);
    }

    #[test]
    fn test_eliminate_restarts_after_removing_front() {
        let mut branches = vec![
            branch(&["A", "B", "C"], &[]),
            branch(&["A", "B"], &[]),
            branch(&["A"], &[]),
            branch(&["Z"], &[]),
        ];
        eliminate_redundant(&mut branches);
        assert_eq!(branches, vec![branch(&["A"], &[]), branch(&["Z"], &[])]);
    }

    #[test]
    fn test_eliminate_keeps_incomparable() {
        let mut branches = vec![branch(&["A"], &[]), branch(&["B"], &[])];
        assert_eq!(eliminate_redundant(&mut branches), 0);
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn test_eliminate_collapses_duplicates() {
        let mut branches = vec![branch(&["A"], &[]), branch(&["A"], &[]), branch(&["A"], &[])];
        assert_eq!(eliminate_redundant(&mut branches), 2);
        assert_eq!(branches.len(), 1);
    }

    // =========================================================================
    // Property-based tests
    // =========================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_modifier() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("$BENCHRESET".to_string()),
                Just("$TAKEDAMAGE".to_string()),
                Just("$EQUIPPEDCHARM[Grubsong]".to_string()),
                Just("$WARPTOSTART".to_string()),
            ]
        }

        fn arb_branch() -> impl Strategy<Value = RequirementBranch> {
            (
                prop::collection::btree_set("[A-D]", 0..3),
                prop::collection::btree_set("[a-b]", 0..2),
                prop::collection::vec(arb_modifier(), 0..3),
            )
                .prop_map(|(items, locations, modifiers)| {
                    RequirementBranch::new()
                        .with_items(items)
                        .with_locations(locations)
                        .with_modifiers(modifiers)
                })
        }

        proptest! {
            // Property: running elimination twice changes nothing the second time
            #[test]
            fn prop_elimination_idempotent(branches in prop::collection::vec(arb_branch(), 0..8)) {
                let mut once = branches;
                eliminate_redundant(&mut once);
                let mut twice = once.clone();
                let removed = eliminate_redundant(&mut twice);
                prop_assert_eq!(removed, 0);
                prop_assert_eq!(once, twice);
            }

            // Property: dominance implies the term sets are subsets
            #[test]
            fn prop_dominance_requires_subsets(a in arb_branch(), b in arb_branch()) {
                if dominates(&a, &b) {
                    prop_assert!(a.item_requirements.is_subset(&b.item_requirements));
                    prop_assert!(a.location_requirements.is_subset(&b.location_requirements));
                }
            }

            // Property: every branch dominates itself
            #[test]
            fn prop_dominance_reflexive(a in arb_branch()) {
                prop_assert!(dominates(&a, &a));
            }

            // Property: no survivor of elimination dominates another survivor
            #[test]
            fn prop_survivors_pairwise_undominated(branches in prop::collection::vec(arb_branch(), 0..8)) {
                let mut survivors = branches;
                eliminate_redundant(&mut survivors);
                for (i, a) in survivors.iter().enumerate() {
                    for (j, b) in survivors.iter().enumerate() {
                        if i != j {
                            prop_assert!(!dominates(a, b));
                        }
                    }
                }
            }
        }
    }
}
