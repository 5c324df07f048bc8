//! Attribute and composure derivation from skill ranks.
//!
//! Both are pure and total. Missing skills count as rank 0, negative ranks
//! count as 0 and stored ranks above the maximum count as the maximum.

use std::collections::HashMap;

use crate::entities::SkillCatalog;
use crate::rules::skills::MAX_RANK;
use crate::value_objects::AttributeSet;

/// Skill id → rank, as stored on the character document.
pub type SkillRanks = HashMap<String, i32>;

/// Attribute = ceil(sum of inherent ranks under it / this)
pub const ATTRIBUTE_DIVISOR: u32 = 4;

/// Skills whose ranks feed composure (cool under fire)
pub const COMPOSURE_SKILLS: [&str; 3] = ["endurance", "resolve", "willpower"];

/// Composure = ceil(sum of composure skill ranks / this)
pub const COMPOSURE_DIVISOR: u32 = 3;

/// Rank of a skill, treating absent and negative ranks as 0.
pub fn rank_of(ranks: &SkillRanks, skill_id: &str) -> u32 {
    ranks.get(skill_id).copied().map_or(0, clamp_rank)
}

/// A stored rank within `0..=MAX_RANK`.
pub fn clamp_rank(rank: i32) -> u32 {
    u32::try_from(rank).unwrap_or(0).min(MAX_RANK)
}

/// Derives the four attributes from inherent skill ranks.
pub fn derive_attributes(ranks: &SkillRanks, catalog: &SkillCatalog) -> AttributeSet {
    let mut sums = AttributeSet::default();
    for skill in catalog.inherent() {
        if let Some(attribute) = skill.attribute() {
            let sum = sums.get(attribute) + rank_of(ranks, &skill.id);
            sums.set(attribute, sum);
        }
    }

    AttributeSet {
        phys: sums.phys.div_ceil(ATTRIBUTE_DIVISOR),
        reflex: sums.reflex.div_ceil(ATTRIBUTE_DIVISOR),
        soc: sums.soc.div_ceil(ATTRIBUTE_DIVISOR),
        ment: sums.ment.div_ceil(ATTRIBUTE_DIVISOR),
    }
}

/// Derives base composure, before burned composure and status effects.
pub fn derive_composure(ranks: &SkillRanks) -> u32 {
    COMPOSURE_SKILLS
        .iter()
        .map(|id| rank_of(ranks, id))
        .sum::<u32>()
        .div_ceil(COMPOSURE_DIVISOR)
}

/// Composure after burned points and the `cool_under_fire` status delta.
pub fn effective_composure(base: u32, burned: u32, status_delta: i32) -> u32 {
    let reduced = base.saturating_sub(burned) as i64;
    (reduced + status_delta as i64).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Attribute;
    use proptest::prelude::*;

    fn ranks(pairs: &[(&str, i32)]) -> SkillRanks {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_empty_ranks_derive_zero() {
        let attrs = derive_attributes(&SkillRanks::new(), SkillCatalog::whisperspace());
        assert_eq!(attrs, AttributeSet::default());
        assert_eq!(derive_composure(&SkillRanks::new()), 0);
    }

    #[test]
    fn test_attribute_rounds_up_quarter_of_ranks() {
        let catalog = SkillCatalog::whisperspace();
        let attrs = derive_attributes(&ranks(&[("athletics", 1)]), catalog);
        assert_eq!(attrs.phys, 1);

        let attrs = derive_attributes(&ranks(&[("athletics", 4), ("might", 1)]), catalog);
        assert_eq!(attrs.phys, 2);

        let attrs = derive_attributes(
            &ranks(&[("stealth", 5), ("acrobatics", 5), ("perception", 5), ("sleight_of_hand", 5)]),
            catalog,
        );
        assert_eq!(attrs.reflex, 5);
    }

    #[test]
    fn test_learned_skills_do_not_feed_attributes() {
        let attrs = derive_attributes(&ranks(&[("pistols", 5), ("medicine", 5)]), SkillCatalog::whisperspace());
        assert_eq!(attrs, AttributeSet::default());
    }

    #[test]
    fn test_oversized_ranks_count_as_max() {
        let sheet = ranks(&[("stealth", 100_000), ("willpower", i32::MAX)]);
        assert_eq!(rank_of(&sheet, "stealth"), 5);
        assert_eq!(derive_attributes(&sheet, SkillCatalog::whisperspace()).reflex, 2);
        assert_eq!(derive_composure(&sheet), 2);
    }

    #[test]
    fn test_negative_ranks_count_as_zero() {
        let attrs = derive_attributes(&ranks(&[("athletics", -3), ("might", 1)]), SkillCatalog::whisperspace());
        assert_eq!(attrs.phys, 1);
    }

    #[test]
    fn test_composure_rounds_up_third_of_its_skills() {
        assert_eq!(derive_composure(&ranks(&[("resolve", 1)])), 1);
        assert_eq!(derive_composure(&ranks(&[("resolve", 2), ("willpower", 2)])), 2);
        assert_eq!(derive_composure(&ranks(&[("resolve", 5), ("willpower", 5), ("endurance", 5)])), 5);
        assert_eq!(derive_composure(&ranks(&[("stealth", 5)])), 0);
    }

    #[test]
    fn test_effective_composure_applies_burn_and_status() {
        assert_eq!(effective_composure(3, 1, 0), 2);
        assert_eq!(effective_composure(3, 5, 0), 0);
        assert_eq!(effective_composure(3, 0, 2), 5);
        assert_eq!(effective_composure(1, 0, -4), 0);
    }

    proptest! {
        #[test]
        fn test_raising_one_rank_never_lowers_an_attribute(
            base in proptest::collection::vec(0i32..=5, 16),
            pick in 0usize..16,
        ) {
            let catalog = SkillCatalog::whisperspace();
            let ids: Vec<&str> = catalog.inherent().map(|s| s.id.as_str()).collect();
            let mut before: SkillRanks = ids.iter().zip(&base).map(|(id, r)| (id.to_string(), *r)).collect();
            let low = derive_attributes(&before, catalog);
            let entry = before.entry(ids[pick].to_string()).or_insert(0);
            *entry = (*entry + 1).min(5);
            let high = derive_attributes(&before, catalog);
            for attribute in Attribute::ALL {
                prop_assert!(high.get(attribute) >= low.get(attribute));
            }
        }

        #[test]
        fn test_insertion_order_does_not_matter(base in proptest::collection::vec(0i32..=5, 16)) {
            let catalog = SkillCatalog::whisperspace();
            let pairs: Vec<(String, i32)> = catalog
                .inherent()
                .map(|s| s.id.clone())
                .zip(base)
                .collect();
            let forward: SkillRanks = pairs.iter().cloned().collect();
            let backward: SkillRanks = pairs.iter().rev().cloned().collect();
            prop_assert_eq!(derive_attributes(&forward, catalog), derive_attributes(&backward, catalog));
        }
    }
}
