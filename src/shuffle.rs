// ========================================================================================
//
//                              THE PERMUTATION ENGINE
//
// ========================================================================================
//
// Produces the two conditioning orders a run operates on: a uniformly random
// permutation of the ordering list, and that permutation's exact element-reverse.
// The reverse is never shuffled independently; it is always derived from the
// forward order, so the two stay mirror images by construction.
//
// Determinism contract: the permutation is a pure function of the ordering and
// the effective seed. The RNG is constructed locally from the seed — there is no
// process-global generator state — so repeated runs with the same seed and round
// reproduce the same orders exactly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A shuffled conditioning order and its element-reverse.
#[derive(Debug, Clone)]
pub struct ConditioningOrders {
    pub forward: Vec<String>,
    pub reverse: Vec<String>,
}

/// Combines the user-supplied base seed with the randomization-round counter.
///
/// Runs sharing a base seed but differing in round must decorrelate, so the
/// round is folded into the seed before the RNG ever sees it.
pub fn effective_seed(base_seed: u64, round: u32) -> u64 {
    base_seed.wrapping_add(u64::from(round))
}

/// Shuffles `ordering` with a Fisher–Yates pass over a freshly seeded `StdRng`,
/// then reverses a copy of the result.
pub fn conditioning_orders(ordering: &[String], base_seed: u64, round: u32) -> ConditioningOrders {
    let mut forward = ordering.to_vec();
    let mut rng = StdRng::seed_from_u64(effective_seed(base_seed, round));
    forward.shuffle(&mut rng);

    let mut reverse = forward.clone();
    reverse.reverse();

    ConditioningOrders { forward, reverse }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reverse_is_the_exact_element_reverse_of_forward() {
        let ordering = names(&["a", "b", "c", "d", "e"]);
        let orders = conditioning_orders(&ordering, 7, 3);

        let mut mirrored = orders.forward.clone();
        mirrored.reverse();
        assert_eq!(orders.reverse, mirrored);
    }

    #[test]
    fn both_orders_are_bijections_on_the_input() {
        let ordering = names(&["a", "b", "c", "d", "e", "f", "g"]);
        let orders = conditioning_orders(&ordering, 42, 1);

        let mut expected = ordering.clone();
        expected.sort();
        for order in [&orders.forward, &orders.reverse] {
            let mut sorted = order.clone();
            sorted.sort();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn duplicates_in_the_ordering_survive_the_shuffle() {
        let ordering = names(&["a", "b", "a"]);
        let orders = conditioning_orders(&ordering, 9, 2);
        assert_eq!(
            orders.forward.iter().filter(|n| n.as_str() == "a").count(),
            2
        );
        assert_eq!(orders.forward.len(), 3);
    }

    #[test]
    fn same_seed_and_round_reproduce_the_same_orders() {
        let ordering = names(&["a", "b", "c", "d", "e", "f"]);
        let first = conditioning_orders(&ordering, 123, 4);
        let second = conditioning_orders(&ordering, 123, 4);
        assert_eq!(first.forward, second.forward);
        assert_eq!(first.reverse, second.reverse);
    }

    #[test]
    fn differing_rounds_decorrelate_runs_sharing_a_base_seed() {
        // With 8 elements a seed collision producing identical permutations is
        // possible in principle but astronomically unlikely for these fixed
        // seeds; this pins the decorrelation behavior, not a probability.
        let ordering = names(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let round_one = conditioning_orders(&ordering, 123, 1);
        let round_two = conditioning_orders(&ordering, 123, 2);
        assert_ne!(round_one.forward, round_two.forward);
    }

    #[test]
    fn effective_seed_folds_the_round_in() {
        assert_eq!(effective_seed(10, 5), 15);
        assert_eq!(effective_seed(u64::MAX, 1), 0);
    }

    #[test]
    fn empty_and_singleton_orderings_pass_through() {
        let empty = conditioning_orders(&[], 1, 1);
        assert!(empty.forward.is_empty());
        assert!(empty.reverse.is_empty());

        let single = conditioning_orders(&names(&["only"]), 1, 1);
        assert_eq!(single.forward, vec!["only"]);
        assert_eq!(single.reverse, vec!["only"]);
    }
}
