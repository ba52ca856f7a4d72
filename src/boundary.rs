// Sorted boundary points of an `AddressSet`.
//
// Each stored key is a point where membership may change, and its bit
// says whether the addresses from that key up to the next stored key
// are members. Keys live in a domain slightly wider than the address
// space, so that two permanent sentinels can sit strictly outside it:
//
//   LOW (-1)                                   HIGH (2^32 + 1)
//   |  0 ... 2^32 - 1 (addresses)  2^32 (end)  |
//
// With both sentinels present, every predecessor and successor
// query has an answer and needs no special "nothing found" case.
//
// Invariants maintained by `AddressSet`:
//
// - `LOW` and `HIGH` are always present, both with bit `false`.
// - Reading keys in order, no two neighbours share a bit, except for
//   `HIGH` itself (the last real key always has bit `false`, as does `HIGH`).

use core::ops::Bound;
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::range::ADDRESS_SPACE_END;

pub(crate) type Key = i64;

/// Sentinel below the lowest address.
pub(crate) const LOW: Key = -1;

/// Sentinel above the end of the highest address block.
pub(crate) const HIGH: Key = ADDRESS_SPACE_END as Key + 1;

#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct Boundaries {
    btm: BTreeMap<Key, bool>,
}

impl Boundaries {
    /// Boundaries of the empty set: just the two sentinels.
    pub fn new() -> Self {
        let mut btm = BTreeMap::new();
        btm.insert(LOW, false);
        btm.insert(HIGH, false);
        Boundaries { btm }
    }

    pub fn set(&mut self, key: Key, bit: bool) {
        debug_assert!(LOW < key && key < HIGH, "sentinel {} overwritten", key);
        self.btm.insert(key, bit);
    }

    pub fn delete(&mut self, key: Key) {
        debug_assert!(LOW < key && key < HIGH, "sentinel {} deleted", key);
        self.btm.remove(&key);
    }

    /// The smallest stored key at or above `key`, with its bit.
    pub fn min_key_at_or_above(&self, key: Key) -> (Key, bool) {
        match self.btm.range(key..).next() {
            Some((&found, &bit)) => (found, bit),
            None => unreachable!("no boundary at or above {}; HIGH sentinel is missing", key),
        }
    }

    /// The largest stored key at or below `key`, with its bit.
    pub fn max_key_at_or_below(&self, key: Key) -> (Key, bool) {
        match self.btm.range(..=key).next_back() {
            Some((&found, &bit)) => (found, bit),
            None => unreachable!("no boundary at or below {}; LOW sentinel is missing", key),
        }
    }

    /// Keys strictly between `low` and `high`, in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `low >= high`.
    pub fn keys_strictly_between(&self, low: Key, high: Key) -> impl Iterator<Item = Key> + '_ {
        assert!(low < high);
        self.btm
            .range((Bound::Excluded(low), Bound::Excluded(high)))
            .map(|(&key, _bit)| key)
    }

    /// Deletes every key strictly between `low` and `high`,
    /// returning how many there were.
    pub fn delete_strictly_between(&mut self, low: Key, high: Key) -> usize {
        let doomed: Vec<Key> = self.keys_strictly_between(low, high).collect();
        for &key in &doomed {
            self.delete(key);
        }
        doomed.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Key, bool> {
        self.btm.iter()
    }

    pub fn len(&self) -> usize {
        self.btm.len()
    }

    /// Checks the sentinel and alternation invariants described at the
    /// top of this module.
    pub fn is_canonical(&self) -> bool {
        if self.btm.first_key_value() != Some((&LOW, &false))
            || self.btm.last_key_value() != Some((&HIGH, &false))
        {
            return false;
        }
        // Everything but `HIGH` alternates, and the entry just before
        // `HIGH` closes the last run.
        let real = self.btm.range(..HIGH);
        let alternates = real
            .clone()
            .zip(real.clone().skip(1))
            .all(|((_, first), (_, second))| first != second);
        let closed = real.last().map_or(false, |(_, &bit)| !bit);
        alternates && closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(Key, bool)]) -> Boundaries {
        let mut boundaries = Boundaries::new();
        for &(key, bit) in pairs {
            boundaries.set(key, bit);
        }
        boundaries
    }

    #[test]
    fn sentinels_sit_outside_address_space() {
        assert!(LOW < 0);
        assert!(HIGH > ADDRESS_SPACE_END as Key);
    }

    #[test]
    fn new_holds_only_sentinels() {
        let boundaries = Boundaries::new();
        let entries: Vec<(&Key, &bool)> = boundaries.iter().collect();
        assert_eq!(entries, vec![(&LOW, &false), (&HIGH, &false)]);
        assert_eq!(boundaries.len(), 2);
        assert!(boundaries.is_canonical());
    }

    #[test]
    fn neighbour_queries() {
        let boundaries = from_pairs(&[(10, true), (20, false)]);
        assert_eq!(boundaries.max_key_at_or_below(0), (LOW, false));
        assert_eq!(boundaries.max_key_at_or_below(10), (10, true));
        assert_eq!(boundaries.max_key_at_or_below(19), (10, true));
        assert_eq!(boundaries.max_key_at_or_below(20), (20, false));
        assert_eq!(boundaries.min_key_at_or_above(11), (20, false));
        assert_eq!(boundaries.min_key_at_or_above(20), (20, false));
        assert_eq!(boundaries.min_key_at_or_above(21), (HIGH, false));
    }

    #[test]
    fn strictly_between_excludes_both_ends() {
        let mut boundaries = from_pairs(&[(10, true), (20, false), (30, true), (40, false)]);
        let between: Vec<Key> = boundaries.keys_strictly_between(10, 40).collect();
        assert_eq!(between, vec![20, 30]);
        assert_eq!(boundaries.keys_strictly_between(10, 11).count(), 0);

        assert_eq!(boundaries.delete_strictly_between(10, 40), 2);
        assert_eq!(boundaries, from_pairs(&[(10, true), (40, false)]));
    }

    #[test]
    fn canonical_form_rejects_repeated_bits() {
        assert!(from_pairs(&[(10, true), (20, false)]).is_canonical());
        assert!(!from_pairs(&[(10, true), (20, true)]).is_canonical());
        assert!(!from_pairs(&[(10, false)]).is_canonical());
        // A run that never ends.
        assert!(!from_pairs(&[(10, true)]).is_canonical());
    }
}
