use core::fmt::{self, Debug, Display};
use core::iter::FusedIterator;
use core::ops::Range;
use std::collections::btree_map;
use std::net::Ipv4Addr;

use log::{debug, trace};
#[cfg(feature = "serde1")]
use serde::{
    de::{self, Deserialize, Deserializer, SeqAccess, Visitor},
    ser::{Serialize, Serializer},
};

use crate::boundary::{Boundaries, Key, HIGH};
use crate::range::ADDRESS_SPACE_END;
use crate::{AddressRange, AddressRangeError};

/// A set of IPv4 addresses, built up from and carved into by CIDR blocks.
///
/// Internally the set is a sorted map of boundary points: each stored
/// address marks where membership switches on or off. Adding or
/// removing a block touches only the boundaries inside and at the edges
/// of that block, and a membership lookup is a single predecessor query,
/// so all three are logarithmic in the number of boundaries.
///
/// Contiguous and overlapping blocks are coalesced, so the boundary map
/// is always the minimal description of the set. Two sets holding the
/// same addresses therefore compare equal no matter how they were built.
#[derive(Clone, PartialEq, Eq)]
pub struct AddressSet {
    boundaries: Boundaries,
}

impl Default for AddressSet {
    fn default() -> Self {
        AddressSet::new()
    }
}

impl AddressSet {
    /// Makes a new empty `AddressSet`.
    pub fn new() -> Self {
        AddressSet {
            boundaries: Boundaries::new(),
        }
    }

    /// Returns `true` if the set covers the specified address.
    ///
    /// Accepts either an [`Ipv4Addr`] or its big-endian `u32` value.
    pub fn contains<A: Into<u32>>(&self, address: A) -> bool {
        let address: u32 = address.into();
        self.contains_key(Key::from(address))
    }

    fn contains_key(&self, key: Key) -> bool {
        // There is always a boundary at or below any key,
        // thanks to the `LOW` sentinel.
        let (_boundary, member) = self.boundaries.max_key_at_or_below(key);
        member
    }

    /// Returns `true` if the set holds no addresses.
    pub fn is_empty(&self) -> bool {
        // Just the two sentinels.
        self.boundaries.len() == 2
    }

    /// Adds every address in `range` to the set.
    ///
    /// If the range overlaps or is immediately adjacent to addresses
    /// already in the set, they are coalesced into one contiguous run.
    pub fn add(&mut self, range: AddressRange) {
        trace!("adding {}", range);
        self.paint(range.as_range(), true);
    }

    /// Removes every address in `range` from the set, if any were present.
    ///
    /// Runs that partially overlap the range are cut back
    /// (or split in two) so that they no longer cover it.
    pub fn remove(&mut self, range: AddressRange) {
        trace!("removing {}", range);
        self.paint(range.as_range(), false);
    }

    /// Parses `text` as an [`AddressRange`] and adds it.
    ///
    /// The set is left untouched if `text` doesn't parse.
    pub fn add_str(&mut self, text: &str) -> Result<(), AddressRangeError> {
        self.add(text.parse()?);
        Ok(())
    }

    /// Parses `text` as an [`AddressRange`] and removes it.
    ///
    /// The set is left untouched if `text` doesn't parse.
    pub fn remove_str(&mut self, text: &str) -> Result<(), AddressRangeError> {
        self.remove(text.parse()?);
        Ok(())
    }

    /// Gets an iterator over the maximal runs of member addresses,
    /// in ascending order.
    ///
    /// Each run is a half-open range of integer addresses. Runs never
    /// touch each other; a run that includes `255.255.255.255`
    /// ends at `2^32`.
    pub fn ranges(&self) -> Ranges<'_> {
        let mut inner = self.boundaries.iter();
        // Skip the `LOW` sentinel; it never starts a run.
        inner.next();
        Ranges { inner }
    }

    /// Forces membership of every address in `span` to `member`.
    ///
    /// `span` need not be CIDR-aligned, but must be non-empty and lie
    /// within the address space.
    fn paint(&mut self, span: Range<u64>, member: bool) {
        assert!(span.start < span.end);
        assert!(span.end <= ADDRESS_SPACE_END);
        let begin = span.start as Key;
        let end = span.end as Key;

        // Everything the edge decisions depend on must be read
        // before the map is touched.
        let (succ, succ_member) = self.boundaries.min_key_at_or_above(end);
        let (pred, pred_member) = self.boundaries.max_key_at_or_below(begin);
        let end_member = self.contains_key(end);
        let begin_member = self.contains_key(begin);

        // Inside the span every address ends up the same,
        // so none of its boundaries matter any more.
        let dropped = self.boundaries.delete_strictly_between(begin, end);
        let mut edges_changed = false;

        // Right edge.
        if succ == end {
            if succ_member == member {
                // The run after the span already has the new state;
                // let the span flow into it.
                self.boundaries.delete(end);
                edges_changed = true;
            }
        } else if end_member != member {
            // Going back to the old state after the span.
            self.boundaries.set(end, end_member);
            edges_changed = true;
        }

        // Left edge.
        if pred == begin {
            if pred_member != member {
                // The run before the span already has the new state.
                self.boundaries.delete(begin);
                edges_changed = true;
            }
        } else if begin_member != member {
            self.boundaries.set(begin, member);
            edges_changed = true;
        }

        if dropped == 0 && !edges_changed {
            debug!(
                "{}..{} already {}; boundaries unchanged",
                span.start,
                span.end,
                if member { "present" } else { "absent" }
            );
        } else {
            trace!(
                "{}..{}: dropped {} inner boundaries, {} remain",
                span.start,
                span.end,
                dropped,
                self.boundaries.len()
            );
        }
        debug_assert!(
            self.boundaries.is_canonical(),
            "boundaries not canonical after painting {:?}: {:?}",
            span,
            self.boundaries
        );
    }
}

/// Iterator over the maximal runs of an [`AddressSet`].
///
/// Created by [`AddressSet::ranges`].
#[derive(Clone)]
pub struct Ranges<'a> {
    inner: btree_map::Iter<'a, Key, bool>,
}

// `Ranges` is always fused: once `HIGH` is reached, the
// underlying iterator is exhausted.
impl<'a> FusedIterator for Ranges<'a> {}

impl<'a> Iterator for Ranges<'a> {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&start, &start_member) = self.inner.next()?;
        if start == HIGH {
            return None;
        }
        // Boundaries come in pairs: one opening a run and one closing it.
        match self.inner.next() {
            Some((&end, &false)) if start_member && end != HIGH => {
                Some(start as u64..end as u64)
            }
            _ => panic!("unpaired boundary at {} in address set", start),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Every remaining run uses two boundaries, and `HIGH` is left over.
        let (_, upper) = self.inner.size_hint();
        (0, upper.map(|upper| upper / 2))
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = Range<u64>;
    type IntoIter = Ranges<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges()
    }
}

// We can't just derive this automatically, because that would
// expose the sentinels and other implementation details.
impl Debug for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ranges()).finish()
    }
}

/// Renders each run as an inclusive span of dotted-quad addresses,
/// e.g. `{10.0.0.0-11.255.255.255, 12.0.0.0-12.0.0.3}`.
impl Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, run) in self.ranges().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let first = Ipv4Addr::from(run.start as u32);
            let last = Ipv4Addr::from((run.end - 1) as u32);
            write!(f, "{}-{}", first, last)?;
        }
        f.write_str("}")
    }
}

impl FromIterator<AddressRange> for AddressSet {
    fn from_iter<T: IntoIterator<Item = AddressRange>>(iter: T) -> Self {
        let mut address_set = AddressSet::new();
        address_set.extend(iter);
        address_set
    }
}

impl Extend<AddressRange> for AddressSet {
    fn extend<T: IntoIterator<Item = AddressRange>>(&mut self, iter: T) {
        iter.into_iter().for_each(move |range| {
            self.add(range);
        })
    }
}

#[cfg(feature = "serde1")]
impl Serialize for AddressSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some((self.boundaries.len() - 2) / 2))?;
        for run in self.ranges() {
            seq.serialize_element(&(run.start, run.end))?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde1")]
impl<'de> Deserialize<'de> for AddressSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(AddressSetVisitor)
    }
}

#[cfg(feature = "serde1")]
struct AddressSetVisitor;

#[cfg(feature = "serde1")]
impl<'de> Visitor<'de> for AddressSetVisitor {
    type Value = AddressSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of [start, end) address pairs")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut address_set = AddressSet::new();
        while let Some((start, end)) = access.next_element::<(u64, u64)>()? {
            if start >= end || end > ADDRESS_SPACE_END {
                return Err(de::Error::custom(format!(
                    "invalid address run {}..{}",
                    start, end
                )));
            }
            address_set.paint(start..end, true);
        }
        Ok(address_set)
    }
}

#[cfg(feature = "quickcheck")]
impl quickcheck::Arbitrary for AddressSet {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        <Vec<AddressRange> as quickcheck::Arbitrary>::arbitrary(g)
            .into_iter()
            .collect()
    }
}
