/*!
[`AddressSet`] is a set of IPv4 addresses, built from and carved into by
CIDR blocks ([`AddressRange`]s) such as `10.0.0.0/8` or `192.168.1.7`.

It is meant for allow and deny lists, access-control lists and similar
network policy, where the set of covered addresses changes a little
at a time and is queried a lot.


# How it works

The set is stored as a sorted map of _boundary points_: the addresses
where membership switches on or off. `10.0.0.0/8 ∪ 12.0.0.0/30` is just
four boundaries, no matter how many addresses it covers:

```text
10.0.0.0 -> in
11.0.0.0 -> out
12.0.0.0 -> in
12.0.0.4 -> out
```

Adding or removing a block deletes the boundaries inside it and fixes up
at most one boundary at each edge, so both are logarithmic in the number
of boundaries (plus the number deleted). Checking membership is a single
"largest boundary at or below this address" lookup.

Adjacent and overlapping blocks are always coalesced, so the boundary
map is the smallest possible description of the set, and two sets
holding the same addresses compare equal however they were built.

Blocks are half-open intervals of the address space, with addresses as
integers. The block that includes `255.255.255.255` ends at `2^32`, which
is why [`AddressRange::end`] and the runs yielded by
[`AddressSet::ranges`] are `u64`s.


# Example

```rust
use std::net::Ipv4Addr;
use iprangeset::{AddressRange, AddressSet};

let mut allowed = AddressSet::new();
allowed.add_str("10.0.0.0/8")?;
allowed.add_str("11.0.0.0/8")?;
allowed.remove("11.0.0.0/29".parse::<AddressRange>()?);

assert!(allowed.contains(Ipv4Addr::new(11, 0, 0, 8)));
assert!(!allowed.contains(Ipv4Addr::new(11, 0, 0, 7)));
assert_eq!(
    allowed.to_string(),
    "{10.0.0.0-10.255.255.255, 11.0.0.8-11.255.255.255}"
);

// Host bits beyond the prefix are an error, not silently dropped.
assert!(allowed.add_str("11.0.0.1/24").is_err());
# Ok::<(), iprangeset::AddressRangeError>(())
```


## Crate features

By default this crate depends only on `log` and `thiserror`.
It never installs a logger; mutations are logged at `trace` level.

If you enable the **serde1** feature it will introduce a dependency on
the _serde_ crate and provide `Serialize` and `Deserialize`
implementations for [`AddressRange`] (as a `"A.B.C.D/P"` string) and
[`AddressSet`] (as a sequence of `[start, end]` runs).

You can similarly enable support for _quickcheck_ by enabling
the **quickcheck** feature.

*/

mod boundary;
mod error;
pub mod range;
pub mod set;

#[cfg(test)]
mod stupid_address_set;

pub use error::AddressRangeError;
pub use range::AddressRange;
pub use set::{AddressSet, Ranges};
