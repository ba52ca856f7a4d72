#![no_main]
use libfuzzer_sys::fuzz_target;

use arbitrary::Arbitrary;
use iprangeset::{AddressRange, AddressSet};
use std::net::Ipv4Addr;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Add(u32, u8),
    Remove(u32, u8),
}

impl Op {
    fn apply(self, set: &mut AddressSet) {
        match self {
            Op::Add(bits, prefix_len) => set.add(range(bits, prefix_len)),
            Op::Remove(bits, prefix_len) => set.remove(range(bits, prefix_len)),
        }
    }
}

fn range(bits: u32, prefix_len: u8) -> AddressRange {
    AddressRange::enclosing(Ipv4Addr::from(bits), prefix_len % 33).unwrap()
}

fuzz_target!(|ops: Vec<Op>| {
    let mut set = AddressSet::new();

    for op in ops {
        op.apply(&mut set);
    }

    let mut peek = set.ranges().peekable();
    while let Some(run) = peek.next() {
        // Runs must be non-empty and never touch or overlap.
        assert!(run.start < run.end);
        if let Some(next) = peek.peek() {
            assert!(run.end < next.start, "runs {:?} and {:?} touch", run, next);
        }

        // Membership must flip exactly at the edges of each run.
        let first = run.start as u32;
        let last = (run.end - 1) as u32;
        assert!(set.contains(first));
        assert!(set.contains(last));
        if first > 0 {
            assert!(!set.contains(first - 1));
        }
        if last < u32::MAX {
            assert!(!set.contains(last + 1));
        }
    }
});
