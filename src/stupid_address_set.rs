use std::collections::BTreeSet;
use std::ops::Range;

use super::{AddressRange, AddressSet};

// A simple but infeasibly slow and memory-hungry
// version of `AddressSet` for testing.
//
// Stores every member address on its own, so it is
// only usable with small blocks (a /16 at most).
#[derive(Eq, PartialEq, Debug)]
pub struct StupidAddressSet {
    addresses: BTreeSet<u32>,
}

impl StupidAddressSet {
    pub fn new() -> StupidAddressSet {
        StupidAddressSet {
            addresses: BTreeSet::new(),
        }
    }

    pub fn add(&mut self, range: AddressRange) {
        self.add_run(range.as_range());
    }

    pub fn remove(&mut self, range: AddressRange) {
        assert!(range.prefix_len() >= 16, "{} is too big to remove", range);
        for address in range.as_range() {
            self.addresses.remove(&(address as u32));
        }
    }

    pub fn contains(&self, address: u32) -> bool {
        self.addresses.contains(&address)
    }

    // Coalesce consecutive addresses into half-open runs.
    pub fn to_ranges(&self) -> Vec<Range<u64>> {
        let mut runs: Vec<Range<u64>> = Vec::new();
        for &address in &self.addresses {
            let address = u64::from(address);
            match runs.last_mut() {
                Some(run) if run.end == address => run.end += 1,
                _ => runs.push(address..address + 1),
            }
        }
        runs
    }

    fn add_run(&mut self, run: Range<u64>) {
        assert!(run.end - run.start <= 1 << 16, "{:?} is too big to add", run);
        for address in run {
            self.addresses.insert(address as u32);
        }
    }
}

impl From<&AddressSet> for StupidAddressSet {
    fn from(address_set: &AddressSet) -> Self {
        let mut stupid = Self::new();
        for run in address_set.ranges() {
            stupid.add_run(run);
        }
        stupid
    }
}
