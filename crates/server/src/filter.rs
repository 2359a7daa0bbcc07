// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use std::collections::HashSet;

/// The mutable address filter driving the scan loop.
///
/// Readers take a per-block snapshot of the flat list under a shared lock;
/// Add/Remove mutate under an exclusive lock. The set holds no duplicates.
#[derive(Debug, Default)]
pub struct FilterState {
    set: HashSet<Address>,
    list: Vec<Address>,
    from_block: u64,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a fresh address set, deduplicating the input.
    pub fn replace(&mut self, addresses: Vec<Address>, from_block: u64) {
        self.set = addresses.into_iter().collect();
        self.from_block = from_block;
        self.rebuild();
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.set.contains(address)
    }

    /// Returns false when the address is already tracked.
    pub fn add(&mut self, address: Address) -> bool {
        if !self.set.insert(address) {
            return false;
        }
        self.rebuild();
        true
    }

    /// Returns false when the address is not tracked. The address is gone
    /// afterwards; historical documents are retained by the store.
    pub fn remove(&mut self, address: &Address) -> bool {
        if !self.set.remove(address) {
            return false;
        }
        self.rebuild();
        true
    }

    /// Snapshot of the active addresses.
    pub fn addresses(&self) -> Vec<Address> {
        self.list.clone()
    }

    pub fn from_block(&self) -> u64 {
        self.from_block
    }

    fn rebuild(&mut self) {
        self.list = self.set.iter().copied().collect();
    }
}
