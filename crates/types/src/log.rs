// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// A single event log emitted by a contract, identified by
/// `(tx_hash, index)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    pub block_number: u64,
    pub block_hash: B256,
    pub tx_hash: B256,
    /// Index of the log within its block.
    pub index: u32,
    /// Index of the emitting transaction within its block.
    pub tx_index: u32,
    pub address: Address,
    /// `topics[0]` is the event signature hash; at most four entries.
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub removed: bool,
}

impl RawLog {
    /// The event signature hash, when the log is not anonymous.
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }
}
