// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::{join_u64, split_u64, RawLog};

/// Provenance fields of a persisted log. The block number is stored as a
/// `(high, low)` pair of signed integers; see [`crate::split_u64`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub block_number_high: i64,
    pub block_number_low: i64,
    pub block_hash: B256,
    pub index: i64,
    pub tx_hash: B256,
    pub tx_index: i64,
}

/// The document-store representation of a log, one document per log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDocument {
    pub raw: RawDocument,
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
    pub removed: bool,
}

impl LogDocument {
    /// The block number reconstructed from the split pair.
    pub fn block_number(&self) -> u64 {
        join_u64(self.raw.block_number_high, self.raw.block_number_low)
    }
}

impl From<&RawLog> for LogDocument {
    fn from(log: &RawLog) -> Self {
        let (block_number_high, block_number_low) = split_u64(log.block_number);
        LogDocument {
            raw: RawDocument {
                block_number_high,
                block_number_low,
                block_hash: log.block_hash,
                index: log.index as i64,
                tx_hash: log.tx_hash,
                tx_index: log.tx_index as i64,
            },
            address: log.address,
            topics: log.topics.clone(),
            data: log.data.to_vec(),
            removed: log.removed,
        }
    }
}

impl From<&LogDocument> for RawLog {
    fn from(doc: &LogDocument) -> Self {
        RawLog {
            block_number: doc.block_number(),
            block_hash: doc.raw.block_hash,
            tx_hash: doc.raw.tx_hash,
            index: doc.raw.index as u32,
            tx_index: doc.raw.tx_index as u32,
            address: doc.address,
            topics: doc.topics.clone(),
            data: doc.data.clone().into(),
            removed: doc.removed,
        }
    }
}
