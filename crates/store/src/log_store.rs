// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use evlog_types::{split_u64, LogDocument};
use once_cell::sync::Lazy;
use sled::{Batch, Db, Tree};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage: {0}")]
    Storage(#[from] sled::Error),
    #[error("document codec: {0}")]
    Codec(#[from] Box<bincode::ErrorKind>),
}

// One sled handle per path per process; sled refuses concurrent opens of
// the same file.
static DB_CACHE: Lazy<Arc<Mutex<HashMap<PathBuf, Db>>>> =
    Lazy::new(|| Arc::new(Mutex::new(HashMap::new())));

fn get_or_open_db(path: &Path) -> Result<Db, StoreError> {
    let mut cache = DB_CACHE.lock().unwrap();
    if let Some(db) = cache.get(path) {
        return Ok(db.clone());
    }
    let db = sled::open(path)?;
    if !db.was_recovered() {
        info!(path = %path.display(), "created log database");
    } else {
        info!(path = %path.display(), "recovered log database");
    }
    cache.insert(path.to_path_buf(), db.clone());
    Ok(db)
}

/// Persisted collection of log documents.
pub struct LogStore {
    /// Key: `[block_high BE | block_low BE | index BE]`.
    logs: Tree,
    /// Key: `[address | block_high BE | block_low BE | index BE]`.
    by_address: Tree,
}

const ADDR_LEN: usize = 20;

fn block_key(doc: &LogDocument) -> [u8; 20] {
    let mut key = [0u8; 20];
    key[..8].copy_from_slice(&doc.raw.block_number_high.to_be_bytes());
    key[8..16].copy_from_slice(&doc.raw.block_number_low.to_be_bytes());
    key[16..].copy_from_slice(&(doc.raw.index as u32).to_be_bytes());
    key
}

fn address_key(doc: &LogDocument) -> [u8; 40] {
    let mut key = [0u8; 40];
    key[..ADDR_LEN].copy_from_slice(doc.address.as_slice());
    key[ADDR_LEN..].copy_from_slice(&block_key(doc));
    key
}

fn address_from_key(address: &Address, from_block: u64) -> [u8; 40] {
    let (high, low) = split_u64(from_block);
    let mut key = [0u8; 40];
    key[..ADDR_LEN].copy_from_slice(address.as_slice());
    key[ADDR_LEN..28].copy_from_slice(&high.to_be_bytes());
    key[28..36].copy_from_slice(&low.to_be_bytes());
    key
}

impl LogStore {
    /// Opens (or creates) the store rooted at `uri`, namespaced by
    /// `database`, with one logical collection per `collection` name.
    pub fn open(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let db = get_or_open_db(&Path::new(uri).join(database))?;
        let logs = db.open_tree(collection)?;
        let by_address = db.open_tree(format!("{collection}.addr"))?;
        Ok(Self { logs, by_address })
    }

    /// Appends a batch of documents. The scan loop guarantees no block is
    /// persisted twice under normal operation, so no idempotency check is
    /// made here.
    pub fn insert_many(&self, documents: &[LogDocument]) -> Result<(), StoreError> {
        let mut logs = Batch::default();
        let mut by_address = Batch::default();
        for doc in documents {
            let value = bincode::serialize(doc)?;
            logs.insert(&block_key(doc)[..], value.clone());
            by_address.insert(&address_key(doc)[..], value);
        }
        self.logs.apply_batch(logs)?;
        self.by_address.apply_batch(by_address)?;
        Ok(())
    }

    /// Returns the documents for `address` with block number `>= from_block`,
    /// ordered by block then log index. Empty when nothing matches.
    pub fn find_from(
        &self,
        address: &Address,
        from_block: u64,
    ) -> Result<Vec<LogDocument>, StoreError> {
        let start = address_from_key(address, from_block);
        let mut found = Vec::new();
        for entry in self.by_address.range(&start[..]..) {
            let (key, value) = entry?;
            if !key.starts_with(address.as_slice()) {
                break;
            }
            found.push(bincode::deserialize(&value)?);
        }
        Ok(found)
    }

    /// The highest block number across all documents, reconstructed from the
    /// stored split pair; 0 when the store is empty.
    pub fn max_block(&self) -> Result<u64, StoreError> {
        match self.logs.last()? {
            Some((_, value)) => {
                let doc: LogDocument = bincode::deserialize(&value)?;
                Ok(doc.block_number())
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use evlog_types::RawLog;
    use tempfile::tempdir;

    fn doc(address: Address, block: u64, index: u32) -> LogDocument {
        LogDocument::from(&RawLog {
            block_number: block,
            index,
            address,
            ..Default::default()
        })
    }

    #[test]
    fn find_from_orders_by_block_then_index() -> Result<(), StoreError> {
        let dir = tempdir().unwrap();
        let store = LogStore::open(dir.path().to_str().unwrap(), "test", "logs")?;
        let a = address!("00000000000000000000000000000000000000aa");
        let b = address!("00000000000000000000000000000000000000bb");

        store.insert_many(&[
            doc(a, 3, 0),
            doc(a, 1, 1),
            doc(a, 1, 0),
            doc(b, 2, 0),
            doc(a, 2, 5),
        ])?;

        let found = store.find_from(&a, 0)?;
        let got: Vec<(u64, i64)> = found
            .iter()
            .map(|d| (d.block_number(), d.raw.index))
            .collect();
        assert_eq!(got, vec![(1, 0), (1, 1), (2, 5), (3, 0)]);
        Ok(())
    }

    #[test]
    fn find_from_compares_the_reconstructed_block_number() -> Result<(), StoreError> {
        let dir = tempdir().unwrap();
        let store = LogStore::open(dir.path().to_str().unwrap(), "test", "logs")?;
        let a = address!("00000000000000000000000000000000000000aa");

        // Straddle the high/low boundary: a plain per-half comparison would
        // drop the (1 << 32) entry when filtering from (1 << 32) - 1.
        let low = (1u64 << 32) - 1;
        let high = 1u64 << 32;
        store.insert_many(&[doc(a, low, 0), doc(a, high, 0), doc(a, high + 3, 0)])?;

        let found = store.find_from(&a, high)?;
        let got: Vec<u64> = found.iter().map(|d| d.block_number()).collect();
        assert_eq!(got, vec![high, high + 3]);

        let found = store.find_from(&a, low)?;
        assert_eq!(found.len(), 3);
        Ok(())
    }

    #[test]
    fn find_from_unknown_address_is_empty() -> Result<(), StoreError> {
        let dir = tempdir().unwrap();
        let store = LogStore::open(dir.path().to_str().unwrap(), "test", "logs")?;
        store.insert_many(&[doc(
            address!("00000000000000000000000000000000000000aa"),
            1,
            0,
        )])?;
        let found = store.find_from(&address!("00000000000000000000000000000000000000bb"), 0)?;
        assert!(found.is_empty());
        Ok(())
    }

    #[test]
    fn max_block_is_zero_when_empty_and_lossless_otherwise() -> Result<(), StoreError> {
        let dir = tempdir().unwrap();
        let store = LogStore::open(dir.path().to_str().unwrap(), "test", "logs")?;
        assert_eq!(store.max_block()?, 0);

        let a = address!("00000000000000000000000000000000000000aa");
        store.insert_many(&[doc(a, 7, 0), doc(a, u64::MAX, 0), doc(a, 9, 0)])?;
        assert_eq!(store.max_block()?, u64::MAX);
        Ok(())
    }
}
