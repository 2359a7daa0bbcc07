// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{LogData, B256};
use evlog_types::RawLog;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Anonymous events are not supported.
    #[error("no event signature")]
    NoEventSignature,
    /// A schema table mapped the zero topic-0.
    #[error("invalid eventID exists")]
    InvalidEventId,
    /// The log's topic-0 is not part of this contract's schema.
    #[error("non-targeted event {0}")]
    NonTargetedEvent(B256),
    #[error("abi decode: {0}")]
    Abi(#[from] alloy::sol_types::Error),
}

pub type DecoderFn<E> = fn(&LogData) -> Result<E, alloy::sol_types::Error>;

/// Immutable topic-0 -> decoder table for one contract. Dispatch is a map
/// lookup into a decoder returning the contract's tagged event variant.
pub struct EventSchema<E> {
    decoders: HashMap<B256, DecoderFn<E>>,
}

impl<E> EventSchema<E> {
    /// Fails with [`ScanError::InvalidEventId`] when an entry maps the zero
    /// topic-0, which indicates a schema-table initialization bug.
    pub fn new(entries: impl IntoIterator<Item = (B256, DecoderFn<E>)>) -> Result<Self, ScanError> {
        let decoders: HashMap<B256, DecoderFn<E>> = entries.into_iter().collect();
        if decoders.contains_key(&B256::ZERO) {
            return Err(ScanError::InvalidEventId);
        }
        Ok(Self { decoders })
    }

    /// Resolves the log's topic-0 and decodes indexed fields from the
    /// remaining topics and non-indexed fields from the data section.
    pub fn decode(&self, log: &RawLog) -> Result<E, ScanError> {
        let topic0 = log.topic0().ok_or(ScanError::NoEventSignature)?;
        let decoder = self
            .decoders
            .get(topic0)
            .ok_or(ScanError::NonTargetedEvent(*topic0))?;
        let data = LogData::new_unchecked(log.topics.clone(), log.data.clone());
        Ok(decoder(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::IERC20;
    use alloy::sol_types::SolEvent;

    fn transfer_decoder(data: &LogData) -> Result<IERC20::Transfer, alloy::sol_types::Error> {
        IERC20::Transfer::decode_log_data(data)
    }

    #[test]
    fn rejects_a_zero_event_id() {
        let err = EventSchema::new([(
            B256::ZERO,
            transfer_decoder as DecoderFn<IERC20::Transfer>,
        )])
        .err()
        .unwrap();
        assert!(matches!(err, ScanError::InvalidEventId));
    }

    #[test]
    fn empty_topics_is_no_event_signature() {
        let schema = EventSchema::new([(
            IERC20::Transfer::SIGNATURE_HASH,
            transfer_decoder as DecoderFn<IERC20::Transfer>,
        )])
        .unwrap();
        let err = schema.decode(&RawLog::default()).err().unwrap();
        assert!(matches!(err, ScanError::NoEventSignature));
    }
}
