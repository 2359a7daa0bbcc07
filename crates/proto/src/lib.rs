// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Generated protobuf/gRPC code for the Logger and Admin services, plus the
//! conversions between the wire `Log` and the canonical [`RawLog`].

use alloy_primitives::{Address, B256};
use evlog_types::RawLog;

pub mod logger {
    tonic::include_proto!("logger");
}

pub use logger::{
    admin_client, admin_server, logger_client, logger_server, AddressReqMessage,
    BlockNumberMessage, ConnectReqMessage, Empty, InfoResMessage, Log,
};

/// Encodes a log into its wire form.
pub fn log_to_wire(log: &RawLog) -> Log {
    Log {
        raw: Some(logger::log::Raw {
            block_number: log.block_number,
            block_hash: log.block_hash.to_vec(),
            index: log.index,
            tx_hash: log.tx_hash.to_vec(),
            tx_index: log.tx_index,
        }),
        address: log.address.to_vec(),
        topics: log.topics.iter().map(|t| t.to_vec()).collect(),
        data: log.data.to_vec(),
        removed: log.removed,
    }
}

/// Decodes a wire log back into the canonical form. Fields of unexpected
/// width fall back to zero values, mirroring the tolerant decode on the
/// document path.
pub fn log_from_wire(log: &Log) -> RawLog {
    let raw = log.raw.clone().unwrap_or_default();
    RawLog {
        block_number: raw.block_number,
        block_hash: b256_from_slice(&raw.block_hash),
        tx_hash: b256_from_slice(&raw.tx_hash),
        index: raw.index,
        tx_index: raw.tx_index,
        address: address_from_slice(&log.address),
        topics: log.topics.iter().map(|t| b256_from_slice(t)).collect(),
        data: log.data.clone().into(),
        removed: log.removed,
    }
}

fn b256_from_slice(bytes: &[u8]) -> B256 {
    B256::try_from(bytes).unwrap_or_default()
}

fn address_from_slice(bytes: &[u8]) -> Address {
    Address::try_from(bytes).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    #[test]
    fn wire_round_trip_is_identity() {
        let log = RawLog {
            block_number: u64::MAX,
            block_hash: b256!("00000000000000000000000000000000000000000000000000000000000000aa"),
            tx_hash: b256!("00000000000000000000000000000000000000000000000000000000000000bb"),
            index: 7,
            tx_index: 2,
            address: address!("00000000000000000000000000000000000000cc"),
            topics: vec![b256!(
                "1111111111111111111111111111111111111111111111111111111111111111"
            )],
            data: vec![0xde, 0xad].into(),
            removed: true,
        };
        assert_eq!(log_from_wire(&log_to_wire(&log)), log);
    }

    #[test]
    fn missing_raw_section_decodes_to_defaults() {
        let wire = Log {
            raw: None,
            address: vec![0u8; 20],
            topics: vec![],
            data: vec![],
            removed: false,
        };
        let log = log_from_wire(&wire);
        assert_eq!(log.block_number, 0);
        assert_eq!(log.topics.len(), 0);
    }
}
