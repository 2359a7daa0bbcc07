// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    contracts::IERC1155,
    dbtypes::{codec, tables::erc1155_transfers, Erc1155Transfer},
    schema::{DecoderFn, EventSchema, ScanError},
    scanner::{LogScanner, Mutation},
};
use alloy::sol_types::SolEvent;
use alloy_primitives::Address;
use anyhow::Context;
use diesel::prelude::*;
use evlog_types::RawLog;

pub enum Erc1155Event {
    TransferSingle(IERC1155::TransferSingle),
    TransferBatch(IERC1155::TransferBatch),
}

pub struct Erc1155Scanner {
    address: Address,
    schema: EventSchema<Erc1155Event>,
}

impl Erc1155Scanner {
    pub fn new(address: Address) -> Result<Self, ScanError> {
        let schema = EventSchema::new([
            (
                IERC1155::TransferSingle::SIGNATURE_HASH,
                (|data| {
                    IERC1155::TransferSingle::decode_log_data(data)
                        .map(Erc1155Event::TransferSingle)
                }) as DecoderFn<Erc1155Event>,
            ),
            (
                IERC1155::TransferBatch::SIGNATURE_HASH,
                (|data| {
                    IERC1155::TransferBatch::decode_log_data(data).map(Erc1155Event::TransferBatch)
                }) as DecoderFn<Erc1155Event>,
            ),
        ])?;
        Ok(Self { address, schema })
    }
}

impl LogScanner for Erc1155Scanner {
    fn name(&self) -> &'static str {
        "ERC1155Scanner"
    }

    fn address(&self) -> Address {
        self.address
    }

    fn decode(&self, log: &RawLog) -> Result<Mutation, ScanError> {
        match self.schema.decode(log)? {
            Erc1155Event::TransferSingle(event) => Ok(single_mutation(event, log)),
            Erc1155Event::TransferBatch(event) => Ok(batch_mutation(event, log)),
        }
    }
}

fn single_mutation(event: IERC1155::TransferSingle, log: &RawLog) -> Mutation {
    let record = Erc1155Transfer {
        tx_hash: log.tx_hash.to_vec(),
        index: 0,
        block: log.block_number as i64,
        operator: event.operator.to_vec(),
        from: event.from.to_vec(),
        to: event.to.to_vec(),
        id: codec::u256_to_bytes(&event.id),
        value: codec::u256_to_bytes(&event.value),
    };
    Box::new(move |conn| {
        diesel::insert_into(erc1155_transfers::table)
            .values(&record)
            .execute(conn)
            .context("erc1155 transfer single")?;
        Ok(())
    })
}

// A batch transfer of N ids expands to one row per index.
fn batch_mutation(event: IERC1155::TransferBatch, log: &RawLog) -> Mutation {
    let records: Vec<Erc1155Transfer> = event
        .ids
        .iter()
        .zip(event.values.iter())
        .enumerate()
        .map(|(index, (id, value))| Erc1155Transfer {
            tx_hash: log.tx_hash.to_vec(),
            index: index as i32,
            block: log.block_number as i64,
            operator: event.operator.to_vec(),
            from: event.from.to_vec(),
            to: event.to.to_vec(),
            id: codec::u256_to_bytes(id),
            value: codec::u256_to_bytes(value),
        })
        .collect();
    Box::new(move |conn| {
        for record in &records {
            diesel::insert_into(erc1155_transfers::table)
                .values(record)
                .execute(conn)
                .context("erc1155 transfer batch")?;
        }
        Ok(())
    })
}
