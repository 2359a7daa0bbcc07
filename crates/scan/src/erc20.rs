// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    contracts::IERC20,
    dbtypes::{codec, tables::erc20_transfers, Erc20Transfer},
    schema::{DecoderFn, EventSchema, ScanError},
    scanner::{LogScanner, Mutation},
};
use alloy::sol_types::SolEvent;
use alloy_primitives::Address;
use anyhow::Context;
use diesel::prelude::*;
use evlog_types::RawLog;

pub enum Erc20Event {
    Transfer(IERC20::Transfer),
}

pub struct Erc20Scanner {
    address: Address,
    schema: EventSchema<Erc20Event>,
}

impl Erc20Scanner {
    pub fn new(address: Address) -> Result<Self, ScanError> {
        let schema = EventSchema::new([(
            IERC20::Transfer::SIGNATURE_HASH,
            (|data| IERC20::Transfer::decode_log_data(data).map(Erc20Event::Transfer))
                as DecoderFn<Erc20Event>,
        )])?;
        Ok(Self { address, schema })
    }
}

impl LogScanner for Erc20Scanner {
    fn name(&self) -> &'static str {
        "ERC20Scanner"
    }

    fn address(&self) -> Address {
        self.address
    }

    fn decode(&self, log: &RawLog) -> Result<Mutation, ScanError> {
        match self.schema.decode(log)? {
            Erc20Event::Transfer(event) => Ok(transfer_mutation(event, log)),
        }
    }
}

fn transfer_mutation(event: IERC20::Transfer, log: &RawLog) -> Mutation {
    let record = Erc20Transfer {
        tx_hash: log.tx_hash.to_vec(),
        block: log.block_number as i64,
        from: event.from.to_vec(),
        to: event.to.to_vec(),
        value: codec::u256_to_bytes(&event.value),
    };
    Box::new(move |conn| {
        diesel::insert_into(erc20_transfers::table)
            .values(&record)
            .execute(conn)
            .context("erc20 transfer")?;
        Ok(())
    })
}
