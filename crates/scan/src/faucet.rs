// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    contracts::IFaucet,
    dbtypes::{tables::faucet_claims, FaucetClaim},
    schema::{DecoderFn, EventSchema, ScanError},
    scanner::{LogScanner, Mutation},
};
use alloy::sol_types::SolEvent;
use alloy_primitives::Address;
use anyhow::Context;
use diesel::prelude::*;
use evlog_types::RawLog;

pub enum FaucetEvent {
    Claimed(IFaucet::Claimed),
}

pub struct FaucetScanner {
    address: Address,
    schema: EventSchema<FaucetEvent>,
}

impl FaucetScanner {
    pub fn new(address: Address) -> Result<Self, ScanError> {
        let schema = EventSchema::new([(
            IFaucet::Claimed::SIGNATURE_HASH,
            (|data| IFaucet::Claimed::decode_log_data(data).map(FaucetEvent::Claimed))
                as DecoderFn<FaucetEvent>,
        )])?;
        Ok(Self { address, schema })
    }
}

impl LogScanner for FaucetScanner {
    fn name(&self) -> &'static str {
        "FaucetScanner"
    }

    fn address(&self) -> Address {
        self.address
    }

    fn decode(&self, log: &RawLog) -> Result<Mutation, ScanError> {
        match self.schema.decode(log)? {
            FaucetEvent::Claimed(event) => Ok(claimed_mutation(event, log)),
        }
    }
}

fn claimed_mutation(event: IFaucet::Claimed, log: &RawLog) -> Mutation {
    let record = FaucetClaim {
        tx_hash: log.tx_hash.to_vec(),
        block: log.block_number as i64,
        account: event.account.to_vec(),
    };
    Box::new(move |conn| {
        diesel::insert_into(faucet_claims::table)
            .values(&record)
            .execute(conn)
            .context("faucet claimed")?;
        Ok(())
    })
}
