// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    contracts::IGovernor,
    dbtypes::{codec, tables::governor_proposals, tables::governor_votes, GovernorProposal,
        GovernorVote},
    schema::{DecoderFn, EventSchema, ScanError},
    scanner::{LogScanner, Mutation},
};
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, U256};
use anyhow::Context;
use diesel::prelude::*;
use evlog_types::RawLog;

pub enum GovernorEvent {
    ProposalCreated(IGovernor::ProposalCreated),
    ProposalCanceled(IGovernor::ProposalCanceled),
    ProposalExecuted(IGovernor::ProposalExecuted),
    VoteCast(IGovernor::VoteCast),
}

pub struct GovernorScanner {
    address: Address,
    schema: EventSchema<GovernorEvent>,
}

impl GovernorScanner {
    pub fn new(address: Address) -> Result<Self, ScanError> {
        let schema = EventSchema::new([
            (
                IGovernor::ProposalCreated::SIGNATURE_HASH,
                (|data| {
                    IGovernor::ProposalCreated::decode_log_data(data)
                        .map(GovernorEvent::ProposalCreated)
                }) as DecoderFn<GovernorEvent>,
            ),
            (
                IGovernor::ProposalCanceled::SIGNATURE_HASH,
                (|data| {
                    IGovernor::ProposalCanceled::decode_log_data(data)
                        .map(GovernorEvent::ProposalCanceled)
                }) as DecoderFn<GovernorEvent>,
            ),
            (
                IGovernor::ProposalExecuted::SIGNATURE_HASH,
                (|data| {
                    IGovernor::ProposalExecuted::decode_log_data(data)
                        .map(GovernorEvent::ProposalExecuted)
                }) as DecoderFn<GovernorEvent>,
            ),
            (
                IGovernor::VoteCast::SIGNATURE_HASH,
                (|data| IGovernor::VoteCast::decode_log_data(data).map(GovernorEvent::VoteCast))
                    as DecoderFn<GovernorEvent>,
            ),
        ])?;
        Ok(Self { address, schema })
    }
}

impl LogScanner for GovernorScanner {
    fn name(&self) -> &'static str {
        "GovernorScanner"
    }

    fn address(&self) -> Address {
        self.address
    }

    fn decode(&self, log: &RawLog) -> Result<Mutation, ScanError> {
        match self.schema.decode(log)? {
            GovernorEvent::ProposalCreated(event) => Ok(created_mutation(event, log)),
            GovernorEvent::ProposalCanceled(event) => {
                Ok(deactivate_mutation(event.proposalId, "proposal canceled"))
            }
            GovernorEvent::ProposalExecuted(event) => {
                Ok(deactivate_mutation(event.proposalId, "proposal executed"))
            }
            GovernorEvent::VoteCast(event) => Ok(vote_mutation(event, log)),
        }
    }
}

fn created_mutation(event: IGovernor::ProposalCreated, log: &RawLog) -> Mutation {
    let tx_hash = log.tx_hash.to_vec();
    let block = log.block_number as i64;
    Box::new(move |conn| {
        let record = GovernorProposal {
            tx_hash,
            block,
            active: true,
            proposal_id: codec::u256_to_bytes(&event.proposalId),
            proposer: event.proposer.to_vec(),
            targets: codec::encode_address_list(&event.targets),
            values: codec::encode_u256_list(&event.values),
            signatures: codec::encode_string_list(&event.signatures),
            calldatas: codec::encode_bytes_list(&event.calldatas),
            vote_start: i64::try_from(event.voteStart).context("vote start exceeds i64")?,
            vote_end: i64::try_from(event.voteEnd).context("vote end exceeds i64")?,
            description: event.description.clone(),
        };
        diesel::insert_into(governor_proposals::table)
            .values(&record)
            .execute(conn)
            .context("proposal created")?;
        Ok(())
    })
}

// Canceled and Executed both leave the proposal inactive; the update is
// idempotent and keyed by proposal id, not by the triggering transaction.
fn deactivate_mutation(proposal_id: U256, label: &'static str) -> Mutation {
    let id = codec::u256_to_bytes(&proposal_id);
    Box::new(move |conn| {
        diesel::update(governor_proposals::table.filter(governor_proposals::proposal_id.eq(id)))
            .set(governor_proposals::active.eq(false))
            .execute(conn)
            .context(label)?;
        Ok(())
    })
}

fn vote_mutation(event: IGovernor::VoteCast, log: &RawLog) -> Mutation {
    let record = GovernorVote {
        tx_hash: log.tx_hash.to_vec(),
        block: log.block_number as i64,
        voter: event.voter.to_vec(),
        proposal_id: codec::u256_to_bytes(&event.proposalId),
        support: event.support as i16,
        weight: codec::u256_to_bytes(&event.weight),
        reason: event.reason.clone(),
    };
    Box::new(move |conn| {
        diesel::insert_into(governor_votes::table)
            .values(&record)
            .execute(conn)
            .context("vote cast")?;
        Ok(())
    })
}
