// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::tables::{
    erc1155_transfers, erc20_transfers, faucet_claims, governor_proposals, governor_votes,
};
use diesel::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Insertable, Queryable)]
#[diesel(table_name = erc20_transfers)]
pub struct Erc20Transfer {
    pub tx_hash: Vec<u8>,
    pub block: i64,
    #[diesel(column_name = sender)]
    pub from: Vec<u8>,
    #[diesel(column_name = recipient)]
    pub to: Vec<u8>,
    /// Big-endian bytes of the transferred amount.
    pub value: Vec<u8>,
}

/// One row per transferred id; a batch transfer of N ids expands to rows
/// with `index = 0..N-1` under the same transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, Queryable)]
#[diesel(table_name = erc1155_transfers)]
pub struct Erc1155Transfer {
    pub tx_hash: Vec<u8>,
    #[diesel(column_name = idx)]
    pub index: i32,
    pub block: i64,
    pub operator: Vec<u8>,
    #[diesel(column_name = sender)]
    pub from: Vec<u8>,
    #[diesel(column_name = recipient)]
    pub to: Vec<u8>,
    #[diesel(column_name = token_id)]
    pub id: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable, Queryable)]
#[diesel(table_name = faucet_claims)]
pub struct FaucetClaim {
    pub tx_hash: Vec<u8>,
    pub block: i64,
    pub account: Vec<u8>,
}

/// `active` is the sole mutable field: lifecycle events flip it to false,
/// keyed by `proposal_id`.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, Queryable)]
#[diesel(table_name = governor_proposals)]
pub struct GovernorProposal {
    pub tx_hash: Vec<u8>,
    pub block: i64,
    pub active: bool,
    pub proposal_id: Vec<u8>,
    pub proposer: Vec<u8>,
    /// Length-prefixed address list.
    pub targets: Vec<u8>,
    /// Length-prefixed big-integer list.
    #[diesel(column_name = action_values)]
    pub values: Vec<u8>,
    /// Length-prefixed string list.
    pub signatures: Vec<u8>,
    /// Length-prefixed bytes list.
    pub calldatas: Vec<u8>,
    pub vote_start: i64,
    pub vote_end: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable, Queryable)]
#[diesel(table_name = governor_votes)]
pub struct GovernorVote {
    pub tx_hash: Vec<u8>,
    pub block: i64,
    pub voter: Vec<u8>,
    pub proposal_id: Vec<u8>,
    pub support: i16,
    pub weight: Vec<u8>,
    pub reason: String,
}
