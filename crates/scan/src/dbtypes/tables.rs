// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

diesel::table! {
    erc20_transfers (tx_hash) {
        tx_hash -> Binary,
        block -> BigInt,
        sender -> Binary,
        recipient -> Binary,
        value -> Binary,
    }
}

diesel::table! {
    erc1155_transfers (tx_hash, idx) {
        tx_hash -> Binary,
        idx -> Integer,
        block -> BigInt,
        operator -> Binary,
        sender -> Binary,
        recipient -> Binary,
        token_id -> Binary,
        value -> Binary,
    }
}

diesel::table! {
    faucet_claims (tx_hash) {
        tx_hash -> Binary,
        block -> BigInt,
        account -> Binary,
    }
}

diesel::table! {
    governor_proposals (tx_hash) {
        tx_hash -> Binary,
        block -> BigInt,
        active -> Bool,
        proposal_id -> Binary,
        proposer -> Binary,
        targets -> Binary,
        action_values -> Binary,
        signatures -> Binary,
        calldatas -> Binary,
        vote_start -> BigInt,
        vote_end -> BigInt,
        description -> Text,
    }
}

diesel::table! {
    governor_votes (tx_hash) {
        tx_hash -> Binary,
        block -> BigInt,
        voter -> Binary,
        proposal_id -> Binary,
        support -> SmallInt,
        weight -> Binary,
        reason -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(governor_proposals, governor_votes);
