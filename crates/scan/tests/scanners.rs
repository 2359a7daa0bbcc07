// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::sol_types::SolEvent;
use alloy_primitives::{address, b256, Address, B256, U256};
use diesel::prelude::*;
use evlog_scan::contracts::{IERC1155, IERC20, IFaucet, IGovernor};
use evlog_scan::dbtypes::codec;
use evlog_scan::dbtypes::tables::{
    erc1155_transfers, erc20_transfers, faucet_claims, governor_proposals, governor_votes,
};
use evlog_scan::dbtypes::{
    Erc1155Transfer, Erc20Transfer, FaucetClaim, GovernorProposal, GovernorVote,
};
use evlog_scan::{
    run_migrations, Erc1155Scanner, Erc20Scanner, FaucetScanner, GovernorScanner, LogScanner,
    ScanError,
};
use evlog_types::RawLog;

const CONTRACT: Address = address!("00000000000000000000000000000000000000cc");
const TX: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000dd");

fn test_conn() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    run_migrations(&mut conn).unwrap();
    conn
}

fn log_for<E: SolEvent>(event: &E, block: u64) -> RawLog {
    let data = event.encode_log_data();
    RawLog {
        block_number: block,
        tx_hash: TX,
        address: CONTRACT,
        topics: data.topics().to_vec(),
        data: data.data.clone(),
        ..Default::default()
    }
}

#[test]
fn erc20_transfer_becomes_one_row() {
    let mut conn = test_conn();
    let scanner = Erc20Scanner::new(CONTRACT).unwrap();

    let event = IERC20::Transfer {
        from: address!("00000000000000000000000000000000000000a1"),
        to: address!("00000000000000000000000000000000000000a2"),
        value: U256::from(1000u64),
    };
    let mutation = scanner.decode(&log_for(&event, 5)).unwrap();
    mutation(&mut conn).unwrap();

    let rows: Vec<Erc20Transfer> = erc20_transfers::table.load(&mut conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tx_hash, TX.to_vec());
    assert_eq!(rows[0].block, 5);
    assert_eq!(rows[0].from, event.from.to_vec());
    assert_eq!(rows[0].to, event.to.to_vec());
    assert_eq!(rows[0].value, codec::u256_to_bytes(&U256::from(1000u64)));
}

#[test]
fn erc1155_batch_expands_to_one_row_per_id() {
    let mut conn = test_conn();
    let scanner = Erc1155Scanner::new(CONTRACT).unwrap();

    let ids = vec![U256::from(1u64), U256::from(2u64), U256::from(3u64)];
    let values = vec![U256::from(10u64), U256::from(20u64), U256::from(30u64)];
    let event = IERC1155::TransferBatch {
        operator: address!("00000000000000000000000000000000000000a1"),
        from: address!("00000000000000000000000000000000000000a2"),
        to: address!("00000000000000000000000000000000000000a3"),
        ids: ids.clone(),
        values: values.clone(),
    };
    let mutation = scanner.decode(&log_for(&event, 9)).unwrap();
    mutation(&mut conn).unwrap();

    let rows: Vec<Erc1155Transfer> = erc1155_transfers::table
        .order(erc1155_transfers::idx.asc())
        .load(&mut conn)
        .unwrap();
    assert_eq!(rows.len(), 3);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.index, i as i32);
        assert_eq!(row.tx_hash, TX.to_vec());
        assert_eq!(row.id, codec::u256_to_bytes(&ids[i]));
        assert_eq!(row.value, codec::u256_to_bytes(&values[i]));
    }
}

#[test]
fn erc1155_single_is_row_zero() {
    let mut conn = test_conn();
    let scanner = Erc1155Scanner::new(CONTRACT).unwrap();

    let event = IERC1155::TransferSingle {
        operator: address!("00000000000000000000000000000000000000a1"),
        from: address!("00000000000000000000000000000000000000a2"),
        to: address!("00000000000000000000000000000000000000a3"),
        id: U256::from(7u64),
        value: U256::from(1u64),
    };
    scanner.decode(&log_for(&event, 4)).unwrap()(&mut conn).unwrap();

    let rows: Vec<Erc1155Transfer> = erc1155_transfers::table.load(&mut conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].index, 0);
}

#[test]
fn faucet_claim_becomes_one_row() {
    let mut conn = test_conn();
    let scanner = FaucetScanner::new(CONTRACT).unwrap();

    let event = IFaucet::Claimed {
        account: address!("00000000000000000000000000000000000000a9"),
    };
    scanner.decode(&log_for(&event, 2)).unwrap()(&mut conn).unwrap();

    let rows: Vec<FaucetClaim> = faucet_claims::table.load(&mut conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].account, event.account.to_vec());
}

fn proposal_created(proposal_id: u64) -> IGovernor::ProposalCreated {
    IGovernor::ProposalCreated {
        proposalId: U256::from(proposal_id),
        proposer: address!("00000000000000000000000000000000000000a1"),
        targets: vec![address!("00000000000000000000000000000000000000a2")],
        values: vec![U256::ZERO],
        signatures: vec!["doSomething(uint256)".to_string()],
        calldatas: vec![vec![1u8, 2, 3].into()],
        voteStart: U256::from(100u64),
        voteEnd: U256::from(200u64),
        description: "raise the cap".to_string(),
    }
}

#[test]
fn proposal_lifecycle_flips_active_once() {
    let mut conn = test_conn();
    let scanner = GovernorScanner::new(CONTRACT).unwrap();

    let created = proposal_created(77);
    scanner.decode(&log_for(&created, 10)).unwrap()(&mut conn).unwrap();

    let rows: Vec<GovernorProposal> = governor_proposals::table.load(&mut conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].active);
    assert_eq!(rows[0].proposal_id, codec::u256_to_bytes(&U256::from(77u64)));
    assert_eq!(
        codec::decode_address_list(&rows[0].targets).unwrap(),
        created.targets
    );
    assert_eq!(
        codec::decode_string_list(&rows[0].signatures).unwrap(),
        created.signatures
    );
    assert_eq!(rows[0].vote_start, 100);
    assert_eq!(rows[0].vote_end, 200);

    let canceled = IGovernor::ProposalCanceled {
        proposalId: U256::from(77u64),
    };
    scanner.decode(&log_for(&canceled, 11)).unwrap()(&mut conn).unwrap();

    let rows: Vec<GovernorProposal> = governor_proposals::table.load(&mut conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].active);

    // A later Executed for the same proposal leaves it inactive.
    let executed = IGovernor::ProposalExecuted {
        proposalId: U256::from(77u64),
    };
    scanner.decode(&log_for(&executed, 12)).unwrap()(&mut conn).unwrap();

    let rows: Vec<GovernorProposal> = governor_proposals::table.load(&mut conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].active);
}

#[test]
fn vote_cast_becomes_one_row() {
    let mut conn = test_conn();
    let scanner = GovernorScanner::new(CONTRACT).unwrap();

    let event = IGovernor::VoteCast {
        voter: address!("00000000000000000000000000000000000000a4"),
        proposalId: U256::from(77u64),
        support: 1,
        weight: U256::from(42u64),
        reason: "for".to_string(),
    };
    scanner.decode(&log_for(&event, 13)).unwrap()(&mut conn).unwrap();

    let rows: Vec<GovernorVote> = governor_votes::table.load(&mut conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].voter, event.voter.to_vec());
    assert_eq!(rows[0].support, 1);
    assert_eq!(rows[0].weight, codec::u256_to_bytes(&U256::from(42u64)));
}

#[test]
fn foreign_events_are_non_targeted() {
    let scanner = FaucetScanner::new(CONTRACT).unwrap();
    let event = IERC20::Transfer {
        from: address!("00000000000000000000000000000000000000a1"),
        to: address!("00000000000000000000000000000000000000a2"),
        value: U256::from(1u64),
    };
    let err = scanner.decode(&log_for(&event, 1)).err().unwrap();
    assert!(matches!(err, ScanError::NonTargetedEvent(_)));
}

#[test]
fn anonymous_logs_are_rejected() {
    let scanner = Erc20Scanner::new(CONTRACT).unwrap();
    let log = RawLog {
        block_number: 1,
        tx_hash: TX,
        address: CONTRACT,
        ..Default::default()
    };
    let err = scanner.decode(&log).err().unwrap();
    assert!(matches!(err, ScanError::NoEventSignature));
}
