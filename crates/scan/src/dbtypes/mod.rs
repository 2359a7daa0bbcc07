// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Relational layout of decoded events: one table per event variant,
//! keyed by transaction hash (plus the expansion index for ERC-1155
//! batches). Variable-length aggregates persist as length-prefixed
//! binary, big integers as big-endian bytes.

pub mod codec;
pub mod records;
pub mod tables;

pub use records::{Erc1155Transfer, Erc20Transfer, FaucetClaim, GovernorProposal, GovernorVote};
