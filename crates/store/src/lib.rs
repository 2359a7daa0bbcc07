// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Document store for raw logs, one document per log.
//!
//! Two sled trees back the store: a block-ordered primary tree and a
//! per-address index tree. Keys embed the `(high, low)` split of the block
//! number big-endian, so lexicographic key order is block order and range
//! scans realize the compound comparison
//! `(high > F_high) OR (high == F_high AND low >= F_low)`.

mod log_store;

pub use log_store::{LogStore, StoreError};
