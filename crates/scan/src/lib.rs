// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! The event scanner: streams logs from the logger server, decodes them
//! into typed event records per contract schema, and commits the resulting
//! relational mutations in batched transactions.

pub mod api;
pub mod contracts;
pub mod dbtypes;
mod erc1155;
mod erc20;
mod faucet;
mod governor;
mod schema;
mod scanner;

pub use erc1155::{Erc1155Event, Erc1155Scanner};
pub use erc20::{Erc20Event, Erc20Scanner};
pub use faucet::{FaucetEvent, FaucetScanner};
pub use governor::{GovernorEvent, GovernorScanner};
pub use schema::{DecoderFn, EventSchema, ScanError};
pub use scanner::{build_scanners, run, LogScanner, Mutation, MUTATION_QUEUE_DEPTH};

use anyhow::{anyhow, Result};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Creates the relational schema; a no-op for migrations already applied.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| anyhow!("run migrations: {err}"))?;
    Ok(())
}
