// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use clap::Parser;
use cli::Cli;

mod cli;
mod event_logger;
mod scanner;
mod signals;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    Cli::parse().execute().await
}
