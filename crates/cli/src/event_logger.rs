// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use evlog_chain::EthChain;
use evlog_config::AppConfig;
use evlog_server::InitialFilter;
use evlog_store::LogStore;
use std::sync::Arc;
use tracing::info;

pub async fn run(config: AppConfig) -> Result<()> {
    info!("set filter query from config...");
    let initial = InitialFilter {
        addresses: config.filter_query.addresses.clone(),
        from_block: config.filter_query.scan_block,
    };

    info!("dial chain node...");
    let chain = Arc::new(
        EthChain::connect(&config.chain.uri)
            .await
            .context("dial chain node")?,
    );

    info!("open log database...");
    let store = Arc::new(LogStore::open(
        &config.database.uri,
        &config.database.database,
        &config.database.collection,
    )?);

    info!("open query server...");
    evlog_server::serve(
        &config.server.host,
        chain,
        store,
        Some(initial),
        crate::signals::shutdown_signal(),
    )
    .await
}
