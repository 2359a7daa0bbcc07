// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Chain node client seam.
//!
//! [`ChainClient`] is the narrow interface the scan loop needs from the
//! upstream node; [`EthChain`] implements it over an alloy provider.

use alloy::{
    network::Ethereum,
    providers::{Provider, ProviderBuilder},
    rpc::types::Filter,
};
use alloy_primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use evlog_types::RawLog;
use futures_util::stream::StreamExt;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{info, warn};

const CHAIN_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// What the scan loop needs from the upstream chain node.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Subscribes to new heads. The receiver yields head block numbers in
    /// arrival order; a closed channel means the subscription was lost.
    async fn subscribe_heads(&self) -> Result<mpsc::Receiver<u64>>;

    /// Returns the logs emitted in `block` by any of `addresses`. An empty
    /// address list matches every log in the block.
    async fn filter_logs(&self, addresses: Vec<Address>, block: u64) -> Result<Vec<RawLog>>;

    fn chain_id(&self) -> u64;
}

/// Alloy-backed chain client. Requires a pubsub-capable (WebSocket)
/// endpoint for the head subscription.
pub struct EthChain {
    provider: Arc<dyn Provider<Ethereum>>,
    chain_id: u64,
}

impl EthChain {
    pub async fn connect(uri: &str) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect(uri)
            .await
            .context("failed to connect to the chain node")?;
        let chain_id = tokio::time::timeout(CHAIN_QUERY_TIMEOUT, provider.get_chain_id())
            .await
            .context("chain id query timed out")??;
        info!(chain_id, uri, "connected to chain node");
        Ok(Self {
            provider: Arc::new(provider),
            chain_id,
        })
    }
}

#[async_trait]
impl ChainClient for EthChain {
    async fn subscribe_heads(&self) -> Result<mpsc::Receiver<u64>> {
        let subscription = self
            .provider
            .subscribe_blocks()
            .await
            .context("failed to subscribe to new heads")?;
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut stream = subscription.into_stream();
            while let Some(header) = stream.next().await {
                if tx.send(header.number).await.is_err() {
                    return;
                }
            }
            // Dropping the sender closes the receiver, which the scan loop
            // treats as subscription loss.
            warn!("new head subscription ended");
        });
        Ok(rx)
    }

    async fn filter_logs(&self, addresses: Vec<Address>, block: u64) -> Result<Vec<RawLog>> {
        let filter = Filter::new()
            .address(addresses)
            .from_block(block)
            .to_block(block);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .with_context(|| format!("filter logs failed at block {block}"))?;
        Ok(logs.iter().map(from_rpc_log).collect())
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

fn from_rpc_log(log: &alloy::rpc::types::Log) -> RawLog {
    RawLog {
        block_number: log.block_number.unwrap_or_default(),
        block_hash: log.block_hash.unwrap_or_default(),
        tx_hash: log.transaction_hash.unwrap_or_default(),
        index: log.log_index.unwrap_or_default() as u32,
        tx_index: log.transaction_index.unwrap_or_default() as u32,
        address: log.address(),
        topics: log.topics().to_vec(),
        data: log.data().data.clone(),
        removed: log.removed,
    }
}
