// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    erc1155::Erc1155Scanner, erc20::Erc20Scanner, faucet::FaucetScanner,
    governor::GovernorScanner, schema::ScanError,
};
use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use diesel::{Connection, SqliteConnection};
use evlog_config::ContractsConfig;
use evlog_proto::{log_from_wire, logger_client::LoggerClient, ConnectReqMessage, Log};
use evlog_types::RawLog;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tonic::transport::Channel;
use tracing::{debug, error, info, warn};

/// A deferred relational-store write produced by decoding one event.
/// Created by a scanner, enqueued, and drained by the batch committer.
pub type Mutation = Box<dyn FnOnce(&mut SqliteConnection) -> Result<()> + Send>;

pub const MUTATION_QUEUE_DEPTH: usize = 256;
const COMMIT_INTERVAL: Duration = Duration::from_secs(1);

/// A typed per-contract scanner: resolves a raw log against the contract's
/// event schema and yields the relational mutation for it.
pub trait LogScanner: Send + Sync {
    fn name(&self) -> &'static str;
    fn address(&self) -> Address;
    fn decode(&self, log: &RawLog) -> Result<Mutation, ScanError>;
}

/// One scanner per configured non-zero contract address.
pub fn build_scanners(contracts: &ContractsConfig) -> Result<Vec<Arc<dyn LogScanner>>, ScanError> {
    let mut scanners: Vec<Arc<dyn LogScanner>> = Vec::new();
    if !contracts.erc20.is_zero() {
        scanners.push(Arc::new(Erc20Scanner::new(contracts.erc20)?));
    }
    if !contracts.erc1155.is_zero() {
        scanners.push(Arc::new(Erc1155Scanner::new(contracts.erc1155)?));
    }
    if !contracts.faucet.is_zero() {
        scanners.push(Arc::new(FaucetScanner::new(contracts.faucet)?));
    }
    if !contracts.governance.is_zero() {
        scanners.push(Arc::new(GovernorScanner::new(contracts.governance)?));
    }
    Ok(scanners)
}

/// Opens a log stream per scanner and commits decoded mutations in batched
/// transactions until `stop` fires or a commit fails.
pub async fn run(
    contracts: &ContractsConfig,
    mut conn: SqliteConnection,
    client: LoggerClient<Channel>,
    mut stop: mpsc::Receiver<()>,
) -> Result<()> {
    info!("set scanners...");
    let scanners = build_scanners(contracts)?;
    let (tx, mut rx) = mpsc::channel::<Mutation>(MUTATION_QUEUE_DEPTH);

    for scanner in scanners {
        let stream = client
            .clone()
            .connect(ConnectReqMessage {
                from_block: contracts.from,
                address: scanner.address().to_vec(),
            })
            .await?
            .into_inner();
        tokio::spawn(drive_scanner(scanner, stream, tx.clone()));
    }
    drop(tx);

    let mut tick = tokio::time::interval(COMMIT_INTERVAL);
    let mut pending: Vec<Mutation> = Vec::with_capacity(MUTATION_QUEUE_DEPTH);
    info!("start scan!");
    loop {
        tokio::select! {
            _ = stop.recv() => return Ok(()),
            Some(mutation) = rx.recv() => pending.push(mutation),
            _ = tick.tick() => {
                if pending.is_empty() {
                    continue;
                }
                let batch = std::mem::take(&mut pending);
                commit_batch(&mut conn, batch)?;
            }
        }
    }
}

/// Decodes every received wire log and forwards its mutation. Stream errors
/// are enqueued as failing mutations so the committer surfaces them and
/// terminates the scanner; decode failures only log.
async fn drive_scanner(
    scanner: Arc<dyn LogScanner>,
    mut stream: tonic::Streaming<Log>,
    tx: mpsc::Sender<Mutation>,
) {
    let name = scanner.name();
    loop {
        match stream.message().await {
            Ok(Some(wire)) => {
                let log = log_from_wire(&wire);
                match scanner.decode(&log) {
                    Ok(mutation) => {
                        if tx.send(mutation).await.is_err() {
                            return;
                        }
                    }
                    Err(ScanError::NonTargetedEvent(topic)) => {
                        warn!(scanner = name, %topic, "non-targeted event")
                    }
                    Err(err) => {
                        error!(scanner = name, %err, block = log.block_number, "fail to decode log")
                    }
                }
            }
            Ok(None) => {
                error!(scanner = name, "log stream closed");
                let _ = tx
                    .send(Box::new(move |_| Err(anyhow!("{name}: log stream closed"))))
                    .await;
                return;
            }
            Err(status) => {
                error!(scanner = name, %status, "stream recv error");
                let _ = tx
                    .send(Box::new(move |_| Err(anyhow!("{name}: {status}"))))
                    .await;
                return;
            }
        }
    }
}

/// Applies the whole batch inside one transaction, preserving enqueue
/// order. The first error rolls everything back.
fn commit_batch(conn: &mut SqliteConnection, batch: Vec<Mutation>) -> Result<()> {
    let count = batch.len();
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        for mutation in batch {
            mutation(conn)?;
        }
        Ok(())
    })?;
    debug!(count, "committed mutation batch");
    Ok(())
}
