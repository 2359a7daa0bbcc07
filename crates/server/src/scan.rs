// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{filter::FilterState, registry::SubscriptionRegistry};
use anyhow::Context;
use evlog_chain::ChainClient;
use evlog_proto::{log_to_wire, Log};
use evlog_store::LogStore;
use evlog_types::LogDocument;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tonic::Status;
use tracing::{debug, error, trace};

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("already started {0} ...")]
    AlreadyStarted(u64),
    #[error("server is shutting down")]
    Closed,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Scan progress. The scan loop is the sole writer; everyone else reads.
/// `scan_block == 0` means idle. While running, `scan_block` is the highest
/// completed block and `stop_block` stays `u64::MAX` until a stop request
/// sets it to `scan_block + 1`.
#[derive(Default)]
pub struct ScanState {
    scan_block: AtomicU64,
    stop_block: AtomicU64,
}

impl ScanState {
    pub fn scan_block(&self) -> u64 {
        self.scan_block.load(Ordering::SeqCst)
    }

    pub fn stop_block(&self) -> u64 {
        self.stop_block.load(Ordering::SeqCst)
    }

    fn set_scan_block(&self, block: u64) {
        self.scan_block.store(block, Ordering::SeqCst)
    }

    fn set_stop_block(&self, block: u64) {
        self.stop_block.store(block, Ordering::SeqCst)
    }
}

struct ScanControl {
    /// Sentinel handed over by a running scan loop; `stop()` awaits it.
    done: Option<mpsc::Receiver<()>>,
    closed: bool,
}

pub type LiveSink = Result<Log, Status>;

/// Shared state of the logger server: chain client, document store, the
/// mutable address filter, scan progress and the live fan-out registry.
pub struct LoggerCore {
    pub(crate) chain: Arc<dyn ChainClient>,
    pub(crate) store: Arc<LogStore>,
    pub(crate) filter: RwLock<FilterState>,
    pub(crate) scan: ScanState,
    pub(crate) registry: SubscriptionRegistry<LiveSink>,
    control: tokio::sync::Mutex<ScanControl>,
}

impl LoggerCore {
    pub fn new(chain: Arc<dyn ChainClient>, store: Arc<LogStore>) -> Self {
        Self {
            chain,
            store,
            filter: RwLock::new(FilterState::new()),
            scan: ScanState::default(),
            registry: SubscriptionRegistry::new(),
            control: tokio::sync::Mutex::new(ScanControl {
                done: None,
                closed: false,
            }),
        }
    }

    /// The highest completed block, 0 when idle.
    pub fn scan_block(&self) -> u64 {
        self.scan.scan_block()
    }

    /// Seeds the address filter, deduplicating the input.
    pub fn set_filter(&self, addresses: Vec<alloy_primitives::Address>, from_block: u64) {
        self.filter.write().unwrap().replace(addresses, from_block);
    }

    /// Starts the scan loop. The loop resumes from
    /// `max(highest stored block, from - 1)` so a restart never falls
    /// behind what is already persisted.
    pub async fn start(self: Arc<Self>, from: u64) -> Result<(), ControlError> {
        let mut control = self.control.lock().await;
        if control.closed {
            return Err(ControlError::Closed);
        }
        let current = self.scan.scan_block();
        if current != 0 {
            return Err(ControlError::AlreadyStarted(current));
        }

        self.scan.set_stop_block(u64::MAX);
        let heads = self
            .chain
            .subscribe_heads()
            .await
            .context("subscribe new head")?;
        let latest = self
            .store
            .max_block()
            .context("read latest stored block")?;
        self.scan.set_scan_block(latest.max(from.saturating_sub(1)));

        let (done_tx, done_rx) = mpsc::channel(1);
        control.done = Some(done_rx);
        drop(control);
        tokio::spawn(scan_loop(self, heads, done_tx));
        Ok(())
    }

    /// Requests a stop and waits for the loop to pass its next block
    /// boundary. Returns the last completed block and resets the state to
    /// idle. A no-op (returning 0) when the loop is not running.
    pub async fn stop(&self) -> u64 {
        let mut control = self.control.lock().await;
        let Some(mut done) = control.done.take() else {
            return self.scan.scan_block();
        };
        trace!(scan_block = self.scan.scan_block(), "stop requested");
        self.scan.set_stop_block(self.scan.scan_block() + 1);
        let _ = done.recv().await;
        let stopped = self.scan.scan_block().max(self.scan.stop_block());
        self.scan.set_stop_block(stopped);
        self.scan.set_scan_block(0);
        debug!(stop_block = stopped, "scan stopped");
        stopped
    }

    /// Stops the loop if running and marks the server as shutting down, so
    /// further stops are no-ops and no new scan can start.
    pub async fn quit(&self) {
        if self.scan.scan_block() != 0 {
            self.stop().await;
        }
        self.control.lock().await.closed = true;
    }

    /// Sweeps `(scan_block, head]` one block at a time: snapshot the filter,
    /// fetch the block's matching logs, fan them out, and collect their
    /// document forms. The whole head's documents are persisted in one call;
    /// a failed insert is logged but does not stop the scan, since the block
    /// has already been delivered live.
    async fn sweep_to(&self, head: u64) -> anyhow::Result<()> {
        let mut documents: Vec<LogDocument> = Vec::new();
        while self.scan.scan_block() < head {
            let number = self.scan.scan_block() + 1;
            self.scan.set_scan_block(number);

            let addresses = self.filter.read().unwrap().addresses();
            let logs = self.chain.filter_logs(addresses, number).await?;
            for log in &logs {
                debug!(block = number, address = %log.address, "filter log");
                documents.push(LogDocument::from(log));
                self.registry.broadcast(&log.address, Ok(log_to_wire(log)));
            }
        }
        if !documents.is_empty() {
            if let Err(err) = self.store.insert_many(&documents) {
                error!(count = documents.len(), %err, "fail to insert documents");
            }
        }
        Ok(())
    }
}

/// Consumes new heads in arrival order until `scan_block` passes
/// `stop_block`, then signals the sentinel. Chain failures are fatal:
/// continuing would silently skip blocks.
async fn scan_loop(core: Arc<LoggerCore>, mut heads: mpsc::Receiver<u64>, done: mpsc::Sender<()>) {
    while core.scan.scan_block() < core.scan.stop_block() {
        match heads.recv().await {
            Some(head) => {
                if let Err(err) = core.sweep_to(head).await {
                    error!(%err, scan_block = core.scan.scan_block(), "fail to call filter logs");
                    std::process::exit(1);
                }
            }
            None => {
                error!(
                    scan_block = core.scan.scan_block(),
                    "err subscribe new head"
                );
                std::process::exit(1);
            }
        }
    }
    let _ = done.send(()).await;
}
