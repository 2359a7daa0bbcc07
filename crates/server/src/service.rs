// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::scan::{ControlError, LoggerCore};
use alloy_primitives::Address;
use evlog_proto::{
    admin_server::Admin, log_to_wire, logger_server::Logger, AddressReqMessage,
    BlockNumberMessage, ConnectReqMessage, Empty, InfoResMessage, Log,
};
use evlog_store::StoreError;
use evlog_types::RawLog;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};
use tracing::debug;

fn parse_address(bytes: &[u8]) -> Result<Address, Status> {
    Address::try_from(bytes).map_err(|_| Status::invalid_argument("invalid address"))
}

/// Public surface: filter inspection and per-address log streams.
pub struct LoggerService {
    core: Arc<LoggerCore>,
}

impl LoggerService {
    pub fn new(core: Arc<LoggerCore>) -> Self {
        Self { core }
    }
}

#[tonic::async_trait]
impl Logger for LoggerService {
    async fn info(&self, _request: Request<Empty>) -> Result<Response<InfoResMessage>, Status> {
        debug!("Info");
        let address = self
            .core
            .filter
            .read()
            .unwrap()
            .addresses()
            .iter()
            .map(|a| a.to_vec())
            .collect();
        Ok(Response::new(InfoResMessage { address }))
    }

    type ConnectStream = ReceiverStream<Result<Log, Status>>;

    async fn connect(
        &self,
        request: Request<ConnectReqMessage>,
    ) -> Result<Response<Self::ConnectStream>, Status> {
        let req = request.into_inner();
        let address = parse_address(&req.address)?;
        debug!(%address, from = req.from_block, "Connect");

        if !self.core.filter.read().unwrap().contains(&address) {
            return Err(Status::invalid_argument("invalid address"));
        }

        // Historical replay ends at "now"; blocks scanned while it streams
        // may be missed by this client (at-least-once, best-effort).
        let history = if req.from_block > 0 {
            self.core
                .store
                .find_from(&address, req.from_block)
                .map_err(|err| match err {
                    StoreError::Codec(_) => Status::internal(err.to_string()),
                    StoreError::Storage(_) => Status::unavailable("fail to find logs"),
                })?
        } else {
            Vec::new()
        };

        let (tx, rx) = mpsc::channel::<Result<Log, Status>>(64);
        let core = Arc::clone(&self.core);
        tokio::spawn(async move {
            for doc in &history {
                let log = RawLog::from(doc);
                if tx.send(Ok(log_to_wire(&log))).await.is_err() {
                    // Client went away mid-replay.
                    return;
                }
            }

            let (guard, mut errors) = core.registry.add(address, tx.clone());
            tokio::select! {
                _ = tx.closed() => {}
                err = errors.recv() => {
                    if let Some(err) = err {
                        let _ = tx.send(Err(Status::unknown(err.to_string()))).await;
                    }
                }
            }
            drop(guard);
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

/// Administrative surface: filter mutation and scan control.
pub struct AdminService {
    core: Arc<LoggerCore>,
}

impl AdminService {
    pub fn new(core: Arc<LoggerCore>) -> Self {
        Self { core }
    }
}

#[tonic::async_trait]
impl Admin for AdminService {
    async fn add(
        &self,
        request: Request<AddressReqMessage>,
    ) -> Result<Response<BlockNumberMessage>, Status> {
        let address = parse_address(&request.into_inner().address)?;
        debug!(%address, "Add");

        if !self.core.filter.write().unwrap().add(address) {
            return Err(Status::already_exists(address.to_string()));
        }
        Ok(Response::new(BlockNumberMessage {
            block_number: self.core.scan_block(),
        }))
    }

    async fn remove(
        &self,
        request: Request<AddressReqMessage>,
    ) -> Result<Response<BlockNumberMessage>, Status> {
        let address = parse_address(&request.into_inner().address)?;
        debug!(%address, "Remove");

        if !self.core.filter.write().unwrap().remove(&address) {
            return Err(Status::invalid_argument("unknown address"));
        }
        Ok(Response::new(BlockNumberMessage {
            block_number: self.core.scan_block(),
        }))
    }

    async fn start(
        &self,
        request: Request<BlockNumberMessage>,
    ) -> Result<Response<Empty>, Status> {
        let from = request.into_inner().block_number;
        debug!(from, "Start");

        // scan_block is reset to 0 only once a stop has fully completed.
        let current = self.core.scan_block();
        if current != 0 {
            return Err(Status::aborted(format!("already started {current} ...")));
        }
        let core = Arc::clone(&self.core);
        core.start(from).await.map_err(|err| match err {
            ControlError::AlreadyStarted(_) => Status::aborted(err.to_string()),
            other => Status::internal(other.to_string()),
        })?;
        Ok(Response::new(Empty {}))
    }

    async fn stop(&self, _request: Request<Empty>) -> Result<Response<BlockNumberMessage>, Status> {
        debug!("Stop");
        let block_number = self.core.stop().await;
        Ok(Response::new(BlockNumberMessage { block_number }))
    }
}
