// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! The event logger server: block-driven scan loop, per-address live
//! fan-out, and the Logger/Admin gRPC surface.

mod filter;
mod registry;
mod scan;
mod service;

pub use filter::FilterState;
pub use registry::{SubscriptionGuard, SubscriptionRegistry};
pub use scan::{ControlError, LoggerCore, ScanState};
pub use service::{AdminService, LoggerService};

use alloy_primitives::Address;
use anyhow::{ensure, Context, Result};
use evlog_chain::ChainClient;
use evlog_proto::{admin_server::AdminServer, logger_server::LoggerServer};
use evlog_store::LogStore;
use std::{
    future::Future,
    net::{SocketAddr, ToSocketAddrs},
    sync::Arc,
};
use tracing::{info, warn};

/// Filter seeded from configuration. When present the scan loop starts
/// immediately from `from_block`.
#[derive(Debug, Clone)]
pub struct InitialFilter {
    pub addresses: Vec<Address>,
    pub from_block: u64,
}

fn parse_host(host: &str) -> Result<SocketAddr> {
    ensure!(!host.is_empty(), "addr is not set");
    let (_, port) = host
        .rsplit_once(':')
        .context("invalid addr require <ip:port>")?;
    let port: u16 = port.parse().context("invalid open port: is not number")?;
    ensure!(port >= 1000, "invalid open port: require 'port >= 1000'");
    host.to_socket_addrs()
        .context("cannot resolve listen address")?
        .next()
        .context("cannot resolve listen address")
}

/// Runs the gRPC server until `shutdown` resolves, then quits the scan
/// loop and stops the transport.
pub async fn serve<F>(
    host: &str,
    chain: Arc<dyn ChainClient>,
    store: Arc<LogStore>,
    initial: Option<InitialFilter>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = parse_host(host)?;

    let core = Arc::new(LoggerCore::new(chain, store));
    match initial {
        Some(initial) => {
            core.set_filter(initial.addresses, initial.from_block);
            Arc::clone(&core)
                .start(initial.from_block)
                .await
                .context("start scan from config")?;
        }
        None => warn!("filterquery is not set, waiting for scan start"),
    }

    info!(%addr, "starting gRPC server");
    let quit_core = Arc::clone(&core);
    tonic::transport::Server::builder()
        .add_service(LoggerServer::new(LoggerService::new(Arc::clone(&core))))
        .add_service(AdminServer::new(AdminService::new(core)))
        .serve_with_shutdown(addr, async move {
            shutdown.await;
            warn!("quit...");
            quit_core.quit().await;
        })
        .await
        .context("grpc transport failed")
}

#[cfg(test)]
mod tests {
    use super::parse_host;

    #[test]
    fn parse_host_validates_shape_and_port() {
        assert!(parse_host("").is_err());
        assert!(parse_host("nocolon").is_err());
        assert!(parse_host("127.0.0.1:abc").is_err());
        assert!(parse_host("127.0.0.1:999").is_err());
        assert_eq!(
            parse_host("127.0.0.1:5000").unwrap(),
            "127.0.0.1:5000".parse().unwrap()
        );
    }
}
