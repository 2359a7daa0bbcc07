// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use diesel::{Connection, SqliteConnection};
use evlog_config::AppConfig;
use evlog_proto::logger_client::LoggerClient;
use tokio::sync::mpsc;
use tracing::{error, info};

pub async fn run(config: AppConfig) -> Result<()> {
    info!("connect scan database...");
    let conn = SqliteConnection::establish(&config.scan_database.path)
        .context("connect scan database")?;

    info!("dial logger server...");
    let endpoint = format!("http://{}", config.server.host);
    let channel = tonic::transport::Endpoint::from_shared(endpoint)
        .context("logger server endpoint")?
        .connect()
        .await
        .context("dial logger server")?;
    let client = LoggerClient::new(channel);

    let pool = evlog_scan::api::new_pool(&config.scan_database.path)?;
    let api_host = config.api.host.clone();
    actix_web::rt::spawn(async move {
        if let Err(err) = evlog_scan::api::serve(pool, &api_host).await {
            error!(%err, "api server failed");
        }
    });

    let (stop_tx, stop_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        crate::signals::shutdown_signal().await;
        let _ = stop_tx.send(()).await;
    });

    evlog_scan::run(&config.contracts, conn, client, stop_rx).await
}

pub fn init(config: AppConfig) -> Result<()> {
    let mut conn = SqliteConnection::establish(&config.scan_database.path)
        .context("connect scan database")?;
    evlog_scan::run_migrations(&mut conn)?;
    println!("Scanner Init Succeeded!");
    Ok(())
}
