// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Read-only HTTP query API over the decoded event store, mounted under
//! `/api/v1`.

mod erc1155;
mod erc20;
mod faucet;
mod governor;

use actix_web::{web, App, HttpResponse, HttpServer};
use alloy_primitives::Address;
use anyhow::{Context, Result};
use diesel::{
    r2d2::{ConnectionManager, Pool},
    SqliteConnection,
};
use serde_json::json;
use tracing::info;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub fn new_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .context("build connection pool")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    erc20::register(cfg);
    erc1155::register(cfg);
    faucet::register(cfg);
    governor::register(cfg);
}

/// Serves the query API until the server is shut down.
pub async fn serve(pool: DbPool, listen: &str) -> Result<()> {
    info!(listen, "open rest api...");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .service(web::scope("/api/v1").configure(configure))
    })
    .bind(listen)
    .context("bind api listener")?
    .run()
    .await
    .context("api server failed")
}

/// Runs a read query on a pooled connection; handler errors become a 500
/// with an `error` body.
pub(crate) async fn with_conn<F>(pool: web::Data<DbPool>, query: F) -> HttpResponse
where
    F: FnOnce(&mut SqliteConnection) -> Result<serde_json::Value> + Send + 'static,
{
    let result = web::block(move || {
        let mut conn = pool.get()?;
        query(&mut conn)
    })
    .await;
    match result {
        Ok(Ok(value)) => HttpResponse::Ok().json(json!({ "data": value })),
        Ok(Err(err)) => {
            HttpResponse::InternalServerError().json(json!({ "error": err.to_string() }))
        }
        Err(err) => HttpResponse::InternalServerError().json(json!({ "error": err.to_string() })),
    }
}

/// Path params accept 40 or 42 hex chars; the zero address is rejected.
pub(crate) fn parse_addr_param(raw: &str) -> Result<Address, HttpResponse> {
    let len = raw.len();
    if !(len == 40 || len == 42) {
        return Err(
            HttpResponse::BadRequest().json(json!({ "error": "invalid address format" }))
        );
    }
    let address: Address = raw.parse().map_err(|_| {
        HttpResponse::UnprocessableEntity()
            .json(json!({ "error": "address is zero or not hex string" }))
    })?;
    if address.is_zero() {
        return Err(HttpResponse::UnprocessableEntity()
            .json(json!({ "error": "address is zero or not hex string" })));
    }
    Ok(address)
}

pub(crate) fn hex0x(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::parse_addr_param;

    #[test]
    fn address_params_are_validated() {
        assert!(parse_addr_param("0x00000000000000000000000000000000000000aa").is_ok());
        assert!(parse_addr_param("00000000000000000000000000000000000000aa").is_ok());
        assert!(parse_addr_param("0xdead").is_err());
        assert!(parse_addr_param("zz000000000000000000000000000000000000aa").is_err());
        assert!(parse_addr_param("0x0000000000000000000000000000000000000000").is_err());
    }
}
