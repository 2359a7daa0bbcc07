// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{hex0x, parse_addr_param, with_conn, DbPool};
use crate::dbtypes::{tables::faucet_claims, FaucetClaim};
use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde_json::json;

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/faucet").route("/history/{addr}", web::get().to(history)));
}

async fn history(pool: web::Data<DbPool>, path: web::Path<String>) -> HttpResponse {
    let address = match parse_addr_param(&path.into_inner()) {
        Ok(address) => address,
        Err(response) => return response,
    };
    with_conn(pool, move |conn| {
        let rows: Vec<FaucetClaim> = faucet_claims::table
            .filter(faucet_claims::account.eq(address.to_vec()))
            .load(conn)?;
        Ok(json!(rows
            .iter()
            .map(|row| json!({
                "tx_hash": hex0x(&row.tx_hash),
                "block": row.block,
                "account": hex0x(&row.account),
            }))
            .collect::<Vec<_>>()))
    })
    .await
}
