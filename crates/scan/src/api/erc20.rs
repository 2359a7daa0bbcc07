// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{hex0x, parse_addr_param, with_conn, DbPool};
use crate::dbtypes::{tables::erc20_transfers, Erc20Transfer};
use actix_web::{web, HttpResponse};
use anyhow::Result;
use diesel::prelude::*;
use serde_json::{json, Value};

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/erc20")
            .route("/holders", web::get().to(holders))
            .route("/history/{addr}", web::get().to(history)),
    );
}

async fn holders(pool: web::Data<DbPool>) -> HttpResponse {
    with_conn(pool, |conn| {
        let recipients: Vec<Vec<u8>> = erc20_transfers::table
            .select(erc20_transfers::recipient)
            .distinct()
            .load(conn)?;
        Ok(json!(recipients.iter().map(|r| hex0x(r)).collect::<Vec<_>>()))
    })
    .await
}

async fn history(pool: web::Data<DbPool>, path: web::Path<String>) -> HttpResponse {
    let address = match parse_addr_param(&path.into_inner()) {
        Ok(address) => address,
        Err(response) => return response,
    };
    with_conn(pool, move |conn| {
        let rows: Vec<Erc20Transfer> = erc20_transfers::table
            .filter(
                erc20_transfers::sender
                    .eq(address.to_vec())
                    .or(erc20_transfers::recipient.eq(address.to_vec())),
            )
            .load(conn)?;
        rows.iter().map(transfer_json).collect::<Result<Vec<_>>>().map(Value::from)
    })
    .await
}

fn transfer_json(row: &Erc20Transfer) -> Result<Value> {
    Ok(json!({
        "tx_hash": hex0x(&row.tx_hash),
        "block": row.block,
        "from": hex0x(&row.from),
        "to": hex0x(&row.to),
        "value": hex0x(&row.value),
    }))
}
