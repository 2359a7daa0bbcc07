// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{hex0x, parse_addr_param, with_conn, DbPool};
use crate::dbtypes::{codec, tables::erc1155_transfers, Erc1155Transfer};
use actix_web::{web, HttpResponse};
use alloy_primitives::U256;
use anyhow::Result;
use diesel::prelude::*;
use serde_json::{json, Value};

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/erc1155")
            .route("/holders/{tid}", web::get().to(holders))
            .route("/history/{addr}", web::get().to(history)),
    );
}

// Token ids are accepted in decimal or 0x-prefixed hex.
fn parse_token_id(raw: &str) -> Option<U256> {
    match raw.strip_prefix("0x") {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
        None => U256::from_str_radix(raw, 10).ok(),
    }
}

async fn holders(pool: web::Data<DbPool>, path: web::Path<String>) -> HttpResponse {
    let raw = path.into_inner();
    if raw.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "invalid tid" }));
    }
    let token_id = match parse_token_id(&raw) {
        Some(id) if !id.is_zero() => id,
        _ => {
            return HttpResponse::UnprocessableEntity()
                .json(json!({ "error": "tid is not number format" }))
        }
    };
    with_conn(pool, move |conn| {
        let recipients: Vec<Vec<u8>> = erc1155_transfers::table
            .filter(erc1155_transfers::token_id.eq(codec::u256_to_bytes(&token_id)))
            .select(erc1155_transfers::recipient)
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
        let rows: Vec<Erc1155Transfer> = erc1155_transfers::table
            .filter(
                erc1155_transfers::sender
                    .eq(address.to_vec())
                    .or(erc1155_transfers::recipient.eq(address.to_vec()))
                    .or(erc1155_transfers::operator.eq(address.to_vec())),
            )
            .load(conn)?;
        rows.iter().map(transfer_json).collect::<Result<Vec<_>>>().map(Value::from)
    })
    .await
}

fn transfer_json(row: &Erc1155Transfer) -> Result<Value> {
    Ok(json!({
        "tx_hash": hex0x(&row.tx_hash),
        "index": row.index,
        "block": row.block,
        "operator": hex0x(&row.operator),
        "from": hex0x(&row.from),
        "to": hex0x(&row.to),
        "id": hex0x(&row.id),
        "value": hex0x(&row.value),
    }))
}
