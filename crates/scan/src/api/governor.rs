// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{hex0x, parse_addr_param, with_conn, DbPool};
use crate::dbtypes::{
    codec,
    tables::{governor_proposals, governor_votes},
    GovernorProposal, GovernorVote,
};
use actix_web::{web, HttpResponse};
use anyhow::Result;
use diesel::dsl::{exists, not};
use diesel::prelude::*;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/proposals")
            .route("/", web::get().to(all_proposals))
            .route("/voteable-items/{addr}", web::get().to(voteable_proposals))
            .route("/executable-items", web::get().to(executable_proposals)),
    );
    cfg.service(web::scope("/votes").route("/history/{addr}", web::get().to(vote_history)));
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

async fn all_proposals(pool: web::Data<DbPool>) -> HttpResponse {
    with_conn(pool, |conn| {
        let rows: Vec<GovernorProposal> = governor_proposals::table.load(conn)?;
        rows.iter().map(proposal_json).collect::<Result<Vec<_>>>().map(Value::from)
    })
    .await
}

/// Active proposals inside their voting window that `addr` has not voted
/// on yet.
async fn voteable_proposals(pool: web::Data<DbPool>, path: web::Path<String>) -> HttpResponse {
    let address = match parse_addr_param(&path.into_inner()) {
        Ok(address) => address,
        Err(response) => return response,
    };
    with_conn(pool, move |conn| {
        let now = unix_now();
        let voted = governor_votes::table
            .filter(governor_votes::voter.eq(address.to_vec()))
            .filter(governor_votes::proposal_id.eq(governor_proposals::proposal_id));
        let rows: Vec<GovernorProposal> = governor_proposals::table
            .filter(governor_proposals::active.eq(true))
            .filter(governor_proposals::vote_start.le(now))
            .filter(governor_proposals::vote_end.gt(now))
            .filter(not(exists(voted)))
            .load(conn)?;
        rows.iter().map(proposal_json).collect::<Result<Vec<_>>>().map(Value::from)
    })
    .await
}

/// Active proposals whose voting window has closed.
async fn executable_proposals(pool: web::Data<DbPool>) -> HttpResponse {
    with_conn(pool, |conn| {
        let now = unix_now();
        let rows: Vec<GovernorProposal> = governor_proposals::table
            .filter(governor_proposals::active.eq(true))
            .filter(governor_proposals::vote_end.le(now))
            .load(conn)?;
        rows.iter().map(proposal_json).collect::<Result<Vec<_>>>().map(Value::from)
    })
    .await
}

async fn vote_history(pool: web::Data<DbPool>, path: web::Path<String>) -> HttpResponse {
    let address = match parse_addr_param(&path.into_inner()) {
        Ok(address) => address,
        Err(response) => return response,
    };
    with_conn(pool, move |conn| {
        let rows: Vec<GovernorVote> = governor_votes::table
            .filter(governor_votes::voter.eq(address.to_vec()))
            .load(conn)?;
        Ok(json!(rows
            .iter()
            .map(|row| json!({
                "tx_hash": hex0x(&row.tx_hash),
                "block": row.block,
                "voter": hex0x(&row.voter),
                "proposal_id": hex0x(&row.proposal_id),
                "support": row.support,
                "weight": hex0x(&row.weight),
                "reason": row.reason,
            }))
            .collect::<Vec<_>>()))
    })
    .await
}

fn proposal_json(row: &GovernorProposal) -> Result<Value> {
    let targets = codec::decode_address_list(&row.targets)?
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>();
    let values = codec::decode_u256_list(&row.values)?
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>();
    let signatures = codec::decode_string_list(&row.signatures)?;
    let calldatas = codec::decode_bytes_list(&row.calldatas)?
        .iter()
        .map(|c| hex0x(c))
        .collect::<Vec<_>>();
    Ok(json!({
        "tx_hash": hex0x(&row.tx_hash),
        "block": row.block,
        "active": row.active,
        "proposal_id": hex0x(&row.proposal_id),
        "proposer": hex0x(&row.proposer),
        "targets": targets,
        "values": values,
        "signatures": signatures,
        "calldatas": calldatas,
        "vote_start": row.vote_start,
        "vote_end": row.vote_end,
        "description": row.description,
    }))
}
