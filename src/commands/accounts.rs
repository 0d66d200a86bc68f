// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Session;
use crate::models::{Account, BankFilter, Entity};
use crate::pipeline::{ensure_connected, enumerate_accounts};
use crate::summary::FetchWarning;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct AccountRow {
    pub bank_id: String,
    pub bank: String,
    pub account_id: String,
    pub name: String,
    pub account_type: String,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceRow {
    pub bank: String,
    pub account_id: String,
    pub balance_type: String,
    pub amount: String,
    pub currency: String,
    pub as_of: String,
}

fn print_warnings(warnings: &[FetchWarning]) {
    for w in warnings {
        eprintln!("warning: {} for {} unavailable: {}", w.resource, w.id, w.message);
    }
}

/// Accounts of the selected banks. A bank id that is not connected is an
/// error rather than an empty listing.
fn connected_accounts(
    session: &Session,
    filter: &BankFilter,
    warnings: &mut Vec<FetchWarning>,
) -> Result<Vec<(Entity, Account)>> {
    let entities = session
        .client
        .list_entities(&session.token, &session.customer.customer_id)?;
    ensure_connected(&entities, filter)?;
    Ok(enumerate_accounts(
        &session.client,
        &session.token,
        &entities,
        filter,
        warnings,
    ))
}

pub fn account_rows(
    session: &Session,
    filter: &BankFilter,
) -> Result<(Vec<AccountRow>, Vec<FetchWarning>)> {
    let mut warnings = Vec::new();
    let rows = connected_accounts(session, filter, &mut warnings)?
        .into_iter()
        .map(|(e, a)| AccountRow {
            bank_id: e.id,
            bank: e.name,
            name: a.label(),
            account_id: a.account_id,
            account_type: a.account_type.unwrap_or_default(),
            currency: a.currency.unwrap_or_default(),
        })
        .collect();
    Ok((rows, warnings))
}

/// Balances per selected account. An account whose balances fail to load
/// is skipped with a warning.
pub fn balance_rows(
    session: &Session,
    filter: &BankFilter,
) -> Result<(Vec<BalanceRow>, Vec<FetchWarning>)> {
    let mut warnings = Vec::new();
    let pairs = connected_accounts(session, filter, &mut warnings)?;
    let mut rows = Vec::new();
    for (entity, account) in &pairs {
        match session
            .client
            .list_balances(&session.token, &account.account_id, &entity.id)
        {
            Ok(list) => {
                for b in list {
                    rows.push(BalanceRow {
                        bank: entity.name.clone(),
                        account_id: account.account_id.clone(),
                        balance_type: b.balance_type.unwrap_or_default(),
                        amount: fmt_money(&b.amount.amount, &b.amount.currency),
                        currency: b.amount.currency,
                        as_of: b.date_time.unwrap_or_default(),
                    });
                }
            }
            Err(e) => {
                warn!(account_id = %account.account_id, error = %e, "balance fetch failed");
                warnings.push(FetchWarning {
                    resource: "balances".to_string(),
                    id: account.account_id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok((rows, warnings))
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = super::bank_filter(sub)?;
    let session = super::connect(conn, sub)?;
    let (data, warnings) = account_rows(&session, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.bank.clone(),
                    r.account_id.clone(),
                    r.name.clone(),
                    r.account_type.clone(),
                    r.currency.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Bank", "Account ID", "Name", "Type", "CCY"], rows)
        );
    }
    print_warnings(&warnings);
    Ok(())
}

pub fn balances(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = super::bank_filter(sub)?;
    let session = super::connect(conn, sub)?;
    let (data, warnings) = balance_rows(&session, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.bank.clone(),
                    r.account_id.clone(),
                    r.balance_type.clone(),
                    r.amount.clone(),
                    r.as_of.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Bank", "Account ID", "Type", "Balance", "As Of"], rows)
        );
    }
    print_warnings(&warnings);
    Ok(())
}
