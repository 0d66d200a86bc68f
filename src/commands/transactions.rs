// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::lean::LeanClient;
use crate::models::{BankFilter, BankTransaction};
use crate::summary::format_transaction;
use crate::utils::{maybe_print_json, pretty_table, workspace_arg};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::cmp::Reverse;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let client = super::client(conn)?;
    let workspace = workspace_arg(sub, client.config())?;
    let filter = super::bank_filter(sub)?;
    let limit = sub.get_one::<usize>("limit").copied();
    let data = query_rows(&client, &workspace, &filter, limit)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.bank.clone(),
                    r.account_id.clone(),
                    r.direction.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Bank", "Account", "Dir", "Amount", "CCY", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub bank: String,
    pub account_id: String,
    pub direction: String,
    pub amount: String,
    pub currency: String,
    pub description: String,
}

impl From<&BankTransaction> for TransactionRow {
    fn from(t: &BankTransaction) -> Self {
        let display = format_transaction(t);
        TransactionRow {
            id: display.id,
            date: display.date,
            bank: display.bank,
            account_id: t.account_id.clone(),
            direction: t.transaction.credit_debit_indicator.to_string(),
            amount: format!("{:.2}", t.abs_amount()),
            currency: t.transaction.amount.currency.clone(),
            description: display.description,
        }
    }
}

/// Newest first; undated transactions sort last.
pub fn sort_newest_first(txs: &mut [BankTransaction]) {
    txs.sort_by_key(|t| Reverse(t.transaction.booking_date()));
}

pub fn query_rows(
    client: &LeanClient,
    workspace: &str,
    filter: &BankFilter,
    limit: Option<usize>,
) -> Result<Vec<TransactionRow>> {
    let report = super::run_pipeline(client, workspace, filter)?;
    for w in &report.summary.warnings {
        eprintln!("warning: {} for {} unavailable: {}", w.resource, w.id, w.message);
    }
    let mut txs = report.transactions;
    sort_newest_first(&mut txs);
    Ok(txs
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(TransactionRow::from)
        .collect())
}
