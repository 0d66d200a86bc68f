// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use std::path::Path;

use super::transactions::{TransactionRow, query_rows};
use crate::utils::workspace_arg;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim().to_string();
    let client = super::client(conn)?;
    let workspace = workspace_arg(sub, client.config())?;
    let filter = super::bank_filter(sub)?;

    let rows = query_rows(&client, &workspace, &filter, None)?;
    write_rows(&rows, &fmt, Path::new(&out))?;
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}

pub fn write_rows(rows: &[TransactionRow], fmt: &str, out: &Path) -> Result<()> {
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "bank",
                "account_id",
                "direction",
                "amount",
                "currency",
                "description",
            ])?;
            for r in rows {
                wtr.write_record([
                    &r.id,
                    &r.date,
                    &r.bank,
                    &r.account_id,
                    &r.direction,
                    &r.amount,
                    &r.currency,
                    &r.description,
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(rows)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(())
}
