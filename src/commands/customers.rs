// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::lean::{CustomerLookup, TokenScope};
use crate::utils::{maybe_print_json, pretty_table, workspace_arg};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => get(conn, sub)?,
        Some(("create", sub)) => create(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn get(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let client = super::client(conn)?;
    let workspace = workspace_arg(sub, client.config())?;
    let token = client.authenticate(&TokenScope::Api)?;
    let (status, customer_id) = match client.lookup_customer(&token, &workspace) {
        CustomerLookup::Found(c) => ("found", Some(c.customer_id)),
        CustomerLookup::NotFound => ("not_found", None),
        CustomerLookup::Error(e) => {
            return Err(e).with_context(|| format!("Customer lookup for '{}' failed", workspace));
        }
    };
    let out = json!({ "workspace": workspace, "status": status, "customer_id": customer_id });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        println!(
            "{}",
            pretty_table(
                &["Workspace", "Status", "Customer"],
                vec![vec![
                    workspace.clone(),
                    status.to_string(),
                    customer_id.unwrap_or_else(|| "-".to_string()),
                ]],
            )
        );
    }
    Ok(())
}

fn create(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let client = super::client(conn)?;
    let workspace = workspace_arg(sub, client.config())?;
    let token = client.authenticate(&TokenScope::Api)?;
    let customer = client
        .create_customer(&token, &workspace)
        .with_context(|| format!("Creating customer for '{}' failed", workspace))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &customer)? {
        println!(
            "Created customer {} for workspace '{}'",
            customer.customer_id, workspace
        );
    }
    Ok(())
}
