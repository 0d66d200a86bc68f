// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod auth;
pub mod banks;
pub mod customers;
pub mod exporter;
pub mod reports;
pub mod settings;
pub mod transactions;

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::Connection;

use crate::config::LeanConfig;
use crate::lean::{AccessToken, CustomerLookup, LeanClient, TokenScope};
use crate::models::{BankFilter, Customer};
use crate::pipeline::{Pipeline, PipelineReport};
use crate::utils::workspace_arg;

pub fn client(conn: &Connection) -> Result<LeanClient> {
    let cfg = LeanConfig::load(conn)?;
    LeanClient::new(cfg).context("Failed to build HTTP client")
}

pub fn bank_filter(sub: &clap::ArgMatches) -> Result<BankFilter> {
    let raw = sub
        .get_one::<String>("bank")
        .map(|s| s.as_str())
        .unwrap_or("all");
    raw.parse::<BankFilter>().map_err(|e| anyhow!(e))
}

/// An authenticated client bound to a workspace's existing customer.
pub struct Session {
    pub client: LeanClient,
    pub token: AccessToken,
    pub customer: Customer,
}

pub fn connect(conn: &Connection, sub: &clap::ArgMatches) -> Result<Session> {
    let client = client(conn)?;
    let workspace = workspace_arg(sub, client.config())?;
    open_session(client, &workspace)
}

pub fn open_session(client: LeanClient, workspace: &str) -> Result<Session> {
    let token = client.authenticate(&TokenScope::Api)?;
    let customer = match client.lookup_customer(&token, workspace) {
        CustomerLookup::Found(c) => c,
        CustomerLookup::NotFound => bail!(
            "Workspace '{}' has no Lean customer yet; no banks are connected",
            workspace
        ),
        CustomerLookup::Error(e) => {
            return Err(e).with_context(|| format!("Customer lookup for '{}' failed", workspace));
        }
    };
    Ok(Session {
        client,
        token,
        customer,
    })
}

/// Run the full aggregation for one workspace and bank selection.
pub fn run_pipeline(client: &LeanClient, workspace: &str, filter: &BankFilter) -> Result<PipelineReport> {
    let mut pipeline = Pipeline::new(client);
    let _ = pipeline.run(workspace, filter);
    match pipeline.into_outcome() {
        Some(Ok(report)) => Ok(report),
        Some(Err(e)) => {
            let status = e.http_status();
            Err(e).with_context(|| {
                format!("Aggregation for workspace '{}' failed (status {})", workspace, status)
            })
        }
        None => bail!("Aggregation for workspace '{}' did not finish", workspace),
    }
}
