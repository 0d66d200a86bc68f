// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Bank;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let session = super::connect(conn, sub)?;
    let entities = session
        .client
        .list_entities(&session.token, &session.customer.customer_id)?;
    let banks: Vec<Bank> = entities.iter().map(Bank::from).collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &banks)? {
        let rows = banks.into_iter().map(|b| vec![b.id, b.name]).collect();
        println!("{}", pretty_table(&["Bank ID", "Name"], rows));
    }
    Ok(())
}
