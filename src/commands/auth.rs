// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::lean::TokenScope;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let client = super::client(conn)?;
    let scope = match sub.get_one::<String>("customer") {
        Some(id) => TokenScope::Customer(id.trim().to_string()),
        None => TokenScope::Api,
    };
    let token = client.authenticate(&scope)?;
    let mut rows = vec![
        vec!["scope".to_string(), token.scope.clone()],
        vec!["expires_in".to_string(), format!("{}s", token.expires_in)],
        vec!["expires_at".to_string(), token.expires_at().to_rfc3339()],
    ];
    if sub.get_flag("show") {
        rows.push(vec!["token".to_string(), token.token.clone()]);
    }
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}
