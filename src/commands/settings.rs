// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{LeanConfig, validate_key};
use crate::db::{all_settings, get_setting, set_setting};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap().trim();
            validate_key(key)?;
            // Reject values the loader would choke on later.
            let mut pending = all_settings(conn)?;
            pending.insert(key.to_string(), value.to_string());
            LeanConfig::from_sources(Some(::config::Map::new()), &pending)?;
            set_setting(conn, key, value)?;
            println!("{} = {}", key, value);
        }
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            validate_key(key)?;
            match get_setting(conn, key)? {
                Some(v) => println!("{}", v),
                None => println!("{} is not set", key),
            }
        }
        Some(("list", _)) => {
            let cfg = LeanConfig::load(conn)?;
            let rows = vec![
                vec!["api_url".to_string(), cfg.api_url],
                vec!["auth_url".to_string(), cfg.auth_url],
                vec!["page_size".to_string(), cfg.page_size.to_string()],
                vec!["max_pages".to_string(), cfg.max_pages.to_string()],
                vec!["timeout_secs".to_string(), cfg.timeout_secs.to_string()],
                vec![
                    "workspace".to_string(),
                    cfg.workspace.unwrap_or_else(|| "-".to_string()),
                ],
                vec![
                    "credentials".to_string(),
                    if cfg.client_id.is_some() && cfg.client_secret.is_some() {
                        "set".to_string()
                    } else {
                        "missing".to_string()
                    },
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Effective value"], rows));
        }
        _ => {}
    }
    Ok(())
}
