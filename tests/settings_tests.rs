// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use muhasaba::{cli, commands::settings, config::LeanConfig, db};
use rusqlite::Connection;
use std::collections::BTreeMap;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["muhasaba", "config"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("config", sub)) => settings::handle(conn, sub),
        _ => panic!("no config subcommand"),
    }
}

#[test]
fn set_then_get_round_trips_through_store() {
    let conn = setup();
    run(&conn, &["set", "workspace", " ws-42 "]).unwrap();
    run(&conn, &["set", "page_size", "20"]).unwrap();
    assert_eq!(db::get_setting(&conn, "workspace").unwrap().as_deref(), Some("ws-42"));

    let stored = db::all_settings(&conn).unwrap();
    let cfg = LeanConfig::from_sources(Some(config::Map::new()), &stored).unwrap();
    assert_eq!(cfg.workspace.as_deref(), Some("ws-42"));
    assert_eq!(cfg.page_size, 20);
}

#[test]
fn invalid_values_are_not_stored() {
    let conn = setup();
    run(&conn, &["set", "page_size", "30"]).unwrap();
    assert!(run(&conn, &["set", "page_size", "lots"]).is_err());
    assert!(run(&conn, &["set", "client_secret", "x"]).is_err());
    assert_eq!(db::get_setting(&conn, "page_size").unwrap().as_deref(), Some("30"));
    assert!(db::get_setting(&conn, "client_secret").unwrap().is_none());
}

#[test]
fn database_file_is_created_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("muhasaba.sqlite");
    let conn = db::open_at(&path).unwrap();
    db::set_setting(&conn, "api_url", "https://example.test").unwrap();
    drop(conn);

    let conn = db::open_at(&path).unwrap();
    let stored: BTreeMap<String, String> = db::all_settings(&conn).unwrap();
    assert_eq!(stored.get("api_url").map(String::as_str), Some("https://example.test"));
}
