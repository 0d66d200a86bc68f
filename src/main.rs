// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use muhasaba::{cli, commands, db};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "muhasaba=debug" } else { "muhasaba=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    init_tracing(matches.get_flag("verbose"));

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("token", sub)) => commands::auth::handle(&conn, sub)?,
        Some(("customer", sub)) => commands::customers::handle(&conn, sub)?,
        Some(("banks", sub)) => commands::banks::handle(&conn, sub)?,
        Some(("accounts", sub)) => commands::accounts::handle(&conn, sub)?,
        Some(("balances", sub)) => commands::accounts::balances(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("summary", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
