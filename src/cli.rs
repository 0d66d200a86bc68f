// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn workspace_arg() -> Arg {
    Arg::new("workspace")
        .long("workspace")
        .short('w')
        .help("Workspace id (defaults to the `workspace` setting)")
}

fn bank_arg() -> Arg {
    Arg::new("bank")
        .long("bank")
        .short('b')
        .default_value("all")
        .help("Connected bank (entity) id, or `all`")
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("muhasaba")
        .version(clap::crate_version!())
        .about("Bank aggregation and profit/loss summaries over the Lean open-banking API")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log requests and pipeline transitions to stderr"),
        )
        .subcommand(
            Command::new("token")
                .about("Request an access token and show its scope and expiry")
                .arg(
                    Arg::new("customer")
                        .long("customer")
                        .help("Request a customer-scoped token (scope customer.<id>)"),
                )
                .arg(
                    Arg::new("show")
                        .long("show")
                        .action(ArgAction::SetTrue)
                        .help("Also print the bearer token itself"),
                ),
        )
        .subcommand(
            Command::new("customer")
                .about("Look up or create the customer record for a workspace")
                .subcommand(
                    Command::new("get")
                        .arg(workspace_arg())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("create")
                        .arg(workspace_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("banks")
                .about("List connected banks")
                .arg(workspace_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("accounts")
                .about("List accounts of connected banks")
                .arg(workspace_arg())
                .arg(bank_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("balances")
                .about("List account balances")
                .arg(workspace_arg())
                .arg(bank_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("tx").about("Transactions").subcommand(
                Command::new("list")
                    .arg(workspace_arg())
                    .arg(bank_arg())
                    .arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    )
                    .args(json_args()),
            ),
        )
        .subcommand(
            Command::new("summary")
                .about("Revenue, expense and net profit across connected banks")
                .arg(workspace_arg())
                .arg(bank_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .arg(workspace_arg())
                    .arg(bank_arg())
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .value_parser(["csv", "json"])
                            .default_value("csv"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage stored settings")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(Command::new("list")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn bank_defaults_to_all() {
        let m = build_cli().get_matches_from(["muhasaba", "summary", "-w", "ws-1"]);
        let (_, sub) = m.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("bank").unwrap(), "all");
        assert_eq!(sub.get_one::<String>("workspace").unwrap(), "ws-1");
    }
}
