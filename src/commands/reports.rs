// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::summary::FinancialSummary;
use crate::utils::{maybe_print_json, pretty_table, workspace_arg};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let client = super::client(conn)?;
    let workspace = workspace_arg(sub, client.config())?;
    let filter = super::bank_filter(sub)?;
    let report = super::run_pipeline(&client, &workspace, &filter)?;

    if report.customer.is_none() {
        eprintln!("Workspace '{}' has no banks connected.", workspace);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report.summary)? {
        print_summary(&report.summary);
    }
    Ok(())
}

pub fn summary_rows(s: &FinancialSummary) -> Vec<Vec<String>> {
    vec![
        vec![
            "Revenues".to_string(),
            s.revenues.transactions.len().to_string(),
            s.revenues.project_cost.clone(),
            s.revenues.total_spending.clone(),
            s.revenues.percentage.clone(),
        ],
        vec![
            "Expenses".to_string(),
            s.expenses.transactions.len().to_string(),
            s.expenses.project_cost.clone(),
            s.expenses.total_spending.clone(),
            s.expenses.percentage.clone(),
        ],
    ]
}

fn print_summary(s: &FinancialSummary) {
    println!(
        "{}",
        pretty_table(
            &["View", "Count", "Project Cost", "Est. Total Spending", "Uplift"],
            summary_rows(s),
        )
    );
    let bank_label = s
        .banks
        .iter()
        .find(|b| b.id == s.selected_bank_id)
        .map(|b| b.name.as_str())
        .unwrap_or("All banks");
    println!("Bank: {}  Net profit: {:.3}", bank_label, s.net_profit);
    if !s.is_complete() {
        eprintln!(
            "warning: {} fetch(es) failed; totals are incomplete",
            s.warnings.len()
        );
        for w in &s.warnings {
            eprintln!("  {} {}: {}", w.resource, w.id, w.message);
        }
    }
}
