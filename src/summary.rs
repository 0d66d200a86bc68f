// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Profit/loss view over a flattened set of bank transactions.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::HashSet;

use crate::models::{Bank, BankFilter, BankTransaction, CreditDebit};
use crate::utils::fmt_money;

// Spend-estimate weights. These inflate the raw total by bank and volume and
// have no documented business source; keep them isolated until product
// confirms or replaces the model.
const PER_BANK_WEIGHT: Decimal = Decimal::from_parts(1, 0, 0, false, 1); // 0.1
const PER_TRANSACTION_WEIGHT: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01
const MAX_COMPLEXITY: Decimal = Decimal::from_parts(95, 0, 0, false, 2); // 0.95

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTransaction {
    pub id: String,
    pub date: String,
    pub amount: String,
    pub description: String,
    pub bank: String,
    pub direction: CreditDebit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySection {
    pub project_cost: String,
    pub total_spending: String,
    pub percentage: String,
    pub transactions: Vec<DisplayTransaction>,
}

/// A fetch that failed and was left out of the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchWarning {
    pub resource: String,
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub revenues: SummarySection,
    pub expenses: SummarySection,
    /// Emitted as a JSON number; the section totals stay fixed-point strings.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_profit: Decimal,
    pub selected_bank_id: String,
    pub banks: Vec<Bank>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FetchWarning>,
}

impl FinancialSummary {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub fn partition(txs: &[BankTransaction]) -> (Vec<BankTransaction>, Vec<BankTransaction>) {
    txs.iter().cloned().partition(|t| t.is_credit())
}

/// Sum of absolute amounts, saturating at `Decimal::MAX`.
fn total(txs: &[BankTransaction]) -> Decimal {
    txs.iter()
        .map(|t| t.abs_amount())
        .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(a))
        .unwrap_or(Decimal::MAX)
}

fn three_places(d: Decimal) -> String {
    format!(
        "{:.3}",
        d.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
    )
}

pub fn calculate_project_cost(txs: &[BankTransaction]) -> String {
    three_places(total(txs))
}

/// Raw total inflated by `1 + min(banks*0.1 + count*0.01, 0.95)`.
pub fn calculate_total_spending(txs: &[BankTransaction]) -> String {
    if txs.is_empty() {
        return "0.000".to_string();
    }
    let base = total(txs);
    let banks = txs
        .iter()
        .map(|t| t.entity_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let complexity = (Decimal::from(banks) * PER_BANK_WEIGHT
        + Decimal::from(txs.len()) * PER_TRANSACTION_WEIGHT)
        .min(MAX_COMPLEXITY);
    let estimate = base
        .checked_mul(Decimal::ONE + complexity)
        .unwrap_or(Decimal::MAX);
    three_places(estimate)
}

/// Share of the estimate above the raw cost, as a whole percent in `[0, 100]`.
pub fn calculate_percentage(total_spending: &str, project_cost: &str) -> String {
    let (Ok(spend), Ok(cost)) = (
        total_spending.trim().parse::<Decimal>(),
        project_cost.trim().parse::<Decimal>(),
    ) else {
        return "0%".to_string();
    };
    if cost.is_zero() {
        return "0%".to_string();
    }
    // An overflowing ratio is still clamped, by the sign it would have had.
    let rises = (spend > cost) != cost.is_sign_negative();
    let pct = match spend
        .checked_sub(cost)
        .and_then(|d| d.checked_div(cost))
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
    {
        Some(p) => p
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
        None if rises => Decimal::ONE_HUNDRED,
        None => Decimal::ZERO,
    };
    format!("{}%", pct.to_i64().unwrap_or(0))
}

pub fn format_transaction(t: &BankTransaction) -> DisplayTransaction {
    let tx = &t.transaction;
    let date = tx
        .booking_date()
        .map(|d| d.format("%-d %b %Y").to_string())
        .unwrap_or_else(|| "-".to_string());
    DisplayTransaction {
        id: tx.transaction_id.clone(),
        date,
        amount: fmt_money(&t.abs_amount(), &tx.amount.currency),
        description: tx
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "No description".to_string()),
        bank: t.bank_name.clone(),
        direction: tx.credit_debit_indicator,
    }
}

fn section(txs: &[BankTransaction]) -> SummarySection {
    let project_cost = calculate_project_cost(txs);
    let total_spending = calculate_total_spending(txs);
    let percentage = calculate_percentage(&total_spending, &project_cost);
    SummarySection {
        project_cost,
        total_spending,
        percentage,
        transactions: txs.iter().map(format_transaction).collect(),
    }
}

/// Build the revenue/expense view. A specific-bank filter drops
/// transactions from every other entity before anything is summed.
pub fn summarize(txs: &[BankTransaction], banks: &[Bank], filter: &BankFilter) -> FinancialSummary {
    let selected: Vec<BankTransaction> = txs
        .iter()
        .filter(|t| filter.includes(&t.entity_id))
        .cloned()
        .collect();
    let (credits, debits) = partition(&selected);
    let net_profit = total(&credits) - total(&debits);
    FinancialSummary {
        revenues: section(&credits),
        expenses: section(&debits),
        net_profit,
        selected_bank_id: filter.to_string(),
        banks: banks.to_vec(),
        warnings: Vec::new(),
    }
}
