// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(alias = "id")]
    pub customer_id: String,
    #[serde(default)]
    pub app_user_id: String,
}

/// A connected bank ("entity") for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEntity")]
pub struct Entity {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct BankRef {
    name: Option<String>,
    identifier: Option<String>,
}

#[derive(Deserialize)]
struct RawEntity {
    #[serde(alias = "entity_id")]
    id: String,
    name: Option<String>,
    bank: Option<BankRef>,
    bank_details: Option<BankRef>,
}

impl From<RawEntity> for Entity {
    fn from(raw: RawEntity) -> Self {
        let bank_label = |b: &BankRef| b.name.clone().or_else(|| b.identifier.clone());
        let name = raw
            .bank
            .as_ref()
            .and_then(bank_label)
            .or_else(|| raw.bank_details.as_ref().and_then(bank_label))
            .or(raw.name)
            .unwrap_or_else(|| "Unknown bank".to_string());
        Entity { id: raw.id, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(alias = "id")]
    pub account_id: String,
    #[serde(default)]
    pub entity_id: String,
    #[serde(default, alias = "nickname")]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, alias = "type")]
    pub account_type: Option<String>,
}

impl Account {
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.account_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum CreditDebit {
    Credit,
    Debit,
}

impl FromStr for CreditDebit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREDIT" => Ok(CreditDebit::Credit),
            "DEBIT" => Ok(CreditDebit::Debit),
            other => Err(format!("unknown credit/debit indicator '{}'", other)),
        }
    }
}

impl TryFrom<String> for CreditDebit {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for CreditDebit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditDebit::Credit => write!(f, "CREDIT"),
            CreditDebit::Debit => write!(f, "DEBIT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: Money,
    #[serde(default)]
    pub credit_debit_indicator: Option<CreditDebit>,
    #[serde(default, alias = "type")]
    pub balance_type: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, alias = "id")]
    pub transaction_id: String,
    pub amount: Money,
    pub credit_debit_indicator: CreditDebit,
    #[serde(default)]
    pub booking_date_time: Option<String>,
    #[serde(default, alias = "transaction_information")]
    pub description: Option<String>,
}

impl Transaction {
    /// Booking date, accepting RFC 3339 timestamps or plain `YYYY-MM-DD`.
    pub fn booking_date(&self) -> Option<NaiveDate> {
        let raw = self.booking_date_time.as_deref()?.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.date_naive());
        }
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// A transaction tagged with the account and bank it was fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankTransaction {
    pub account_id: String,
    pub entity_id: String,
    pub bank_name: String,
    #[serde(flatten)]
    pub transaction: Transaction,
}

impl BankTransaction {
    pub fn is_credit(&self) -> bool {
        self.transaction.credit_debit_indicator == CreditDebit::Credit
    }

    pub fn abs_amount(&self) -> Decimal {
        self.transaction.amount.amount.abs()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bank {
    pub id: String,
    pub name: String,
}

impl From<&Entity> for Bank {
    fn from(e: &Entity) -> Self {
        Bank {
            id: e.id.clone(),
            name: e.name.clone(),
        }
    }
}

/// Which connected banks a view covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BankFilter {
    #[default]
    All,
    Entity(String),
}

impl BankFilter {
    pub fn includes(&self, entity_id: &str) -> bool {
        match self {
            BankFilter::All => true,
            BankFilter::Entity(id) => id == entity_id,
        }
    }
}

impl FromStr for BankFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("bank id must not be empty".to_string());
        }
        if s.eq_ignore_ascii_case("all") {
            Ok(BankFilter::All)
        } else {
            Ok(BankFilter::Entity(s.to_string()))
        }
    }
}

impl fmt::Display for BankFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankFilter::All => write!(f, "all"),
            BankFilter::Entity(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_name_prefers_bank_block() {
        let e: Entity = serde_json::from_value(json!({
            "id": "ent-1",
            "bank": { "identifier": "ENBD_UAE", "name": "Emirates NBD" }
        }))
        .unwrap();
        assert_eq!(e.name, "Emirates NBD");

        let e: Entity = serde_json::from_value(json!({
            "id": "ent-2",
            "bank_details": { "identifier": "ADCB_UAE" }
        }))
        .unwrap();
        assert_eq!(e.name, "ADCB_UAE");

        let e: Entity = serde_json::from_value(json!({ "id": "ent-3" })).unwrap();
        assert_eq!(e.name, "Unknown bank");
    }

    #[test]
    fn transaction_parses_lean_shape() {
        let t: Transaction = serde_json::from_value(json!({
            "transaction_id": "tx-1",
            "credit_debit_indicator": "credit",
            "amount": { "amount": "100.50", "currency": "AED" },
            "booking_date_time": "2026-01-15T10:00:00Z",
            "transaction_information": "Salary"
        }))
        .unwrap();
        assert_eq!(t.credit_debit_indicator, CreditDebit::Credit);
        assert_eq!(t.amount.amount, Decimal::new(10050, 2));
        assert_eq!(t.description.as_deref(), Some("Salary"));
        assert_eq!(t.booking_date(), NaiveDate::from_ymd_opt(2026, 1, 15));
    }

    #[test]
    fn unknown_indicator_is_rejected() {
        let r: Result<Transaction, _> = serde_json::from_value(json!({
            "amount": { "amount": 1, "currency": "AED" },
            "credit_debit_indicator": "SIDEWAYS"
        }));
        assert!(r.is_err());
    }

    #[test]
    fn bank_filter_parses_all_and_ids() {
        assert_eq!("all".parse::<BankFilter>().unwrap(), BankFilter::All);
        assert_eq!("ALL".parse::<BankFilter>().unwrap(), BankFilter::All);
        let f: BankFilter = " ent-9 ".parse().unwrap();
        assert_eq!(f, BankFilter::Entity("ent-9".into()));
        assert!(f.includes("ent-9"));
        assert!(!f.includes("ent-1"));
        assert!("".parse::<BankFilter>().is_err());
    }
}
