// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The serial aggregation waterfall:
//! auth -> customer -> entities -> accounts -> transactions -> summary.
//!
//! Each run walks an explicit state machine. Failures of the stages that
//! everything else depends on (auth, customer, entity list) end the run in
//! `Failed`. Per-account failures only cost that account's data and are
//! reported as warnings on the summary.

use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::QueryCache;
use crate::error::LeanError;
use crate::lean::{AccessToken, CustomerLookup, LeanClient, TokenScope};
use crate::models::{Account, Bank, BankFilter, BankTransaction, Customer, Entity, Transaction};
use crate::summary::{FetchWarning, FinancialSummary, summarize};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("authentication failed: {0}")]
    Authentication(#[source] LeanError),

    #[error("customer lookup failed: {0}")]
    CustomerLookup(#[source] LeanError),

    #[error("could not list connected banks: {0}")]
    Enumeration(#[source] LeanError),

    #[error("bank '{0}' is not connected to this workspace")]
    UnknownBank(String),
}

impl PipelineError {
    pub fn http_status(&self) -> u16 {
        match self {
            PipelineError::Authentication(e)
            | PipelineError::CustomerLookup(e)
            | PipelineError::Enumeration(e) => e.http_status(),
            PipelineError::UnknownBank(_) => 400,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub workspace_id: String,
    /// `None` when the workspace has no customer yet, i.e. no banks connected.
    pub customer: Option<Customer>,
    pub entities: Vec<Entity>,
    pub transactions: Vec<BankTransaction>,
    pub summary: FinancialSummary,
}

#[derive(Debug)]
pub enum PipelineState {
    Idle,
    Authenticating,
    ResolvingCustomer,
    Enumerating,
    Aggregating,
    Ready(Box<PipelineReport>),
    Failed(PipelineError),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Authenticating => "authenticating",
            PipelineState::ResolvingCustomer => "resolving_customer",
            PipelineState::Enumerating => "enumerating",
            PipelineState::Aggregating => "aggregating",
            PipelineState::Ready(_) => "ready",
            PipelineState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fail with `UnknownBank` when the filter names an entity that is not among
/// the connected ones.
pub fn ensure_connected(entities: &[Entity], filter: &BankFilter) -> Result<(), PipelineError> {
    match filter {
        BankFilter::Entity(id) if !entities.iter().any(|e| &e.id == id) => {
            Err(PipelineError::UnknownBank(id.clone()))
        }
        _ => Ok(()),
    }
}

/// Accounts of every entity the filter selects. An entity whose account
/// list fails contributes a warning instead of accounts.
pub fn enumerate_accounts(
    client: &LeanClient,
    token: &AccessToken,
    entities: &[Entity],
    filter: &BankFilter,
    warnings: &mut Vec<FetchWarning>,
) -> Vec<(Entity, Account)> {
    let mut out = Vec::new();
    for entity in entities.iter().filter(|e| filter.includes(&e.id)) {
        match client.list_accounts(token, &entity.id) {
            Ok(accounts) => {
                debug!(entity_id = %entity.id, count = accounts.len(), "accounts listed");
                out.extend(accounts.into_iter().map(|a| (entity.clone(), a)));
            }
            Err(e) => {
                warn!(entity_id = %entity.id, error = %e, "account listing failed; skipping bank");
                warnings.push(FetchWarning {
                    resource: "accounts".to_string(),
                    id: entity.id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    out
}

pub struct Pipeline<'a> {
    client: &'a LeanClient,
    state: PipelineState,
    transactions: QueryCache<Vec<Transaction>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a LeanClient) -> Self {
        Pipeline {
            client,
            state: PipelineState::Idle,
            transactions: QueryCache::new(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Drop memoized transaction lists so the next run refetches them.
    pub fn clear_cache(&mut self) {
        self.transactions.clear();
    }

    /// Consume the pipeline, yielding the outcome of its last run, if any.
    pub fn into_outcome(self) -> Option<Result<PipelineReport, PipelineError>> {
        match self.state {
            PipelineState::Ready(report) => Some(Ok(*report)),
            PipelineState::Failed(e) => Some(Err(e)),
            _ => None,
        }
    }

    fn transition(&mut self, next: PipelineState) {
        info!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
    }

    pub fn run(
        &mut self,
        workspace_id: &str,
        filter: &BankFilter,
    ) -> Result<&PipelineReport, &PipelineError> {
        let next = match self.execute(workspace_id, filter) {
            Ok(report) => PipelineState::Ready(Box::new(report)),
            Err(e) => PipelineState::Failed(e),
        };
        self.transition(next);
        match &self.state {
            PipelineState::Ready(report) => Ok(&**report),
            PipelineState::Failed(e) => Err(e),
            _ => unreachable!("run always ends in a terminal state"),
        }
    }

    fn execute(
        &mut self,
        workspace_id: &str,
        filter: &BankFilter,
    ) -> Result<PipelineReport, PipelineError> {
        self.transition(PipelineState::Authenticating);
        let token = self
            .client
            .authenticate(&TokenScope::Api)
            .map_err(PipelineError::Authentication)?;

        self.transition(PipelineState::ResolvingCustomer);
        let customer = match self.client.lookup_customer(&token, workspace_id) {
            CustomerLookup::Found(c) => c,
            CustomerLookup::NotFound => {
                info!(workspace_id, "no customer for workspace; nothing connected");
                ensure_connected(&[], filter)?;
                return Ok(PipelineReport {
                    workspace_id: workspace_id.to_string(),
                    customer: None,
                    entities: Vec::new(),
                    transactions: Vec::new(),
                    summary: summarize(&[], &[], filter),
                });
            }
            CustomerLookup::Error(e) => return Err(PipelineError::CustomerLookup(e)),
        };

        self.transition(PipelineState::Enumerating);
        let entities = self
            .client
            .list_entities(&token, &customer.customer_id)
            .map_err(PipelineError::Enumeration)?;
        ensure_connected(&entities, filter)?;

        let client = self.client;
        let mut warnings = Vec::new();
        let pairs = enumerate_accounts(client, &token, &entities, filter, &mut warnings);
        let mut transactions = Vec::new();
        for (entity, account) in &pairs {
            let key = format!("{}:{}", entity.id, account.account_id);
            let fetched = self.transactions.get_or_try_insert_with(&key, || {
                client.list_transactions(&token, &account.account_id, &entity.id)
            });
            match fetched {
                Ok(list) => {
                    transactions.extend(list.into_iter().map(|t| BankTransaction {
                        account_id: account.account_id.clone(),
                        entity_id: entity.id.clone(),
                        bank_name: entity.name.clone(),
                        transaction: t,
                    }));
                }
                Err(e) => {
                    warn!(account_id = %account.account_id, error = %e, "transaction fetch failed; account skipped");
                    warnings.push(FetchWarning {
                        resource: "transactions".to_string(),
                        id: account.account_id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.transition(PipelineState::Aggregating);
        let banks: Vec<Bank> = entities.iter().map(Bank::from).collect();
        let mut summary = summarize(&transactions, &banks, filter);
        summary.warnings = warnings;
        Ok(PipelineReport {
            workspace_id: workspace_id.to_string(),
            customer: Some(customer),
            entities,
            transactions,
            summary,
        })
    }
}
