// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Blocking client for the Lean open-banking API.

pub mod auth;
pub mod envelope;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::LeanConfig;
use crate::error::{LeanError, LeanResult};
use crate::models::{Account, Balance, Customer, Entity, Transaction};
use crate::utils::http_client;

pub use auth::{AccessToken, TokenScope};

/// Outcome of looking a workspace's customer up.
#[derive(Debug)]
pub enum CustomerLookup {
    Found(Customer),
    NotFound,
    Error(LeanError),
}

pub struct LeanClient {
    http: reqwest::blocking::Client,
    config: LeanConfig,
}

impl LeanClient {
    pub fn new(config: LeanConfig) -> LeanResult<Self> {
        let http = http_client(config.timeout_secs)?;
        Ok(LeanClient { http, config })
    }

    pub fn config(&self) -> &LeanConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> LeanResult<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|_| LeanError::InvalidUrl(self.config.api_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| LeanError::InvalidUrl(self.config.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json(
        &self,
        token: &AccessToken,
        url: &Url,
        query: &[(&str, String)],
    ) -> LeanResult<Value> {
        debug!(url = %url, ?query, "GET");
        let resp = self
            .http
            .get(url.clone())
            .bearer_auth(&token.token)
            .header("Accept", "application/json")
            .query(query)
            .send()?;
        read_json(url, resp)
    }

    /// Walk `page=0..` until the envelope's terminal marker, a short page,
    /// or the configured page cap.
    fn fetch_pages<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: &Url,
        key: &str,
        base_query: &[(&str, String)],
    ) -> LeanResult<Vec<T>> {
        let size = self.config.page_size.max(1);
        let max_pages = self.config.max_pages.max(1);
        let mut out = Vec::new();
        let mut page = 0u32;
        loop {
            if page >= max_pages {
                warn!(url = %url, max_pages, "page cap reached; results truncated");
                break;
            }
            let mut query = base_query.to_vec();
            query.push(("page", page.to_string()));
            query.push(("size", size.to_string()));

            let body = self.get_json(token, url, &query)?;
            let items: Vec<T> = envelope::extract_list(&body, key, url.as_str())?;
            let count = items.len();
            out.extend(items);

            let last = match envelope::page_info(&body) {
                Some(info) if info.total_pages.is_some() => info.is_last(page),
                _ => count < size as usize,
            };
            if last || count == 0 {
                break;
            }
            page += 1;
        }
        Ok(out)
    }

    pub fn lookup_customer(&self, token: &AccessToken, workspace_id: &str) -> CustomerLookup {
        let url = match self.endpoint(&["customers", "v1", "app-user-id", workspace_id]) {
            Ok(u) => u,
            Err(e) => return CustomerLookup::Error(e),
        };
        let body = match self.get_json(token, &url, &[]) {
            Ok(b) => b,
            Err(e) if e.is_not_found() => return CustomerLookup::NotFound,
            Err(e) => return CustomerLookup::Error(e),
        };
        if body.is_null() || body.as_object().is_some_and(|o| o.is_empty()) {
            return CustomerLookup::NotFound;
        }
        match envelope::extract_object::<Customer>(&body, url.as_str()) {
            Ok(c) => CustomerLookup::Found(c),
            Err(e) => CustomerLookup::Error(e),
        }
    }

    pub fn create_customer(&self, token: &AccessToken, workspace_id: &str) -> LeanResult<Customer> {
        let url = self.endpoint(&["customers", "v1"])?;
        debug!(url = %url, workspace_id, "POST customer");
        let resp = self
            .http
            .post(url.clone())
            .bearer_auth(&token.token)
            .json(&json!({ "app_user_id": workspace_id }))
            .send()?;
        let body = read_json(&url, resp)?;
        let mut customer: Customer = envelope::extract_object(&body, url.as_str())?;
        if customer.app_user_id.is_empty() {
            customer.app_user_id = workspace_id.to_string();
        }
        Ok(customer)
    }

    /// Lookup, then create only when the lookup says the customer does not
    /// exist. Lookup errors are returned, never papered over with a create.
    pub fn ensure_customer(&self, token: &AccessToken, workspace_id: &str) -> LeanResult<Customer> {
        match self.lookup_customer(token, workspace_id) {
            CustomerLookup::Found(c) => Ok(c),
            CustomerLookup::NotFound => self.create_customer(token, workspace_id),
            CustomerLookup::Error(e) => Err(e),
        }
    }

    pub fn list_entities(&self, token: &AccessToken, customer_id: &str) -> LeanResult<Vec<Entity>> {
        let url = self.endpoint(&["customers", "v1", customer_id, "entities"])?;
        let body = self.get_json(token, &url, &[])?;
        envelope::extract_list(&body, "entities", url.as_str())
    }

    pub fn list_accounts(&self, token: &AccessToken, entity_id: &str) -> LeanResult<Vec<Account>> {
        let url = self.endpoint(&["data", "v2", "accounts"])?;
        let mut accounts: Vec<Account> =
            self.fetch_pages(token, &url, "accounts", &[("entity_id", entity_id.to_string())])?;
        for a in &mut accounts {
            a.entity_id = entity_id.to_string();
        }
        Ok(accounts)
    }

    pub fn list_balances(
        &self,
        token: &AccessToken,
        account_id: &str,
        entity_id: &str,
    ) -> LeanResult<Vec<Balance>> {
        let url = self.endpoint(&["data", "v2", "accounts", account_id, "balances"])?;
        self.fetch_pages(token, &url, "balances", &[("entity_id", entity_id.to_string())])
    }

    pub fn list_transactions(
        &self,
        token: &AccessToken,
        account_id: &str,
        entity_id: &str,
    ) -> LeanResult<Vec<Transaction>> {
        let url = self.endpoint(&["data", "v2", "accounts", account_id, "transactions"])?;
        self.fetch_pages(
            token,
            &url,
            "transactions",
            &[("entity_id", entity_id.to_string())],
        )
    }
}

fn read_json(url: &Url, resp: reqwest::blocking::Response) -> LeanResult<Value> {
    let status = resp.status();
    let text = resp.text()?;
    if !status.is_success() {
        let body = text.chars().take(512).collect::<String>();
        return Err(match status.as_u16() {
            401 | 403 => LeanError::AuthenticationFailed {
                status: status.as_u16(),
                body,
            },
            code => LeanError::Upstream {
                url: url.to_string(),
                status: code,
                body,
            },
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| LeanError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
