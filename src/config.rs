// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use ::config::{Config as Cfg, ConfigError, Environment, Map, Source, Value};
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{LeanError, LeanResult};

pub const DEFAULT_API_URL: &str = "https://sandbox.leantech.me";
pub const DEFAULT_AUTH_URL: &str = "https://auth.sandbox.leantech.me";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_MAX_PAGES: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const ENV_CLIENT_ID: &str = "LEAN_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "LEAN_CLIENT_SECRET";

/// Settings that may be stored with `config set`. Each is overridden by
/// `LEAN_<KEY>` in the environment, except `workspace` (`MUHASABA_WORKSPACE`).
pub const SETTING_KEYS: &[&str] = &[
    "api_url",
    "auth_url",
    "page_size",
    "max_pages",
    "timeout_secs",
    "workspace",
];

#[derive(Debug, Clone, Deserialize)]
pub struct LeanConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub api_url: String,
    pub auth_url: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub timeout_secs: u64,
    #[serde(default)]
    pub workspace: Option<String>,
}

impl Default for LeanConfig {
    fn default() -> Self {
        LeanConfig {
            client_id: None,
            client_secret: None,
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            workspace: None,
        }
    }
}

pub fn validate_key(key: &str) -> Result<()> {
    if SETTING_KEYS.contains(&key) {
        return Ok(());
    }
    bail!("Unknown setting '{}' (known: {})", key, SETTING_KEYS.join(", "))
}

/// Rows of the `settings` table as a configuration layer.
#[derive(Debug, Clone)]
struct StoredSettings(BTreeMap<String, String>);

impl Source for StoredSettings {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let origin = "settings table".to_string();
        Ok(self
            .0
            .iter()
            .filter(|(k, v)| SETTING_KEYS.contains(&k.as_str()) && !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), Value::new(Some(&origin), v.trim())))
            .collect())
    }
}

fn trimmed(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl LeanConfig {
    /// Environment first, then the settings table, then built-in defaults.
    pub fn load(conn: &Connection) -> Result<Self> {
        let stored = crate::db::all_settings(conn)?;
        Self::from_sources(None, &stored)
    }

    /// Layer `env` (the process environment when `None`) over `stored` over
    /// the defaults.
    pub fn from_sources(
        env: Option<Map<String, String>>,
        stored: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let settings = Cfg::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("auth_url", DEFAULT_AUTH_URL)?
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE))?
            .set_default("max_pages", i64::from(DEFAULT_MAX_PAGES))?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .add_source(StoredSettings(stored.clone()))
            .add_source(
                Environment::with_prefix("LEAN")
                    .ignore_empty(true)
                    .source(env.clone()),
            )
            .add_source(
                Environment::with_prefix("MUHASABA")
                    .ignore_empty(true)
                    .source(env),
            )
            .build()
            .context("Failed to assemble configuration")?;

        let mut cfg: LeanConfig = settings
            .try_deserialize()
            .context("Invalid configuration value")?;
        cfg.client_id = trimmed(cfg.client_id);
        cfg.client_secret = trimmed(cfg.client_secret);
        cfg.workspace = trimmed(cfg.workspace);
        cfg.api_url = cfg.api_url.trim().trim_end_matches('/').to_string();
        cfg.auth_url = cfg.auth_url.trim().trim_end_matches('/').to_string();
        if cfg.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Ok(cfg)
    }

    pub fn credentials(&self) -> LeanResult<(&str, &str)> {
        let id = self
            .client_id
            .as_deref()
            .ok_or(LeanError::MissingCredentials(ENV_CLIENT_ID))?;
        let secret = self
            .client_secret
            .as_deref()
            .ok_or(LeanError::MissingCredentials(ENV_CLIENT_SECRET))?;
        Ok((id, secret))
    }
}
