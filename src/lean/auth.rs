// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::LeanClient;
use crate::error::{LeanError, LeanResult};

/// Tokens without an `expires_in` are assumed to live just under an hour.
pub const DEFAULT_EXPIRES_IN: u64 = 3599;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenScope {
    Api,
    Customer(String),
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenScope::Api => write!(f, "api"),
            TokenScope::Customer(id) => write!(f, "customer.{}", id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    #[serde(skip_serializing)]
    pub token: String,
    pub scope: String,
    pub expires_in: u64,
    pub issued_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.expires_in as i64)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

impl LeanClient {
    /// Client-credentials grant against `{auth_url}/oauth2/token`.
    /// Failures are terminal: no retry and no refresh.
    pub fn authenticate(&self, scope: &TokenScope) -> LeanResult<AccessToken> {
        let (client_id, client_secret) = self.config.credentials()?;
        let url = format!("{}/oauth2/token", self.config.auth_url);
        let scope_str = scope.to_string();
        debug!(%url, scope = %scope_str, "requesting access token");

        let resp = self
            .http
            .post(&url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
                ("scope", scope_str.as_str()),
            ])
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "token request rejected");
            return Err(LeanError::AuthenticationFailed {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&text).map_err(|e| LeanError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LeanError::AuthenticationFailed {
                status: status.as_u16(),
                body: format!("response missing access_token: {}", text),
            })?;

        Ok(AccessToken {
            token,
            scope: scope_str,
            expires_in: parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
            issued_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeanConfig;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer, with_creds: bool) -> LeanClient {
        let mut cfg = LeanConfig {
            api_url: server.base_url(),
            auth_url: server.base_url(),
            ..LeanConfig::default()
        };
        if with_creds {
            cfg.client_id = Some("cid".into());
            cfg.client_secret = Some("csec".into());
        }
        LeanClient::new(cfg).unwrap()
    }

    #[test]
    fn scope_renders_api_and_customer() {
        assert_eq!(TokenScope::Api.to_string(), "api");
        assert_eq!(TokenScope::Customer("c-1".into()).to_string(), "customer.c-1");
    }

    #[test]
    fn token_defaults_expiry_when_absent() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth2/token")
                .body_contains("grant_type=client_credentials")
                .body_contains("scope=api");
            then.status(200)
                .json_body(serde_json::json!({ "access_token": "tok", "token_type": "bearer" }));
        });

        let tok = client_for(&server, true).authenticate(&TokenScope::Api).unwrap();
        m.assert();
        assert_eq!(tok.token, "tok");
        assert_eq!(tok.expires_in, DEFAULT_EXPIRES_IN);
        assert_eq!(tok.scope, "api");
    }

    #[test]
    fn customer_scope_is_sent() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth2/token")
                .body_contains("scope=customer.c-42");
            then.status(200)
                .json_body(serde_json::json!({ "access_token": "ctok", "expires_in": 600 }));
        });

        let tok = client_for(&server, true)
            .authenticate(&TokenScope::Customer("c-42".into()))
            .unwrap();
        m.assert();
        assert_eq!(tok.expires_in, 600);
        assert_eq!(tok.expires_at() - tok.issued_at, Duration::seconds(600));
    }

    #[test]
    fn rejected_credentials_carry_upstream_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(401).body(r#"{"error":"invalid_client"}"#);
        });

        let err = client_for(&server, true)
            .authenticate(&TokenScope::Api)
            .unwrap_err();
        match err {
            LeanError::AuthenticationFailed { status, ref body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_client"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_credentials_never_hit_the_network() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(200);
        });

        let err = client_for(&server, false)
            .authenticate(&TokenScope::Api)
            .unwrap_err();
        assert!(matches!(err, LeanError::MissingCredentials(_)));
        assert_eq!(m.hits(), 0);
    }
}
