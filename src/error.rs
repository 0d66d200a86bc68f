// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type LeanResult<T> = Result<T, LeanError>;

/// Failures talking to the Lean aggregation API.
#[derive(Debug, Error)]
pub enum LeanError {
    #[error("Missing credentials: set {0}")]
    MissingCredentials(&'static str),

    #[error("Authentication failed ({status}): {body}")]
    AuthenticationFailed { status: u16, body: String },

    #[error("Invalid endpoint URL '{0}'")]
    InvalidUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error ({status}) from {url}: {body}")]
    Upstream {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl LeanError {
    /// Status a proxying caller should surface for this failure.
    pub fn http_status(&self) -> u16 {
        match self {
            LeanError::MissingCredentials(_) | LeanError::InvalidUrl(_) => 500,
            LeanError::AuthenticationFailed { .. } => 401,
            LeanError::NotFound(_) => 404,
            LeanError::Upstream { .. } | LeanError::Transport(_) | LeanError::Decode { .. } => 502,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LeanError::NotFound(_))
            || matches!(self, LeanError::Upstream { status: 404, .. })
    }
}
