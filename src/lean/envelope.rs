// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Lean wraps list payloads inconsistently between endpoints and API
//! versions. These helpers dig the list and paging info out of whichever
//! envelope came back.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{LeanError, LeanResult};

/// Locate the array stored under `key`, trying each known envelope shape.
pub fn find_list<'a>(body: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    body.as_array()
        .or_else(|| body[key].as_array())
        .or_else(|| body["data"].as_array())
        .or_else(|| body["data"][key].as_array())
        .or_else(|| body["payload"][key].as_array())
        .or_else(|| body["payload"].as_array())
        .or_else(|| body["results"].as_array())
}

/// Deserialize the list under `key`. A body with no recognizable list is an
/// empty page, not an error.
pub fn extract_list<T: DeserializeOwned>(body: &Value, key: &str, url: &str) -> LeanResult<Vec<T>> {
    let Some(items) = find_list(body, key) else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone()).map_err(|e| LeanError::Decode {
                url: url.to_string(),
                reason: format!("bad {} entry: {}", key, e),
            })
        })
        .collect()
}

/// Deserialize a single object that may sit under `data` or at the top level.
pub fn extract_object<T: DeserializeOwned>(body: &Value, url: &str) -> LeanResult<T> {
    let inner = if body["data"].is_object() { &body["data"] } else { body };
    serde_json::from_value(inner.clone()).map_err(|e| LeanError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub number: Option<u32>,
    pub total_pages: Option<u32>,
}

impl PageInfo {
    /// Whether `page` (zero-based, as requested) is the final one.
    pub fn is_last(&self, page: u32) -> bool {
        matches!(self.total_pages, Some(total) if page.saturating_add(1) >= total)
    }
}

fn as_u32(v: &Value) -> Option<u32> {
    v.as_u64().and_then(|n| u32::try_from(n).ok())
}

pub fn page_info(body: &Value) -> Option<PageInfo> {
    let page = if body["page"].is_object() {
        &body["page"]
    } else if body["data"]["page"].is_object() {
        &body["data"]["page"]
    } else {
        return None;
    };
    Some(PageInfo {
        number: as_u32(&page["number"]),
        total_pages: as_u32(&page["total_pages"]).or_else(|| as_u32(&page["totalPages"])),
    })
}
