// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use httpmock::prelude::*;
use httpmock::Mock;
use muhasaba::config::LeanConfig;
use muhasaba::lean::LeanClient;
use serde_json::{Value, json};

pub fn client(server: &MockServer) -> LeanClient {
    LeanClient::new(LeanConfig {
        client_id: Some("cid".into()),
        client_secret: Some("csec".into()),
        api_url: server.base_url(),
        auth_url: server.base_url(),
        ..LeanConfig::default()
    })
    .unwrap()
}

pub fn tx(id: &str, dir: &str, amount: &str, date: &str) -> Value {
    json!({
        "transaction_id": id,
        "credit_debit_indicator": dir,
        "amount": { "amount": amount, "currency": "AED" },
        "booking_date_time": format!("{}T08:00:00Z", date),
        "transaction_information": format!("payment {}", id)
    })
}

pub fn mock_token(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200)
            .json_body(json!({ "access_token": "tok", "expires_in": 3599 }));
    })
}

pub fn mock_customer<'a>(server: &'a MockServer, workspace: &str, customer_id: &str) -> Mock<'a> {
    let path = format!("/customers/v1/app-user-id/{}", workspace);
    let body = json!({ "customer_id": customer_id, "app_user_id": workspace });
    server.mock(move |when, then| {
        when.method(GET).path(path);
        then.status(200).json_body(body);
    })
}

pub fn mock_entities<'a>(server: &'a MockServer, customer_id: &str, entities: Value) -> Mock<'a> {
    let path = format!("/customers/v1/{}/entities", customer_id);
    server.mock(move |when, then| {
        when.method(GET).path(path);
        then.status(200).json_body(entities);
    })
}

pub fn mock_accounts<'a>(server: &'a MockServer, entity_id: &str, accounts: Value) -> Mock<'a> {
    let entity_id = entity_id.to_string();
    server.mock(move |when, then| {
        when.method(GET)
            .path("/data/v2/accounts")
            .query_param("entity_id", entity_id);
        then.status(200)
            .json_body(json!({ "status": "OK", "data": { "accounts": accounts } }));
    })
}

pub fn mock_transactions<'a>(server: &'a MockServer, account_id: &str, txs: Value) -> Mock<'a> {
    let path = format!("/data/v2/accounts/{}/transactions", account_id);
    server.mock(move |when, then| {
        when.method(GET).path(path).query_param("page", "0");
        then.status(200)
            .json_body(json!({ "status": "OK", "data": { "transactions": txs } }));
    })
}

/// Two banks: `e1` with account `a1`, `e2` with account `a2`.
pub fn two_bank_workspace(server: &MockServer) {
    mock_token(server);
    mock_customer(server, "ws-1", "c-1");
    mock_entities(
        server,
        "c-1",
        json!([
            { "id": "e1", "bank": { "name": "Emirates NBD" } },
            { "id": "e2", "bank": { "name": "ADCB" } }
        ]),
    );
    mock_accounts(server, "e1", json!([{ "account_id": "a1", "name": "Current" }]));
    mock_accounts(server, "e2", json!([{ "account_id": "a2", "name": "Business" }]));
}
