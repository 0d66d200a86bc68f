// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::*;
use httpmock::prelude::*;
use muhasaba::commands::{accounts, open_session};
use muhasaba::models::BankFilter;
use muhasaba::pipeline::PipelineError;
use serde_json::json;

#[test]
fn accounts_listed_per_connected_bank() {
    let server = MockServer::start();
    two_bank_workspace(&server);

    let session = open_session(client(&server), "ws-1").unwrap();
    let (rows, warnings) = accounts::account_rows(&session, &BankFilter::All).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].bank, "Emirates NBD");
    assert_eq!(rows[1].name, "Business");
}

#[test]
fn balance_failure_for_one_account_keeps_the_others() {
    let server = MockServer::start();
    two_bank_workspace(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/data/v2/accounts/a1/balances")
            .query_param("entity_id", "e1");
        then.status(200).json_body(json!({
            "data": { "balances": [{
                "amount": { "amount": "2500.5", "currency": "AED" },
                "type": "ClosingAvailable",
                "date_time": "2026-02-01T00:00:00Z"
            }]}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/data/v2/accounts/a2/balances");
        then.status(502).body("bank offline");
    });

    let session = open_session(client(&server), "ws-1").unwrap();
    let (rows, warnings) = accounts::balance_rows(&session, &BankFilter::All).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].account_id, "a1");
    assert_eq!(rows[0].amount, "2500.50 AED");
    assert_eq!(rows[0].balance_type, "ClosingAvailable");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].resource, "balances");
    assert_eq!(warnings[0].id, "a2");
}

#[test]
fn unconnected_bank_is_rejected_not_listed_empty() {
    let server = MockServer::start();
    two_bank_workspace(&server);
    let balances = server.mock(|when, then| {
        when.method(GET).path_contains("/balances");
        then.status(200).json_body(json!([]));
    });

    let session = open_session(client(&server), "ws-1").unwrap();
    let filter = BankFilter::Entity("e9".into());
    for err in [
        accounts::account_rows(&session, &filter).unwrap_err(),
        accounts::balance_rows(&session, &filter).unwrap_err(),
    ] {
        let pipeline_err = err.downcast_ref::<PipelineError>().unwrap();
        assert!(matches!(pipeline_err, PipelineError::UnknownBank(id) if id == "e9"));
        assert_eq!(pipeline_err.http_status(), 400);
    }
    assert_eq!(balances.hits(), 0);
}
