//! Shared fixtures for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::ResponseTemplate;

use cert_connectors::config::HttpConfig;
use cert_connectors::connectors::HttpClient;

pub const TXID: &str = "8623beadbc7877a9e20fb7f83eda6c1a1fc350171f0714ff6c6c4054018eb54d";

/// Client with a short timeout so unreachable hosts fail fast.
pub fn http_client() -> HttpClient {
    HttpClient::new(&HttpConfig {
        timeout_secs: 2,
        ..HttpConfig::default()
    })
    .unwrap()
}

/// 200 response carrying `body` as JSON.
pub fn json_body(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// A base URL nothing listens on.
pub fn unreachable_base() -> String {
    "http://127.0.0.1:9".to_string()
}

pub fn blockchain_info_tx() -> Value {
    json!({
        "hash": TXID,
        "time": 1_498_747_983,
        "inputs": [
            { "prev_out": { "addr": "1AwdUWQzJgfDDjeKtpPzMfYMHejFBrxZfo", "value": 3_000_000 } }
        ],
        "out": [
            { "value": 2750, "addr": "1Revoked", "spent": true, "script": "76a914" },
            { "value": 0, "script": "6a20c9ffd3c1e2b4d9f0a1" }
        ]
    })
}

pub fn blockcypher_tx() -> Value {
    json!({
        "hash": TXID,
        "received": "2017-06-29T14:48:03Z",
        "confirmed": "2017-06-29T14:53:03Z",
        "inputs": [{ "addresses": ["1AwdUWQzJgfDDjeKtpPzMfYMHejFBrxZfo"] }],
        "outputs": [
            { "value": 2750, "addresses": ["1Revoked"], "spent_by": "f00d" },
            { "value": 0, "data_hex": "c9ffd3c1e2b4d9f0a1" }
        ]
    })
}

pub fn etherscan_tx(block_number: Option<&str>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "from": "0x3d995ef85a8d1bcbed78182ab225b9f88dc8937c",
            "input": "0xc9ffd3c1e2b4d9f0a1",
            "blockNumber": block_number
        }
    })
}

pub fn block_reward(timestamp: &str) -> Value {
    json!({
        "status": "1",
        "message": "OK",
        "result": { "blockNumber": "436", "timeStamp": timestamp }
    })
}

pub fn current_profile() -> Value {
    json!({
        "@context": ["https://w3id.org/openbadges/v2", "https://w3id.org/blockcerts/v2"],
        "type": "Profile",
        "name": "Test Issuer",
        "publicKey": [
            {
                "id": "ecdsa-koblitz-pubkey:1AwdUWQzJgfDDjeKtpPzMfYMHejFBrxZfo",
                "created": "2017-06-29T14:48:03.814+00:00"
            }
        ]
    })
}

pub fn v1_profile() -> Value {
    json!({
        "name": "Legacy Issuer",
        "issuerKeys": [{ "date": "2016-05-01", "key": "1Legacy" }],
        "revocationKeys": [{ "date": "2016-05-01", "key": "1LegacyRevocation" }]
    })
}

pub fn revocation_list() -> Value {
    json!({
        "@context": "https://w3id.org/openbadges/v2",
        "type": "RevocationList",
        "revokedAssertions": [
            {
                "id": "urn:uuid:93019408-acd8-4420-be5e-0400d643954a",
                "revocationReason": "Honor code violation"
            },
            { "revocationReason": "entry without id" }
        ]
    })
}

/// Certificate document whose issuer points at `revocation_list_url`.
pub fn certificate_with_revocation_list(revocation_list_url: &str) -> Value {
    json!({
        "@context": ["https://w3id.org/openbadges/v2", "https://w3id.org/blockcerts/v2"],
        "type": "Assertion",
        "badge": {
            "issuer": {
                "id": "https://example.org/issuer.json",
                "revocationList": revocation_list_url
            }
        }
    })
}
