//! Tests for Myfxbook response parsing; no live connection needed.

use ratiobook_broker::BrokerError;
use ratiobook_broker::myfxbook::types::{parse_accounts, parse_login};

// ============================================================================
// login.json
// ============================================================================

#[test]
fn login_success() {
    let body = r#"{"error":false,"message":"","session":"DSL07vu14QxHWErTIAFrH40"}"#;
    assert_eq!(parse_login(body).unwrap(), "DSL07vu14QxHWErTIAFrH40");
}

#[test]
fn login_invalid_session_means_bad_credentials() {
    let body = r#"{"error":true,"message":"Invalid session."}"#;
    let err = parse_login(body).unwrap_err();
    assert_eq!(
        err,
        BrokerError::Authentication("login rejected: check email and password".into())
    );
}

#[test]
fn login_other_error_keeps_message() {
    let body = r#"{"error":true,"message":"Account locked."}"#;
    assert_eq!(
        parse_login(body).unwrap_err(),
        BrokerError::Authentication("Account locked.".into())
    );
}

#[test]
fn login_without_session_field() {
    let body = r#"{"error":false,"message":""}"#;
    assert!(matches!(
        parse_login(body).unwrap_err(),
        BrokerError::Authentication(_)
    ));
}

#[test]
fn login_garbage_is_transport() {
    assert!(matches!(
        parse_login("<html>").unwrap_err(),
        BrokerError::Transport(_)
    ));
}

// ============================================================================
// get-my-accounts.json
// ============================================================================

#[test]
fn accounts_success() {
    let body = r#"{
        "error": false,
        "message": "",
        "accounts": [
            {"id": 12345, "name": "Main", "balance": 1500.5, "equity": 1510.0,
             "currency": "USD", "demo": false, "gain": 3.2},
            {"id": 67890, "name": "Demo", "balance": 10000, "demo": true}
        ]
    }"#;
    let accounts = parse_accounts(body).unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].name, "Main");
    assert_eq!(accounts[0].balance, Some(1500.5));
    assert_eq!(accounts[0].currency.as_deref(), Some("USD"));
    assert_eq!(accounts[1].balance, Some(10_000.0));
}

#[test]
fn accounts_missing_balance_is_none() {
    let body = r#"{"error":false,"accounts":[{"name":"Main"}]}"#;
    let accounts = parse_accounts(body).unwrap();
    assert_eq!(accounts[0].balance, None);
}

#[test]
fn accounts_invalid_session() {
    let body = r#"{"error":true,"message":"Invalid session."}"#;
    assert_eq!(parse_accounts(body).unwrap_err(), BrokerError::InvalidSession);
}

#[test]
fn accounts_other_error_is_api() {
    let body = r#"{"error":true,"message":""}"#;
    assert_eq!(
        parse_accounts(body).unwrap_err(),
        BrokerError::Api("unknown error".into())
    );
}

#[test]
fn accounts_empty_list() {
    let body = r#"{"error":false,"message":"","accounts":[]}"#;
    assert!(parse_accounts(body).unwrap().is_empty());
}
