//! Session lifecycle against the mock brokerage: login, rejection, and the
//! single re-login retry.

use ratiobook_broker::mock::MockBrokerage;
use ratiobook_broker::{BrokerError, BrokerageSession, Credentials, SessionState};

fn creds() -> Option<Credentials> {
    Credentials::new("me@example.com", "secret")
}

// ============================================================================
// Balance lookup
// ============================================================================

#[test]
fn fresh_session_logs_in_then_fetches() {
    let api = MockBrokerage::builder().with_account("Main", 1_500.0).build();
    let mut session = BrokerageSession::new(api, creds(), None);

    let balance = session.fetch_account_balance("Main").unwrap();
    assert_eq!(balance, 1_500.0);
    assert_eq!(session.api().login_calls(), 1);
    assert_eq!(session.api().account_calls(), 1);
    assert_eq!(session.renewed_token(), Some("mock-session-1"));
}

#[test]
fn valid_prior_token_skips_login() {
    let api = MockBrokerage::builder()
        .with_account("Main", 250.0)
        .valid_token("saved")
        .build();
    let mut session = BrokerageSession::new(api, None, Some("saved"));

    assert_eq!(session.fetch_account_balance("Main").unwrap(), 250.0);
    assert_eq!(session.api().login_calls(), 0);
    assert_eq!(session.renewed_token(), None);
    assert_eq!(session.state(), &SessionState::Active("saved".into()));
}

#[test]
fn stale_token_relogs_once() {
    let api = MockBrokerage::builder().with_account("Main", 1_000.0).build();
    let mut session = BrokerageSession::new(api, creds(), Some("stale"));

    let balance = session.fetch_account_balance("Main").unwrap();
    assert_eq!(balance, 1_000.0);
    assert_eq!(session.api().account_calls(), 2);
    assert_eq!(session.api().login_calls(), 1);
    assert_eq!(
        session.api().recorded_tokens(),
        vec!["stale".to_string(), "mock-session-1".to_string()]
    );
    assert_eq!(session.renewed_token(), Some("mock-session-1"));
}

#[test]
fn second_rejection_is_returned() {
    let api = MockBrokerage::builder()
        .with_account("Main", 1_000.0)
        .reject_first_fetches(2)
        .build();
    let mut session = BrokerageSession::new(api, creds(), None);

    let err = session.fetch_account_balance("Main").unwrap_err();
    assert_eq!(err, BrokerError::InvalidSession);
    assert_eq!(session.api().account_calls(), 2);
    assert_eq!(session.state(), &SessionState::Invalid);
}

#[test]
fn stale_token_without_credentials_fails_authentication() {
    let api = MockBrokerage::builder().with_account("Main", 1_000.0).build();
    let mut session = BrokerageSession::new(api, None, Some("stale"));

    let err = session.fetch_account_balance("Main").unwrap_err();
    assert!(matches!(err, BrokerError::Authentication(_)));
    assert_eq!(session.api().account_calls(), 1);
    assert_eq!(session.api().login_calls(), 0);
}

#[test]
fn api_error_is_not_retried() {
    let api = MockBrokerage::builder()
        .valid_token("saved")
        .api_error("Too many requests.")
        .build();
    let mut session = BrokerageSession::new(api, creds(), Some("saved"));

    let err = session.fetch_account_balance("Main").unwrap_err();
    assert_eq!(err, BrokerError::Api("Too many requests.".into()));
    assert_eq!(session.api().account_calls(), 1);
    assert_eq!(session.api().login_calls(), 0);
}

// ============================================================================
// Account selection
// ============================================================================

#[test]
fn unknown_account_lists_available_names() {
    let api = MockBrokerage::builder()
        .with_account("Alpha", 1.0)
        .with_account("Beta", 2.0)
        .build();
    let mut session = BrokerageSession::new(api, creds(), None);

    let err = session.fetch_account_balance("Main").unwrap_err();
    match err {
        BrokerError::AccountNotFound { name, available } => {
            assert_eq!(name, "Main");
            assert_eq!(available, vec!["Alpha".to_string(), "Beta".to_string()]);
        }
        other => panic!("expected AccountNotFound, got {other:?}"),
    }
}

#[test]
fn account_without_balance_is_an_error() {
    let api = MockBrokerage::builder().with_unbalanced_account("Main").build();
    let mut session = BrokerageSession::new(api, creds(), None);

    let err = session.fetch_account_balance("Main").unwrap_err();
    assert!(matches!(err, BrokerError::Api(_)));
}

#[test]
fn rejected_login_stops_before_fetch() {
    let api = MockBrokerage::builder().reject_login().build();
    let mut session = BrokerageSession::new(api, creds(), None);

    let err = session.fetch_account_balance("Main").unwrap_err();
    assert!(matches!(err, BrokerError::Authentication(_)));
    assert_eq!(session.api().account_calls(), 0);
}
