//! Config file loading from disk.

use std::io::Write;

use ratiobook::TargetRatio;
use ratiobook_rebalancer::config::Config;
use ratiobook_rebalancer::error::Error;
use ratiobook_rebalancer::evaluation::EvaluationSettings;

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[wallet]
xpub = "zpub-example"

[brokerage]
session = "saved-token"
account_name = "Main"

[alert]
topic = "portfolio"
threshold = 1.5
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.xpub().unwrap(), "zpub-example");
    assert_eq!(config.session_token(), Some("saved-token"));

    let settings = EvaluationSettings::from_config(&config, TargetRatio::DEFAULT);
    assert!(settings.has_brokerage_access);
    assert_eq!(settings.alert_threshold, Some(1.5));
    assert_eq!(settings.discovery_limit, 20);
}

#[test]
fn missing_file_is_config_read_error() {
    let err = Config::load(std::path::Path::new("/nonexistent/ratiobook.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigRead { .. }));
}

#[test]
fn bad_toml_is_parse_error() {
    let err = Config::parse("[wallet\nxpub = 1").unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
}

#[test]
fn without_credentials_or_session_there_is_no_access() {
    let config = Config::parse("[brokerage]\naccount_name = \"Main\"\n").unwrap();
    let settings = EvaluationSettings::from_config(&config, TargetRatio::DEFAULT);
    assert!(!settings.has_brokerage_access);
    assert_eq!(settings.account_name.as_deref(), Some("Main"));
}
