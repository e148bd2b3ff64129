//! CLI command implementations: wire the HTTP clients from config into the
//! library and print results.

use log::info;
use ratiobook::wallet::{self, ExtendedPublicKey};
use ratiobook::TargetRatio;
use ratiobook_broker::myfxbook::client::MyfxbookClient;
use ratiobook_broker::{BrokerageSession, Credentials};
use ratiobook_feeds::blockchain_info::client::BlockchainInfoClient;
use ratiobook_feeds::coingecko::client::CoinGeckoClient;
use ratiobook_feeds::BalanceFetcher;

use crate::alert::{self, AlertSink, NtfyClient};
use crate::audit::{self, AuditLog};
use crate::config::{Config, configured};
use crate::error::{Error, Result};
use crate::evaluation::{self, EvaluationSettings};

/// Options for the `run` command.
pub struct RunOptions {
    pub ratio_wallet: Option<f64>,
    pub ratio_brokerage: Option<f64>,
    pub json: bool,
    pub no_alert: bool,
}

fn balance_fetcher(config: &Config) -> Result<BalanceFetcher<BlockchainInfoClient>> {
    let client = BlockchainInfoClient::new(&config.balances.base_url, config.balances_timeout())?;
    Ok(BalanceFetcher::new(client).with_batch_size(config.balances.batch_size))
}

fn rate_client(config: &Config) -> Result<CoinGeckoClient> {
    let client = CoinGeckoClient::new(&config.rates.base_url, config.rates_timeout())?;
    Ok(match config.rates.api_key.as_deref().and_then(configured) {
        Some(key) => client.with_api_key(key),
        None => client,
    })
}

fn brokerage_session(
    config: &Config,
    credentials: Option<Credentials>,
) -> Result<BrokerageSession<MyfxbookClient>> {
    let api = MyfxbookClient::new(&config.brokerage.base_url, config.brokerage_timeout())?;
    Ok(BrokerageSession::new(api, credentials, config.session_token()))
}

fn parse_key(config: &Config) -> Result<ExtendedPublicKey> {
    Ok(config.xpub()?.parse()?)
}

/// Full evaluation: value both sides, compute the rebalance, maybe alert.
/// Returns the process exit code.
pub fn run(config: &Config, opts: &RunOptions) -> Result<i32> {
    let ratio = TargetRatio::or_fallback(
        opts.ratio_wallet,
        opts.ratio_brokerage,
        config.default_ratio(),
    );
    let settings = EvaluationSettings::from_config(config, ratio);

    let fetcher = balance_fetcher(config)?;
    let rates = rate_client(config)?;
    let mut session = brokerage_session(config, config.credentials())?;

    let ntfy = match config.alert() {
        Some(a) if !opts.no_alert => Some(NtfyClient::new(
            &a.server,
            &a.topic,
            alert::DEFAULT_TIMEOUT,
        )?),
        _ => None,
    };
    let sink = ntfy.as_ref().map(|n| n as &dyn AlertSink);

    let mut audit = AuditLog::open(&config.audit_path())?;
    let eval = evaluation::evaluate(&settings, &fetcher, &rates, &mut session, sink, &mut audit)?;

    if opts.json {
        let json = serde_json::to_string_pretty(&eval)
            .map_err(|e| Error::Config(format!("failed to render JSON: {e}")))?;
        println!("{json}");
    } else {
        print!("{eval}");
    }

    info!("Audit logged to {}", config.audit_path().display());
    Ok(eval.exit_code())
}

/// Print derived addresses.
pub fn show_addresses(config: &Config, chain: Option<u32>, limit: Option<u32>) -> Result<i32> {
    let key = parse_key(config)?;
    let limit = limit.unwrap_or(config.wallet.discovery_limit);

    let addresses = match chain {
        Some(c) => wallet::derive(&key, c, limit)?,
        None => wallet::derive_wallet(&key, limit)?,
    };

    println!("{key} ({:?}, {:?})", key.network(), key.address_kind());
    for d in &addresses {
        println!("{}/{:<4} {}", d.chain.selector(), d.index, d.address);
    }
    Ok(0)
}

/// Print the wallet's funded addresses and total. Exit code 2 when some
/// balances could not be fetched.
pub fn show_balance(config: &Config) -> Result<i32> {
    let key = parse_key(config)?;
    let derived = wallet::derive_wallet(&key, config.wallet.discovery_limit)?;
    let addresses: Vec<String> = derived.into_iter().map(|d| d.address).collect();

    let fetcher = balance_fetcher(config)?;
    let balances = fetcher.fetch_balances(&addresses);

    let mut funded: Vec<_> = balances.funded().collect();
    funded.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (address, sats) in &funded {
        println!("{address:<64} {sats}");
    }

    println!(
        "\n{} across {} addresses ({} funded)",
        balances.total(),
        balances.len(),
        funded.len()
    );
    if balances.is_partial() {
        println!(
            "[WARN] {} of {} batches failed, {} anomalies; counted as zero",
            balances.failed_batches,
            addresses.len().div_ceil(fetcher.batch_size()),
            balances.anomalies
        );
        return Ok(2);
    }
    Ok(0)
}

/// Force a brokerage login and print the new session token.
pub fn login(config: &Config) -> Result<i32> {
    let email = configured(&config.brokerage.email)
        .ok_or(Error::ConfigurationMissing("brokerage.email"))?
        .to_string();

    let credentials = match config.credentials() {
        Some(c) => c,
        None => {
            let password = dialoguer::Password::new()
                .with_prompt(format!("Brokerage password for {email}"))
                .interact()
                .map_err(|e| Error::Prompt(e.to_string()))?;
            Credentials::new(&email, &password)
                .ok_or(Error::ConfigurationMissing("brokerage.password"))?
        }
    };

    let mut session = brokerage_session(config, Some(credentials))?;
    let token = session.login()?;

    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_session_renewed(&mut audit)?;

    println!("New brokerage session: {token}");
    println!("Save it as brokerage.session in your config to skip the next login.");
    Ok(0)
}
