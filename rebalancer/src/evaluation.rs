//! Evaluation orchestrator: wallet value, brokerage balance, rebalance,
//! alert.
//!
//! The two sides are fetched independently. A failure on one side is
//! recorded on the result and does not stop the other; the rebalance and
//! the alert check only run when both sides produced a value.

use std::fmt;

use log::{error, info};
use ratiobook::{ExtendedPublicKey, RebalanceResult, RebalanceStatus, TargetRatio, rebalance};
use ratiobook_broker::{BrokerageApi, BrokerageSession};
use ratiobook_feeds::{BalanceFetcher, BalanceLookup, RateProvider};
use serde::Serialize;

use crate::alert::{self, AlertOutcome, AlertSink};
use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::valuation::{self, RateSettings, WalletValuation};

/// Everything an evaluation needs besides its data sources.
#[derive(Debug, Clone)]
pub struct EvaluationSettings {
    pub xpub: Option<String>,
    pub discovery_limit: u32,
    pub rates: RateSettings,
    pub account_name: Option<String>,
    /// Whether a login is possible or a saved session exists.
    pub has_brokerage_access: bool,
    pub ratio: TargetRatio,
    pub alert_threshold: Option<f64>,
}

impl EvaluationSettings {
    pub fn from_config(config: &Config, ratio: TargetRatio) -> Self {
        Self {
            xpub: config.xpub().ok().map(str::to_string),
            discovery_limit: config.wallet.discovery_limit,
            rates: RateSettings {
                asset_id: config.rates.asset_id.clone(),
                quote_asset_id: config.rates.quote_asset_id.clone(),
                reference_currency: config.rates.reference_currency.clone(),
            },
            account_name: config.account_name().ok().map(str::to_string),
            has_brokerage_access: config.credentials().is_some()
                || config.session_token().is_some(),
            ratio,
            alert_threshold: config.alert().map(|a| a.threshold),
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub ratio: TargetRatio,
    pub quote_asset: String,
    pub wallet: Option<WalletValuation>,
    pub wallet_error: Option<String>,
    pub account_name: Option<String>,
    pub brokerage_balance: Option<f64>,
    pub brokerage_error: Option<String>,
    pub rebalance: Option<RebalanceResult>,
    pub alert: Option<AlertOutcome>,
    /// Token from a login during this evaluation, for the user to save.
    pub renewed_session: Option<String>,
}

impl Evaluation {
    /// Both sides produced a value.
    pub fn is_complete(&self) -> bool {
        self.wallet.is_some() && self.brokerage_balance.is_some()
    }

    /// Neither side produced a value.
    pub fn is_failed(&self) -> bool {
        self.wallet.is_none() && self.brokerage_balance.is_none()
    }

    /// Process exit code: 0 complete, 2 one side failed, 1 both failed.
    pub fn exit_code(&self) -> i32 {
        if self.is_complete() {
            0
        } else if self.is_failed() {
            1
        } else {
            2
        }
    }
}

/// Run one evaluation.
///
/// Only audit write failures are returned as errors; everything else lands
/// on the [`Evaluation`].
pub fn evaluate<L, R, A>(
    settings: &EvaluationSettings,
    fetcher: &BalanceFetcher<L>,
    rates: &R,
    session: &mut BrokerageSession<A>,
    alerts: Option<&dyn AlertSink>,
    audit: &mut AuditLog,
) -> Result<Evaluation>
where
    L: BalanceLookup,
    R: RateProvider,
    A: BrokerageApi,
{
    audit::log_evaluation_started(audit, settings.ratio, settings.account_name.as_deref())?;

    let mut eval = Evaluation {
        ratio: settings.ratio,
        quote_asset: settings.rates.quote_asset_id.clone(),
        wallet: None,
        wallet_error: None,
        account_name: settings.account_name.clone(),
        brokerage_balance: None,
        brokerage_error: None,
        rebalance: None,
        alert: None,
        renewed_session: None,
    };

    // 1. Wallet side
    match value_wallet(settings, fetcher, rates) {
        Ok(valuation) => {
            audit::log_wallet_valued(audit, &valuation)?;
            eval.wallet = Some(valuation);
        }
        Err(e) => {
            error!("Wallet valuation failed: {e}");
            audit::log_evaluation_failed(audit, "wallet", &e.to_string())?;
            eval.wallet_error = Some(e.to_string());
        }
    }

    // 2. Brokerage side
    match fetch_brokerage(settings, session) {
        Ok((account, balance)) => {
            audit::log_brokerage_fetched(audit, account, balance)?;
            eval.brokerage_balance = Some(balance);
        }
        Err(e) => {
            error!("Brokerage balance failed: {e}");
            audit::log_evaluation_failed(audit, "brokerage", &e.to_string())?;
            eval.brokerage_error = Some(e.to_string());
        }
    }
    if let Some(token) = session.renewed_token() {
        info!("A new brokerage session was issued; save it to skip the next login");
        audit::log_session_renewed(audit)?;
        eval.renewed_session = Some(token.to_string());
    }

    // 3. Rebalance and alert, only with both values
    let (Some(wallet), Some(brokerage)) = (&eval.wallet, eval.brokerage_balance) else {
        return Ok(eval);
    };
    let wallet_value = wallet.value;

    let result = rebalance(wallet_value, brokerage, settings.ratio);
    audit::log_rebalance_computed(audit, &result)?;
    eval.rebalance = Some(result);

    if let (Some(sink), Some(threshold)) = (alerts, settings.alert_threshold) {
        if let Some(outcome) = alert::notify_if_breached(sink, wallet_value, brokerage, threshold) {
            audit::log_alert_sent(audit, &outcome)?;
            eval.alert = Some(outcome);
        }
    }

    Ok(eval)
}

fn value_wallet<L: BalanceLookup, R: RateProvider>(
    settings: &EvaluationSettings,
    fetcher: &BalanceFetcher<L>,
    rates: &R,
) -> Result<WalletValuation> {
    let xpub = settings
        .xpub
        .as_deref()
        .ok_or(Error::ConfigurationMissing("wallet.xpub"))?;
    let key: ExtendedPublicKey = xpub.parse()?;
    valuation::value_wallet(&key, settings.discovery_limit, fetcher, rates, &settings.rates)
}

fn fetch_brokerage<'a, A: BrokerageApi>(
    settings: &'a EvaluationSettings,
    session: &mut BrokerageSession<A>,
) -> Result<(&'a str, f64)> {
    let account = settings
        .account_name
        .as_deref()
        .ok_or(Error::ConfigurationMissing("brokerage.account_name"))?;
    if !settings.has_brokerage_access {
        return Err(Error::ConfigurationMissing("brokerage.email and brokerage.password"));
    }
    let balance = session.fetch_account_balance(account)?;
    Ok((account, balance))
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = &self.quote_asset;

        match (&self.wallet, &self.wallet_error) {
            (Some(w), _) => {
                writeln!(
                    f,
                    "Wallet:     {} across {} addresses ({} funded)",
                    w.sats, w.address_count, w.funded_addresses
                )?;
                writeln!(
                    f,
                    "            {} {:.2} {}, {} {:.4} {}",
                    w.asset_rate.base_asset,
                    w.asset_rate.rate,
                    w.asset_rate.quote_currency,
                    w.quote_rate.base_asset,
                    w.quote_rate.rate,
                    w.quote_rate.quote_currency,
                )?;
                writeln!(f, "            value {:.2} {unit}", w.value)?;
                if w.is_partial() {
                    writeln!(
                        f,
                        "            [WARN] {} failed batches, {} anomalies counted as zero",
                        w.failed_batches, w.anomalies
                    )?;
                }
            }
            (None, Some(e)) => writeln!(f, "Wallet:     [FAIL] {e}")?,
            (None, None) => writeln!(f, "Wallet:     -")?,
        }

        let account = self.account_name.as_deref().unwrap_or("-");
        match (self.brokerage_balance, &self.brokerage_error) {
            (Some(b), _) => writeln!(f, "Brokerage:  {account} {b:.2}")?,
            (None, Some(e)) => writeln!(f, "Brokerage:  [FAIL] {e}")?,
            (None, None) => writeln!(f, "Brokerage:  -")?,
        }

        writeln!(f, "Target:     wallet : brokerage = {}", self.ratio)?;

        match &self.rebalance {
            Some(r) if r.is_computable() => {
                writeln!(
                    f,
                    "Current:    {:.1}% / {:.1}%{}",
                    r.current_fraction_a * 100.0,
                    r.current_fraction_b * 100.0,
                    r.display_ratio
                        .map(|x| format!(" (ratio {x:.2} : 1)"))
                        .unwrap_or_default(),
                )?;
                writeln!(
                    f,
                    "Targets:    wallet {:.2} {unit}, brokerage {:.2} {unit} (total {:.2})",
                    r.target_value_a, r.target_value_b, r.total_value
                )?;
                writeln!(f, "Adjust:     wallet {:+.2} {unit}", r.adjustment_a)?;
                writeln!(f, "            brokerage {:+.2} {unit}", r.adjustment_b)?;
                if r.status == RebalanceStatus::EmptyB {
                    writeln!(
                        f,
                        "Brokerage balance is zero; rebalancing means funding it."
                    )?;
                }
            }
            Some(r) => {
                if let RebalanceStatus::NotComputable(reason) = r.status {
                    writeln!(f, "Rebalance:  not computable ({reason})")?;
                }
            }
            None => writeln!(f, "Rebalance:  skipped, a side failed to load")?,
        }

        if let Some(a) = &self.alert {
            let state = if a.delivered { "sent" } else { "NOT delivered" };
            writeln!(f, "Alert:      {state}: {}", a.breach.message())?;
        }

        if let Some(token) = &self.renewed_session {
            writeln!(f)?;
            writeln!(f, "New brokerage session: {token}")?;
            writeln!(f, "Save it as brokerage.session in your config to skip the next login.")?;
        }

        Ok(())
    }
}
