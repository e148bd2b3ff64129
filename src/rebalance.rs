//! Two-asset rebalance math.
//!
//! Given the current value of asset A and asset B (same unit) and a target
//! ratio `a : b`, computes current and target allocations and the amount of
//! value to move into (positive) or out of (negative) each asset.
//!
//! ```
//! use ratiobook::rebalance::{rebalance, RebalanceStatus, TargetRatio};
//!
//! let result = rebalance(900.0, 0.0, TargetRatio::new(2.0, 1.0).unwrap());
//! assert_eq!(result.status, RebalanceStatus::EmptyB);
//! assert!((result.adjustment_a + 300.0).abs() < 1e-9);
//! assert!((result.adjustment_b - 300.0).abs() < 1e-9);
//! ```

use std::fmt;

/// Target allocation `a : b`. Both parts and their sum are finite, and both
/// parts are strictly positive.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTargetRatio"))]
pub struct TargetRatio {
    a: f64,
    b: f64,
}

impl TargetRatio {
    /// Two parts wallet to one part brokerage.
    pub const DEFAULT: TargetRatio = TargetRatio { a: 2.0, b: 1.0 };

    /// Build a ratio, rejecting non-finite or non-positive parts and parts
    /// whose sum overflows.
    pub fn new(a: f64, b: f64) -> Option<Self> {
        let valid = is_valid_part(a) && is_valid_part(b) && (a + b).is_finite();
        valid.then_some(Self { a, b })
    }

    /// Build a ratio from user input, replacing each invalid or missing part
    /// with the matching part of `fallback`. If the parts still cannot form a
    /// ratio, `fallback` is used whole.
    pub fn or_fallback(a: Option<f64>, b: Option<f64>, fallback: TargetRatio) -> Self {
        let a = a.filter(|v| is_valid_part(*v)).unwrap_or(fallback.a);
        let b = b.filter(|v| is_valid_part(*v)).unwrap_or(fallback.b);
        Self::new(a, b).unwrap_or(fallback)
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// Target fraction of the total held in A.
    pub fn fraction_a(&self) -> f64 {
        self.a / (self.a + self.b)
    }

    /// Target fraction of the total held in B.
    pub fn fraction_b(&self) -> f64 {
        self.b / (self.a + self.b)
    }
}

impl Default for TargetRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for TargetRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.a, self.b)
    }
}

fn is_valid_part(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTargetRatio {
    a: f64,
    b: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTargetRatio> for TargetRatio {
    type Error = String;

    fn try_from(raw: RawTargetRatio) -> Result<Self, Self::Error> {
        TargetRatio::new(raw.a, raw.b)
            .ok_or_else(|| format!("invalid ratio {} : {}", raw.a, raw.b))
    }
}

/// Why a rebalance could not be computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DegenerateInput {
    /// Combined value is zero; there is nothing to allocate.
    ZeroTotal,
    /// One of the asset values is negative.
    NegativeValue,
    /// One of the asset values is NaN or infinite.
    NonFiniteValue,
}

impl fmt::Display for DegenerateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateInput::ZeroTotal => write!(f, "total value is zero"),
            DegenerateInput::NegativeValue => write!(f, "asset value is negative"),
            DegenerateInput::NonFiniteValue => write!(f, "asset value is not a finite number"),
        }
    }
}

/// Outcome class of a rebalance computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RebalanceStatus {
    /// Both assets hold value; all fields are meaningful.
    Computed,
    /// B is empty: targets and adjustments are meaningful, `display_ratio` is not.
    EmptyB,
    /// Nothing could be computed; all numeric fields are zero.
    NotComputable(DegenerateInput),
}

/// Current vs target allocation of two assets.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalanceResult {
    pub status: RebalanceStatus,
    pub total_value: f64,
    pub current_fraction_a: f64,
    pub current_fraction_b: f64,
    pub target_fraction_a: f64,
    pub target_fraction_b: f64,
    pub target_value_a: f64,
    pub target_value_b: f64,
    /// Positive: move value into A. Negative: move value out of A.
    pub adjustment_a: f64,
    /// Always `-adjustment_a`.
    pub adjustment_b: f64,
    /// Current `A / B`, only when B holds value.
    pub display_ratio: Option<f64>,
}

impl RebalanceResult {
    fn not_computable(reason: DegenerateInput) -> Self {
        Self {
            status: RebalanceStatus::NotComputable(reason),
            total_value: 0.0,
            current_fraction_a: 0.0,
            current_fraction_b: 0.0,
            target_fraction_a: 0.0,
            target_fraction_b: 0.0,
            target_value_a: 0.0,
            target_value_b: 0.0,
            adjustment_a: 0.0,
            adjustment_b: 0.0,
            display_ratio: None,
        }
    }

    /// True unless the input was degenerate.
    pub fn is_computable(&self) -> bool {
        !matches!(self.status, RebalanceStatus::NotComputable(_))
    }
}

/// Compute the rebalance from current values `a` and `b` toward `ratio`.
///
/// Never panics and never divides by zero: degenerate input yields a
/// [`RebalanceStatus::NotComputable`] result.
pub fn rebalance(a: f64, b: f64, ratio: TargetRatio) -> RebalanceResult {
    if !a.is_finite() || !b.is_finite() {
        return RebalanceResult::not_computable(DegenerateInput::NonFiniteValue);
    }
    if a < 0.0 || b < 0.0 {
        return RebalanceResult::not_computable(DegenerateInput::NegativeValue);
    }

    let total = a + b;
    if !total.is_finite() {
        return RebalanceResult::not_computable(DegenerateInput::NonFiniteValue);
    }
    if total <= 0.0 {
        return RebalanceResult::not_computable(DegenerateInput::ZeroTotal);
    }

    let target_fraction_a = ratio.fraction_a();
    let target_fraction_b = ratio.fraction_b();
    let target_value_a = total * target_fraction_a;
    let target_value_b = total * target_fraction_b;

    // B's adjustment mirrors A's so value is only moved, never created.
    let adjustment_a = target_value_a - a;
    let adjustment_b = -adjustment_a;

    let (status, display_ratio) = if b == 0.0 {
        (RebalanceStatus::EmptyB, None)
    } else {
        (RebalanceStatus::Computed, Some(a / b))
    };

    RebalanceResult {
        status,
        total_value: total,
        current_fraction_a: a / total,
        current_fraction_b: b / total,
        target_fraction_a,
        target_fraction_b,
        target_value_a,
        target_value_b,
        adjustment_a,
        adjustment_b,
        display_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn two_to_one() -> TargetRatio {
        TargetRatio::new(2.0, 1.0).unwrap()
    }

    #[test]
    fn already_balanced() {
        let r = rebalance(600.0, 300.0, two_to_one());
        assert_eq!(r.status, RebalanceStatus::Computed);
        assert!((r.total_value - 900.0).abs() < EPS);
        assert!((r.target_value_a - 600.0).abs() < EPS);
        assert!((r.target_value_b - 300.0).abs() < EPS);
        assert!(r.adjustment_a.abs() < EPS);
        assert!(r.adjustment_b.abs() < EPS);
        assert_eq!(r.display_ratio, Some(2.0));
    }

    #[test]
    fn empty_b_gets_full_target() {
        let r = rebalance(900.0, 0.0, two_to_one());
        assert_eq!(r.status, RebalanceStatus::EmptyB);
        assert!((r.target_value_a - 600.0).abs() < EPS);
        assert!((r.target_value_b - 300.0).abs() < EPS);
        assert!((r.adjustment_a + 300.0).abs() < EPS);
        assert!((r.adjustment_b - 300.0).abs() < EPS);
        assert!((r.adjustment_b - r.target_value_b).abs() < EPS);
        assert_eq!(r.display_ratio, None);
        assert_eq!(r.current_fraction_a, 1.0);
        assert_eq!(r.current_fraction_b, 0.0);
    }

    #[test]
    fn zero_total_not_computable() {
        let r = rebalance(0.0, 0.0, two_to_one());
        assert_eq!(
            r.status,
            RebalanceStatus::NotComputable(DegenerateInput::ZeroTotal)
        );
        assert!(!r.is_computable());
        assert_eq!(r.adjustment_a, 0.0);
        assert_eq!(r.target_value_b, 0.0);
    }

    #[test]
    fn negative_b_not_computable() {
        let r = rebalance(900.0, -10.0, two_to_one());
        assert_eq!(
            r.status,
            RebalanceStatus::NotComputable(DegenerateInput::NegativeValue)
        );
        assert_eq!(r.current_fraction_b, 0.0);
    }

    #[test]
    fn nan_not_computable() {
        let r = rebalance(f64::NAN, 10.0, two_to_one());
        assert_eq!(
            r.status,
            RebalanceStatus::NotComputable(DegenerateInput::NonFiniteValue)
        );
    }

    #[test]
    fn empty_a_moves_into_a() {
        let r = rebalance(0.0, 300.0, TargetRatio::new(1.0, 1.0).unwrap());
        assert_eq!(r.status, RebalanceStatus::Computed);
        assert!((r.adjustment_a - 150.0).abs() < EPS);
        assert!((r.adjustment_b + 150.0).abs() < EPS);
        assert_eq!(r.display_ratio, Some(0.0));
    }

    #[test]
    fn adjustments_cancel_exactly() {
        let r = rebalance(1234.567, 89.01, TargetRatio::new(3.0, 7.0).unwrap());
        assert_eq!(r.adjustment_a + r.adjustment_b, 0.0);
    }

    #[test]
    fn ratio_rejects_bad_parts() {
        assert!(TargetRatio::new(0.0, 1.0).is_none());
        assert!(TargetRatio::new(1.0, -1.0).is_none());
        assert!(TargetRatio::new(f64::NAN, 1.0).is_none());
        assert!(TargetRatio::new(f64::INFINITY, 1.0).is_none());
    }

    #[test]
    fn ratio_fallback_is_per_part() {
        let r = TargetRatio::or_fallback(Some(3.0), Some(-1.0), TargetRatio::DEFAULT);
        assert_eq!(r.a(), 3.0);
        assert_eq!(r.b(), 1.0);

        let r = TargetRatio::or_fallback(None, None, TargetRatio::DEFAULT);
        assert_eq!(r, TargetRatio::DEFAULT);
    }

    #[test]
    fn ratio_rejects_overflowing_sum() {
        assert!(TargetRatio::new(1e308, 1e308).is_none());
        let r = TargetRatio::or_fallback(Some(1e308), Some(1e308), TargetRatio::DEFAULT);
        assert_eq!(r, TargetRatio::DEFAULT);
    }

    #[test]
    fn overflowing_total_not_computable() {
        let r = rebalance(1e308, 1e308, two_to_one());
        assert_eq!(
            r.status,
            RebalanceStatus::NotComputable(DegenerateInput::NonFiniteValue)
        );
        assert_eq!(r.adjustment_a + r.adjustment_b, 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ratio_deserialize_validates() {
        let r: TargetRatio = serde_json::from_str(r#"{"a":3.0,"b":1.0}"#).unwrap();
        assert_eq!(r, TargetRatio::new(3.0, 1.0).unwrap());

        assert!(serde_json::from_str::<TargetRatio>(r#"{"a":0,"b":0}"#).is_err());
        assert!(serde_json::from_str::<TargetRatio>(r#"{"a":-1.0,"b":1.0}"#).is_err());
    }

    #[test]
    fn ratio_fractions() {
        let r = TargetRatio::new(3.0, 1.0).unwrap();
        assert_eq!(r.fraction_a(), 0.75);
        assert_eq!(r.fraction_b(), 0.25);
        assert_eq!(format!("{r}"), "3 : 1");
    }
}
