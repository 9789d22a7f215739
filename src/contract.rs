use std::fmt;
use std::str::FromStr;

use crate::error::{PricingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Payoff at expiry for a terminal spot.
    #[inline(always)]
    pub fn payoff(self, terminal_spot: f64, strike: f64) -> f64 {
        match self {
            OptionKind::Call => (terminal_spot - strike).max(0.0),
            OptionKind::Put => (strike - terminal_spot).max(0.0),
        }
    }
}

impl FromStr for OptionKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("call") {
            Ok(OptionKind::Call)
        } else if trimmed.eq_ignore_ascii_case("put") {
            Ok(OptionKind::Put)
        } else {
            Err(PricingError::UnknownOptionType(s.to_string()))
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => f.write_str("call"),
            OptionKind::Put => f.write_str("put"),
        }
    }
}

/// A European option on a non-dividend-paying underlying.
///
/// Fields are only reachable through accessors, so a value that exists has
/// passed validation and cannot be changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionContract {
    spot: f64,
    strike: f64,
    years_to_expiry: f64,
    risk_free_rate: f64,
    volatility: f64,
    kind: OptionKind,
}

/// Quantities every pricer needs, computed once per pricing call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PricingInputs {
    pub vol_sqrt_t: f64,
    pub discount: f64,
}

impl OptionContract {
    pub fn new(
        spot: f64,
        strike: f64,
        years_to_expiry: f64,
        risk_free_rate: f64,
        volatility: f64,
        kind: OptionKind,
    ) -> Result<Self> {
        let contract = OptionContract {
            spot,
            strike,
            years_to_expiry,
            risk_free_rate,
            volatility,
            kind,
        };
        contract.validate()?;
        Ok(contract)
    }

    pub fn call(spot: f64, strike: f64, years_to_expiry: f64, risk_free_rate: f64, volatility: f64) -> Result<Self> {
        Self::new(spot, strike, years_to_expiry, risk_free_rate, volatility, OptionKind::Call)
    }

    pub fn put(spot: f64, strike: f64, years_to_expiry: f64, risk_free_rate: f64, volatility: f64) -> Result<Self> {
        Self::new(spot, strike, years_to_expiry, risk_free_rate, volatility, OptionKind::Put)
    }

    /// Same contract with the other option kind, used for parity checks.
    pub fn with_kind(&self, kind: OptionKind) -> Self {
        OptionContract { kind, ..*self }
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn years_to_expiry(&self) -> f64 {
        self.years_to_expiry
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    fn validate(&self) -> Result<()> {
        positive("spot", self.spot)?;
        positive("strike", self.strike)?;
        positive("years_to_expiry", self.years_to_expiry)?;
        positive("volatility", self.volatility)?;
        if !self.risk_free_rate.is_finite() {
            return Err(PricingError::InvalidParameter {
                name: "risk_free_rate",
                value: self.risk_free_rate,
                reason: "must be finite",
            });
        }
        Ok(())
    }

    /// Entry check shared by the analytic and Monte Carlo pricers. Runs
    /// before any pricing work so both paths fail the same way.
    pub(crate) fn pricing_inputs(&self) -> Result<PricingInputs> {
        self.validate()?;

        let vol_sqrt_t = self.volatility * self.years_to_expiry.sqrt();
        if vol_sqrt_t == 0.0 || !vol_sqrt_t.is_finite() {
            return Err(PricingError::NumericalInstability(format!(
                "sigma * sqrt(T) evaluates to {vol_sqrt_t}"
            )));
        }

        let discount = (-self.risk_free_rate * self.years_to_expiry).exp();
        if discount == 0.0 || !discount.is_finite() {
            return Err(PricingError::NumericalInstability(format!(
                "discount factor exp(-rT) evaluates to {discount}"
            )));
        }

        let half_variance = 0.5 * self.volatility * self.volatility * self.years_to_expiry;
        let rate_term = self.risk_free_rate * self.years_to_expiry;
        for drift in [rate_term + half_variance, rate_term - half_variance] {
            if !drift.is_finite() {
                return Err(PricingError::NumericalInstability(format!(
                    "drift (r +/- sigma^2/2) * T evaluates to {drift}"
                )));
            }
        }

        Ok(PricingInputs { vol_sqrt_t, discount })
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PricingError::InvalidParameter { name, value, reason: "must be finite" });
    }
    if value <= 0.0 {
        return Err(PricingError::InvalidParameter { name, value, reason: "must be positive" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_option_kind() {
        assert_eq!("call".parse::<OptionKind>(), Ok(OptionKind::Call));
        assert_eq!(" PUT ".parse::<OptionKind>(), Ok(OptionKind::Put));
        assert_eq!("Call".parse::<OptionKind>(), Ok(OptionKind::Call));
        assert_eq!(
            "straddle".parse::<OptionKind>(),
            Err(PricingError::UnknownOptionType("straddle".to_string()))
        );
        assert!("".parse::<OptionKind>().is_err());
    }

    #[test]
    fn payoff_is_non_negative() {
        assert_eq!(OptionKind::Call.payoff(120.0, 110.0), 10.0);
        assert_eq!(OptionKind::Call.payoff(100.0, 110.0), 0.0);
        assert_eq!(OptionKind::Put.payoff(100.0, 110.0), 10.0);
        assert_eq!(OptionKind::Put.payoff(120.0, 110.0), 0.0);
    }

    #[test]
    fn rejects_non_positive_fields() {
        let cases = [
            (0.0, 110.0, 1.0, 0.05, 0.2, "spot"),
            (100.0, -1.0, 1.0, 0.05, 0.2, "strike"),
            (100.0, 110.0, 0.0, 0.05, 0.2, "years_to_expiry"),
            (100.0, 110.0, 1.0, 0.05, -1.0, "volatility"),
            (100.0, 110.0, 1.0, f64::NAN, 0.2, "risk_free_rate"),
            (f64::INFINITY, 110.0, 1.0, 0.05, 0.2, "spot"),
        ];
        for (s, k, t, r, v, field) in cases {
            match OptionContract::call(s, k, t, r, v) {
                Err(PricingError::InvalidParameter { name, .. }) => assert_eq!(name, field),
                other => panic!("expected InvalidParameter for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_rates_are_allowed() {
        let contract = OptionContract::put(100.0, 100.0, 1.0, -0.01, 0.2).unwrap();
        assert_eq!(contract.risk_free_rate(), -0.01);
        assert_eq!(contract.kind(), OptionKind::Put);
        assert_eq!(contract.with_kind(OptionKind::Call).kind(), OptionKind::Call);
    }

    #[test]
    fn underflowing_diffusion_is_unstable() {
        let contract = OptionContract::call(100.0, 100.0, 1e-300, 0.05, 1e-300).unwrap();
        assert!(matches!(contract.pricing_inputs(), Err(PricingError::NumericalInstability(_))));
    }

    #[test]
    fn overflowing_discount_is_unstable() {
        let contract = OptionContract::call(100.0, 100.0, 1e6, -1e3, 0.2).unwrap();
        assert!(matches!(contract.pricing_inputs(), Err(PricingError::NumericalInstability(_))));
    }

    #[test]
    fn overflowing_drift_is_unstable() {
        // sigma * sqrt(T) is still finite here, sigma^2 is not.
        let contract = OptionContract::call(100.0, 110.0, 1.0, 0.05, 1e200).unwrap();
        match contract.pricing_inputs() {
            Err(PricingError::NumericalInstability(msg)) => assert!(msg.contains("drift"), "{msg}"),
            other => panic!("expected NumericalInstability, got {other:?}"),
        }
    }
}
