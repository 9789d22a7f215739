use statrs::function::erf::erfc;
use tracing::debug;

use crate::contract::{OptionContract, OptionKind, PricingInputs};
use crate::error::{PricingError, Result};
use crate::result::PricingResult;

/// Relative size of a negative analytic price still treated as rounding.
const CANCELLATION_TOLERANCE: f64 = 1e-12;

/// Standard normal CDF, `0.5 * (1 + erf(x / sqrt(2)))`.
///
/// Evaluated through `erfc` so the left tail keeps its relative precision
/// instead of cancelling in `1 + erf`.
pub fn normal_cdf(x: f64) -> f64 {
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Returns `(d1, d2)` for a validated contract.
pub fn d1_d2(contract: &OptionContract) -> Result<(f64, f64)> {
    let inputs = contract.pricing_inputs()?;
    Ok(d1_d2_with(contract, &inputs))
}

fn d1_d2_with(contract: &OptionContract, inputs: &PricingInputs) -> (f64, f64) {
    let volatility = contract.volatility();
    let d1 = ((contract.spot() / contract.strike()).ln()
        + (contract.risk_free_rate() + 0.5 * volatility * volatility) * contract.years_to_expiry())
        / inputs.vol_sqrt_t;
    (d1, d1 - inputs.vol_sqrt_t)
}

/// Closed-form Black-Scholes price of a European call or put.
pub fn price_analytic(contract: &OptionContract) -> Result<PricingResult> {
    let inputs = contract.pricing_inputs()?;
    debug!(?contract, "analytic pricing");

    let (d1, d2) = d1_d2_with(contract, &inputs);
    let spot = contract.spot();
    let discounted_strike = contract.strike() * inputs.discount;

    let price = match contract.kind() {
        OptionKind::Call => spot * normal_cdf(d1) - discounted_strike * normal_cdf(d2),
        OptionKind::Put => discounted_strike * normal_cdf(-d2) - spot * normal_cdf(-d1),
    };

    if !price.is_finite() {
        return Err(PricingError::NumericalInstability(format!(
            "analytic price evaluates to {price} (d1 = {d1}, d2 = {d2})"
        )));
    }
    // Cancellation in deep out-of-the-money cases can leave a tiny negative.
    let tolerance = CANCELLATION_TOLERANCE * spot.max(contract.strike());
    if price < -tolerance {
        return Err(PricingError::NumericalInstability(format!(
            "analytic price evaluates to {price} (d1 = {d1}, d2 = {d2})"
        )));
    }
    Ok(PricingResult::analytic(price.max(0.0)))
}
