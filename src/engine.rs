use crate::bs::price_analytic;
use crate::config::SimulationConfig;
use crate::contract::{OptionContract, OptionKind};
use crate::error::Result;
use crate::mc::price_monte_carlo;
use crate::result::PricingResult;

#[derive(Debug, Clone)]
pub enum PricingMethod {
    Analytic,
    MonteCarlo(SimulationConfig),
}

pub fn price(contract: &OptionContract, method: &PricingMethod) -> Result<PricingResult> {
    match method {
        PricingMethod::Analytic => price_analytic(contract),
        PricingMethod::MonteCarlo(config) => price_monte_carlo(contract, config),
    }
}

/// Loose-argument entry point for host glue (spreadsheet cells, command
/// lines) where the option kind arrives as text.
///
/// Kind parsing and contract validation happen before routing, so a bad
/// input fails identically whichever method was asked for.
pub fn price_option(
    spot: f64,
    strike: f64,
    years_to_expiry: f64,
    risk_free_rate: f64,
    volatility: f64,
    kind: &str,
    method: &PricingMethod,
) -> Result<PricingResult> {
    let kind: OptionKind = kind.parse()?;
    let contract = OptionContract::new(spot, strike, years_to_expiry, risk_free_rate, volatility, kind)?;
    price(&contract, method)
}
