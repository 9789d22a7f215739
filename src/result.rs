use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Analytic,
    MonteCarlo,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Analytic => f.write_str("analytic"),
            Method::MonteCarlo => f.write_str("monte carlo"),
        }
    }
}

/// Why a simulation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    Completed,
    DeadlineExceeded,
    Cancelled,
}

/// Sampling statistics attached to a Monte Carlo price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloStats {
    pub standard_error: f64,
    pub paths_simulated: u64,
    pub paths_requested: u64,
    pub workers: usize,
    pub termination: Termination,
    pub elapsed: Duration,
}

impl MonteCarloStats {
    pub fn early_terminated(&self) -> bool {
        self.termination != Termination::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingResult {
    price: f64,
    method: Method,
    monte_carlo: Option<MonteCarloStats>,
}

impl PricingResult {
    pub(crate) fn analytic(price: f64) -> Self {
        PricingResult { price, method: Method::Analytic, monte_carlo: None }
    }

    pub(crate) fn monte_carlo(price: f64, stats: MonteCarloStats) -> Self {
        PricingResult { price, method: Method::MonteCarlo, monte_carlo: Some(stats) }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn monte_carlo_stats(&self) -> Option<&MonteCarloStats> {
        self.monte_carlo.as_ref()
    }

    /// Zero for analytic prices.
    pub fn standard_error(&self) -> f64 {
        self.monte_carlo.map_or(0.0, |s| s.standard_error)
    }

    pub fn early_terminated(&self) -> bool {
        self.monte_carlo.is_some_and(|s| s.early_terminated())
    }

    /// `price ± z * standard_error`; collapses to the price for analytic
    /// results. Use z = 1.96 for a 95% interval.
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        let half_width = z * self.standard_error();
        (self.price - half_width, self.price + half_width)
    }
}

impl fmt::Display for PricingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.monte_carlo {
            None => write!(f, "{:.2} ({})", self.price, self.method),
            Some(stats) => {
                write!(
                    f,
                    "{:.2} ± {:.4} ({}, {} paths",
                    self.price, stats.standard_error, self.method, stats.paths_simulated
                )?;
                if stats.early_terminated() {
                    write!(f, " of {}, {:?}", stats.paths_requested, stats.termination)?;
                }
                f.write_str(")")
            }
        }
    }
}
