//! European option pricing under Black-Scholes, by closed form and by
//! Monte Carlo simulation of the terminal price under GBM.

pub mod bs;
pub mod config;
pub mod contract;
pub mod engine;
pub mod error;
pub mod mc;
pub mod result;
pub mod sampler;
pub mod stats;

pub use bs::{normal_cdf, price_analytic};
pub use config::{CancelToken, SimulationConfig};
pub use contract::{OptionContract, OptionKind};
pub use engine::{price, price_option, PricingMethod};
pub use error::{PricingError, Result};
pub use mc::{price_monte_carlo, price_monte_carlo_with_sampler};
pub use result::{Method, MonteCarloStats, PricingResult, Termination};
pub use sampler::NormalSampler;
pub use stats::RunningStats;
