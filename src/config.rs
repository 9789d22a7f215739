use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PricingError, Result};

pub const DEFAULT_WORKERS: usize = 8;
/// Upper bound on `workers`; each worker owns a sub-stream and a partial
/// accumulator.
pub const MAX_WORKERS: usize = 4096;

/// Shared flag a caller flips to stop a running simulation early.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-call Monte Carlo settings.
///
/// `workers` is the number of independent sub-streams the paths are split
/// across. It is fixed here rather than taken from the thread pool, so the
/// same config reproduces the same price on any machine.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    paths: u64,
    seed: u64,
    workers: usize,
    time_budget: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl SimulationConfig {
    pub fn new(paths: u64, seed: u64) -> Self {
        SimulationConfig {
            paths,
            seed,
            workers: DEFAULT_WORKERS,
            time_budget: None,
            cancel: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn paths(&self) -> u64 {
        self.paths
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }

    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_paths()?;
        if self.workers == 0 {
            return Err(PricingError::InvalidConfig {
                name: "workers",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.workers > MAX_WORKERS {
            return Err(PricingError::InvalidConfig {
                name: "workers",
                reason: format!("must be at most {MAX_WORKERS}, got {}", self.workers),
            });
        }
        Ok(())
    }

    /// The part of `validate` that applies to a single caller-owned stream.
    pub(crate) fn validate_paths(&self) -> Result<()> {
        if self.paths == 0 {
            return Err(PricingError::InvalidConfig {
                name: "paths",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Reads `PRICER_PATHS`, `PRICER_SEED`, `PRICER_WORKERS` and
    /// `PRICER_TIME_BUDGET_MS`, falling back to 100000 paths, seed 42 and
    /// 8 workers with no time budget.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let paths = parse_or(&lookup, "PRICER_PATHS", 100_000u64)?;
        let seed = parse_or(&lookup, "PRICER_SEED", 42u64)?;
        let workers = parse_or(&lookup, "PRICER_WORKERS", DEFAULT_WORKERS)?;

        let mut config = SimulationConfig::new(paths, seed).with_workers(workers);
        if let Some(millis) = parse::<u64>(&lookup, "PRICER_TIME_BUDGET_MS")? {
            config = config.with_time_budget(Duration::from_millis(millis));
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PricingError::InvalidConfig { name: key, reason: format!("{raw:?}: {e}") }),
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse(lookup, key)?.unwrap_or(default))
}
