use std::time::Instant;

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, trace, warn};

use crate::config::{CancelToken, SimulationConfig};
use crate::contract::{OptionContract, OptionKind};
use crate::error::{PricingError, Result};
use crate::result::{MonteCarloStats, PricingResult, Termination};
use crate::sampler::NormalSampler;
use crate::stats::RunningStats;

/// Paths simulated between two checks of the deadline and cancel token.
pub const BATCH_PATHS: u64 = 4096;

/// Terminal-price model for one contract, with the per-path constants
/// hoisted out of the loop.
#[derive(Debug, Clone, Copy)]
struct TerminalModel {
    spot: f64,
    strike: f64,
    drift: f64,
    diffusion: f64,
    kind: OptionKind,
}

impl TerminalModel {
    fn new(contract: &OptionContract, vol_sqrt_t: f64) -> Self {
        let volatility = contract.volatility();
        TerminalModel {
            spot: contract.spot(),
            strike: contract.strike(),
            drift: (contract.risk_free_rate() - 0.5 * volatility * volatility) * contract.years_to_expiry(),
            diffusion: vol_sqrt_t,
            kind: contract.kind(),
        }
    }

    /// Undiscounted payoff for one standard normal draw.
    #[inline(always)]
    fn payoff(&self, z: f64) -> f64 {
        let terminal = self.spot * self.diffusion.mul_add(z, self.drift).exp();
        self.kind.payoff(terminal, self.strike)
    }
}

struct StopCondition<'a> {
    deadline: Option<Instant>,
    cancel: Option<&'a CancelToken>,
}

impl<'a> StopCondition<'a> {
    fn new(config: &'a SimulationConfig, started: Instant) -> Self {
        StopCondition {
            deadline: config.time_budget().and_then(|budget| started.checked_add(budget)),
            cancel: config.cancel_token(),
        }
    }

    fn check(&self) -> Option<Termination> {
        if self.cancel.is_some_and(|token| token.is_cancelled()) {
            return Some(Termination::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Termination::DeadlineExceeded),
            _ => None,
        }
    }
}

/// Simulates up to `paths` paths from `sampler`, one batch at a time.
///
/// The stop condition is consulted between batches. When `guaranteed_batch`
/// is set the first batch runs unconditionally, so the run as a whole always
/// has data; other workers check before starting and may contribute nothing.
fn run_worker(
    model: &TerminalModel,
    paths: u64,
    sampler: &mut NormalSampler,
    stop: &StopCondition<'_>,
    guaranteed_batch: bool,
) -> (RunningStats, Termination) {
    let mut stats = RunningStats::new();
    if !guaranteed_batch {
        if let Some(reason) = stop.check() {
            return (stats, reason);
        }
    }
    let mut remaining = paths;
    loop {
        let batch = remaining.min(BATCH_PATHS);
        for _ in 0..batch {
            stats.push(model.payoff(sampler.sample()));
        }
        remaining -= batch;
        if remaining == 0 {
            return (stats, Termination::Completed);
        }
        if let Some(reason) = stop.check() {
            return (stats, reason);
        }
    }
}

/// Splits `paths` into at most `workers` near-equal chunks; the first
/// `paths % workers` chunks take one extra path.
fn split_paths(paths: u64, workers: usize) -> Vec<u64> {
    let chunks = (workers as u64).clamp(1, paths.max(1));
    let base = paths / chunks;
    let rem = paths % chunks;
    (0..chunks).map(|i| if i < rem { base + 1 } else { base }).collect()
}

fn finish(
    stats: &RunningStats,
    discount: f64,
    paths_requested: u64,
    workers: usize,
    termination: Termination,
    started: Instant,
) -> Result<PricingResult> {
    let price = discount * stats.mean();
    let standard_error = discount * stats.standard_error();

    if !price.is_finite() || (stats.count() > 1 && !standard_error.is_finite()) {
        return Err(PricingError::NumericalInstability(format!(
            "simulated price evaluates to {price} with standard error {standard_error}"
        )));
    }

    let summary = MonteCarloStats {
        standard_error,
        paths_simulated: stats.count(),
        paths_requested,
        workers,
        termination,
        elapsed: started.elapsed(),
    };

    if summary.early_terminated() {
        warn!(
            ?termination,
            paths_simulated = summary.paths_simulated,
            paths_requested,
            standard_error,
            "simulation stopped early, returning partial estimate"
        );
    }
    debug!(price, standard_error, paths = summary.paths_simulated, elapsed = ?summary.elapsed, "monte carlo done");

    Ok(PricingResult::monte_carlo(price, summary))
}

/// Monte Carlo price of a European option, with paths split across
/// `config.workers()` independent sub-streams of `config.seed()` and run on
/// the rayon pool.
///
/// Worker `w` draws from `NormalSampler::substream(seed, w)`. Partial
/// statistics are merged in worker order, so a completed run is
/// reproducible for a fixed seed, path count and worker count.
pub fn price_monte_carlo(contract: &OptionContract, config: &SimulationConfig) -> Result<PricingResult> {
    let inputs = contract.pricing_inputs()?;
    config.validate()?;

    let started = Instant::now();
    let model = TerminalModel::new(contract, inputs.vol_sqrt_t);
    let stop = StopCondition::new(config, started);
    let chunks = split_paths(config.paths(), config.workers());
    debug!(
        ?contract,
        paths = config.paths(),
        workers = chunks.len(),
        seed = config.seed(),
        "monte carlo pricing"
    );

    let partials: Vec<(RunningStats, Termination)> = chunks
        .par_iter()
        .enumerate()
        .map(|(worker, &paths)| {
            let mut sampler = NormalSampler::substream(config.seed(), worker as u64);
            let (stats, termination) = run_worker(&model, paths, &mut sampler, &stop, worker == 0);
            trace!(worker, paths, simulated = stats.count(), ?termination, "worker finished");
            (stats, termination)
        })
        .collect();

    let mut merged = RunningStats::new();
    let mut termination = Termination::Completed;
    for (stats, worker_termination) in &partials {
        merged.merge(stats);
        termination = match (termination, *worker_termination) {
            (Termination::Cancelled, _) | (_, Termination::Cancelled) => Termination::Cancelled,
            (Termination::DeadlineExceeded, _) | (_, Termination::DeadlineExceeded) => {
                Termination::DeadlineExceeded
            }
            _ => Termination::Completed,
        };
    }

    finish(&merged, inputs.discount, config.paths(), chunks.len(), termination, started)
}

/// Single-stream Monte Carlo price drawing from a caller-owned sampler.
/// `config.workers()` is ignored; the sampler is left positioned after the
/// last variate used.
pub fn price_monte_carlo_with_sampler(
    contract: &OptionContract,
    config: &SimulationConfig,
    sampler: &mut NormalSampler,
) -> Result<PricingResult> {
    let inputs = contract.pricing_inputs()?;
    config.validate_paths()?;

    let started = Instant::now();
    let model = TerminalModel::new(contract, inputs.vol_sqrt_t);
    let stop = StopCondition::new(config, started);
    debug!(?contract, paths = config.paths(), seed = sampler.seed(), stream = sampler.stream(), "monte carlo pricing");

    let (stats, termination) = run_worker(&model, config.paths(), sampler, &stop, true);
    finish(&stats, inputs.discount, config.paths(), 1, termination, started)
}
