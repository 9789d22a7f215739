use bs_monte_carlo::{price, OptionContract, OptionKind, PricingMethod, SimulationConfig};

fn run() -> bs_monte_carlo::Result<()> {
    let spot = 100.0;
    let strike = 110.0;
    let years_to_expiry = 1.0;
    let risk_free_rate = 0.05;
    let volatility = 0.2;

    let config = SimulationConfig::from_env()?;
    tracing::info!(
        paths = config.paths(),
        seed = config.seed(),
        workers = config.workers(),
        "pricing reference contract"
    );

    let monte_carlo = PricingMethod::MonteCarlo(config);
    for kind in [OptionKind::Call, OptionKind::Put] {
        let contract = OptionContract::new(spot, strike, years_to_expiry, risk_free_rate, volatility, kind)?;
        let analytic = price(&contract, &PricingMethod::Analytic)?;
        let simulated = price(&contract, &monte_carlo)?;
        let (low, high) = simulated.confidence_interval(1.96);

        println!("{kind} option price (Black-Scholes): {:.2}", analytic.price());
        println!(
            "{kind} option price (Monte Carlo): {:.2} (standard error {:.4}, 95% interval [{low:.2}, {high:.2}])",
            simulated.price(),
            simulated.standard_error()
        );
        if simulated.early_terminated() {
            println!("  note: simulation stopped early, estimate is partial ({simulated})");
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        tracing::error!("pricing failed: {e}");
        std::process::exit(1);
    }
}
