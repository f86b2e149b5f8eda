use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tyre_strategy::config::{DEFAULT_PIT_LOSS, DEFAULT_TOTAL_LAPS};
use tyre_strategy::{data, RaceConfig, Strategy, TyreLaw};

#[derive(Debug, Parser)]
#[command(name = "tyre-strategy", about = "Find the minimum-time tyre strategy for a race")]
struct Cli {
    /// Tyre laws as CSV (`Compound,Slope,Intercept`) or the model service's JSON
    #[arg(long, conflicts_with = "laps_data", required_unless_present = "laps_data")]
    laws: Option<PathBuf>,

    /// Raw lap CSV to fit the tyre laws from
    #[arg(long)]
    laps_data: Option<PathBuf>,

    /// Race length in laps
    #[arg(long, default_value_t = DEFAULT_TOTAL_LAPS)]
    laps: u32,

    /// Time lost per pit stop, in seconds
    #[arg(long, default_value_t = DEFAULT_PIT_LOSS)]
    pit_loss: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = RaceConfig::new(cli.laps, cli.pit_loss);
    config.validate().context("invalid race configuration")?;

    let laws = load_laws(&cli)?;
    if laws.is_empty() {
        bail!("no tyre laws available");
    }
    for law in &laws {
        info!(compound = %law.compound, slope = law.slope, intercept = law.intercept, "tyre law");
    }

    let mut solver = config.solver(&laws).context("failed to build solver")?;
    let strategy = solver
        .optimal_strategy()
        .context("failed to find a strategy")?;

    print_strategy(&config, &strategy);
    Ok(())
}

fn load_laws(cli: &Cli) -> Result<Vec<TyreLaw>> {
    if let Some(path) = &cli.laws {
        return data::load_laws(path)
            .with_context(|| format!("failed to read tyre laws from {}", path.display()));
    }
    let Some(path) = &cli.laps_data else {
        bail!("either --laws or --laps-data is required");
    };
    let samples = data::load_lap_samples(path)
        .with_context(|| format!("failed to read laps from {}", path.display()))?;
    info!(laps = samples.len(), "loaded clean laps");
    data::fit_laws(&samples).context("failed to fit tyre laws")
}

fn print_strategy(config: &RaceConfig, strategy: &Strategy) {
    println!(
        "\n--- Optimal Strategy (Laps: {}, Pit Loss: {}s) ---",
        config.total_laps, config.pit_loss
    );
    println!(
        "Total: {:.3}s ({} stops, start on {})",
        strategy.total_time,
        strategy.pit_stops(),
        strategy.start.compound
    );
    for stint in &strategy.stints {
        println!(
            "- {:6} : laps {:3}-{:3} ({:2} laps) {:9.3}s",
            stint.compound.name(),
            stint.start_lap,
            stint.start_lap + stint.laps - 1,
            stint.laps,
            stint.time()
        );
    }
    let pits: Vec<String> = strategy.pit_laps().iter().map(u32::to_string).collect();
    println!("Pit on lap(s): {}", pits.join(", "));
}
