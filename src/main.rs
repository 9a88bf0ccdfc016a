use anyhow::Context;
use clap::Parser;
use layered_mcrt::output::save_results_to_file;
use layered_mcrt::random::time_seed;
use layered_mcrt::SimulationConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Monte Carlo light transport in multi-layered media")]
struct Args {
    /// Path to the JSON configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Where to write the results
    #[arg(short, long, default_value = "output/results.txt")]
    output: PathBuf,

    /// Override the number of photons
    #[arg(long)]
    photons: Option<u64>,

    /// Override the number of parallel jobs
    #[arg(long)]
    jobs: Option<u64>,

    /// Override the base seed
    #[arg(long)]
    seed: Option<u64>,

    /// Also write the 2D grids
    #[arg(long)]
    grids: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = SimulationConfig::from_file(&args.config)?;
    log::info!("Loaded config from {}", args.config.display());
    if let Some(photons) = args.photons {
        config.num_photons = photons;
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let slab = config.build()?;
    log::info!(
        "{} layers, {} cm deep, specular reflectance {:.6}",
        slab.layers().num_layers(),
        slab.layers().depth(),
        slab.specular_reflectance()
    );

    let seed = config.seed.unwrap_or_else(time_seed);
    let histogram = slab.run_mcrt(config.num_photons, config.jobs, seed, !args.quiet);
    let results = histogram.scaled(slab.layers());

    if let Some(dir) = args.output.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
    }
    save_results_to_file(&results, &args.output, args.grids)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}
