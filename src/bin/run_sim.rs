use std::path::PathBuf;

use aemplume::{config::setup::SetupConfig, solver};
use clap::Parser;
use log::{info, warn};

#[derive(Debug, clap::Parser)]
#[command(
    name = "run_sim",
    about = "Solve for the steady plume around a set of elements and sample it on the configured grid"
)]
pub struct RunCli {
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    /// Print the parsed setup before solving.
    #[arg(short = 's', long = "summary")]
    pub summary: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = RunCli::parse();

    info!("Reading setup from {}", args.config.display());
    let setup = SetupConfig::parse(&args.config)?;
    if args.summary {
        setup.print();
    }

    let output = solver::run(&setup.simulation)?;
    let (nx, ny) = output.grid.dims();
    info!("Evaluated {}x{} grid", nx, ny);

    match output.grid.value_range() {
        Some((min, max)) => info!("Concentration range: [{}, {}]", min, max),
        None => warn!("Grid is empty"),
    }
    match output.grid.plume_extent() {
        Some(x) => info!("Plume extent: x = {}", x),
        None => warn!("No positive concentration on the grid"),
    }
    info!("Done!");
    Ok(())
}
