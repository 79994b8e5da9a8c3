pub mod basis;
pub mod field;
pub mod system;

use std::time::Instant;

use log::info;

use crate::config::SimulationConfig;
use crate::error::Result;

use self::basis::MathieuBasis;
use self::field::{ConcentrationGrid, FieldEvaluator};
use self::system::{Solution, SystemBuilder};

/// `(0..count).map(f)`, spread over the rayon pool when built with the
/// `parallel` feature. Output order is the index order either way.
#[cfg(feature = "parallel")]
pub fn map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub fn map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

pub struct RunOutput {
    // With element geometry prepared.
    pub config: SimulationConfig,
    pub solution: Solution,
    pub grid: ConcentrationGrid,
}

pub fn run(config: &SimulationConfig) -> Result<RunOutput> {
    let basis = MathieuBasis::native(config.discretization.num_terms);
    run_with(config, &basis)
}

pub fn run_with(config: &SimulationConfig, basis: &MathieuBasis) -> Result<RunOutput> {
    // Rejects an empty element list before anything is assembled.
    config.validate()?;

    let start = Instant::now();
    let mut config = config.clone();
    config.prepare_elements()?;

    let solution = SystemBuilder::new(&config, basis).solve()?;
    info!(
        "Solved boundary system: rank {}, residual norm {:e}",
        solution.rank, solution.residual_norm
    );

    let evaluator = FieldEvaluator::new(&config, basis, &solution.coefficients)?;
    let grid = evaluator.evaluate_grid(&config.domain)?;

    let elapsed = start.elapsed().as_secs();
    info!(
        "Computation time [hh:mm:ss]: {:02}:{:02}:{:02}",
        elapsed / 3600,
        (elapsed % 3600) / 60,
        elapsed % 60
    );

    Ok(RunOutput {
        config,
        solution,
        grid,
    })
}
