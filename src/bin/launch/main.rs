/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2024 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

#[macro_use]
extern crate log;
extern crate nyx_launch as nyx;

use clap::{Parser, ValueEnum};
use nyx::io::{export_ground_track, ConfigRepr, LaunchConfig};
use nyx::md::opti::{minimize_bounded, LaunchObjective, OptimizerKind, Search};
use nyx::md::{Evaluation, LayoutKind};
use nyx::time::Duration;
use nyx::LaunchError;
use std::env::{set_var, var};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

const LOG_VAR: &str = "LAUNCH_LOG";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Bounded search with the built-in driver (altitude, RAAN, inclination and argument of perigee by default)
    Driver,
    /// Generic bounded minimizer over a circular orbit (altitude, RAAN, inclination)
    External,
    /// Multi-start search from seeded random initial guesses
    Sweep,
    /// Single evaluation of the base parameters
    Evaluate,
}

/// Ground track uniformity of a launch, and bounded search of the launch parameters maximizing it.
#[derive(Parser, Debug)]
#[command(name = "nyx-launch", version, about)]
struct Cli {
    /// Number of samples of the analysis window
    #[arg(short = 'n', long)]
    samples: Option<usize>,
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = Mode::Driver)]
    mode: Mode,
    /// nelder-mead or projected-gradient
    #[arg(short, long)]
    optimizer: Option<OptimizerKind>,
    /// Maximum number of evaluations of each search
    #[arg(long)]
    max_iter: Option<usize>,
    /// Number of runs of the sweep
    #[arg(long)]
    runs: Option<usize>,
    /// Seed of the sweep
    #[arg(long)]
    seed: Option<u64>,
    /// Exports the ground track of the solution to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

fn report(eval: &Evaluation, elapsed: Duration) {
    let track = &eval.ground_track;
    let (lat_min, lat_max) = track.latitude_range().unwrap_or((f64::NAN, f64::NAN));
    let (lon_min, lon_max) = track.longitude_range().unwrap_or((f64::NAN, f64::NAN));
    println!("Parameters: {}", eval.params);
    println!(
        "Objective: {:.6e} (latitude {:.6e}, longitude {:.6e})",
        eval.objective, eval.latitude_score, eval.longitude_score
    );
    println!("Latitude: min {lat_min:.3} deg, max {lat_max:.3} deg");
    println!("Longitude: min {lon_min:.3} deg, max {lon_max:.3} deg");
    println!("Elapsed: {elapsed}");
}

fn run(cli: Cli) -> Result<(), LaunchError> {
    let mut cfg = match &cli.config {
        Some(path) => {
            info!("Loading configuration `{}`", path.display());
            LaunchConfig::load(path)?
        }
        None => LaunchConfig::default(),
    };

    if let Some(samples) = cli.samples {
        cfg.samples = samples;
    }
    if let Some(optimizer) = cli.optimizer {
        cfg.optimizer = optimizer;
    }
    if let Some(max_iter) = cli.max_iter {
        cfg.search.max_iterations = max_iter;
    }
    if let Some(runs) = cli.runs {
        cfg.sweep.runs = runs;
    }
    if let Some(seed) = cli.seed {
        cfg.sweep.seed = seed;
    }
    if cli.mode == Mode::External && cfg.variables.is_none() {
        cfg.layout = LayoutKind::Circular;
    }

    let tick = Instant::now();
    let pipeline = cfg.pipeline()?;
    info!("Evaluating over {}", pipeline.grid());
    let layout = cfg.layout();

    let evaluation = match cli.mode {
        Mode::Evaluate => pipeline.evaluate(&cfg.base)?,
        Mode::Driver => {
            let solution = Search::new(
                &pipeline,
                layout,
                cfg.optimizer,
                cfg.tolerances,
                cfg.search,
            )?
            .solve()?;
            info!("{solution}");
            solution.evaluation
        }
        Mode::External => {
            layout.validate()?;
            let objective = LaunchObjective::new(&pipeline, &layout, cfg.search.penalty);
            let result = minimize_bounded(
                |x| objective.value(x),
                &layout.initial_guess(),
                layout.bounds()?,
                cfg.optimizer,
                cfg.tolerances,
                cfg.search.max_iterations,
            )?;
            info!(
                "{} evaluations ({:?})",
                result.evaluations, result.convergence
            );
            pipeline.evaluate(&layout.to_parameters(&result.x)?)?
        }
        Mode::Sweep => {
            let sweep = cfg.multistart("nyx-launch");
            let results = sweep.run(&pipeline, &layout)?;
            info!("{results}");
            match results.best().map(|best| best.evaluation.clone()) {
                Some(evaluation) => evaluation,
                None => {
                    // Every run failed: report the failure of the first one
                    return match results.runs.into_iter().find_map(|run| run.outcome.err()) {
                        Some(e) => Err(e.into()),
                        None => Ok(()),
                    };
                }
            }
        }
    };

    let elapsed: Duration = tick.elapsed().into();
    report(&evaluation, elapsed);

    if let Some(path) = &cli.export {
        export_ground_track(path, pipeline.grid(), &evaluation.ground_track)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }

    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error kind: {}", e.kind());
            match e.params() {
                Some(params) => eprintln!("Parameters: {params}"),
                None => eprintln!("Parameters: n/a"),
            }
            ExitCode::FAILURE
        }
    }
}
