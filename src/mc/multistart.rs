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

use super::rand_distr::{Distribution, Uniform};
use super::results::{StartResult, SweepResults};
use super::Pcg64Mcg;
use crate::cosmic::InitialStateProvider;
use crate::linalg::DVector;
use crate::md::opti::{OptimizerKind, OptimizerOptions, Search, SearchError, SearchOptions};
use crate::md::{DesignLayout, Pipeline};
use crate::propagators::OrbitPropagator;
use crate::time::Duration;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fmt;
use std::time::Instant as StdInstant;

/// Multi-start search, automatically running on all threads via a thread pool.
///
/// The first run starts from the initial guess of the layout, and the others from points drawn
/// uniformly within the bounds. Each run is an independent search of the same pipeline.
#[derive(Clone, Debug)]
pub struct MultiStart {
    /// Seed of the [64bit PCG random number generator](https://www.pcg-random.org/index.html)
    pub seed: u64,
    /// Number of searches
    pub runs: usize,
    pub kind: OptimizerKind,
    pub optimizer_opts: OptimizerOptions,
    pub search_opts: SearchOptions,
    /// Name of this sweep, will be reflected in the progress bar and in the output structure
    pub scenario: String,
}

impl MultiStart {
    pub fn new<S: Into<String>>(scenario: S, seed: u64, runs: usize) -> Self {
        Self {
            seed,
            runs,
            kind: OptimizerKind::default(),
            optimizer_opts: OptimizerOptions::default(),
            search_opts: SearchOptions::default(),
            scenario: scenario.into(),
        }
    }

    // Just the template for the progress bar
    fn progress_bar(&self) -> ProgressBar {
        let pb = ProgressBar::new(self.runs as u64);
        match ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:100.cyan/blue} {pos:>7}/{len:7} {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("##-")),
            Err(e) => warn!("default progress bar used: {e}"),
        }
        pb.set_message(format!("{self}"));
        pb
    }

    /// Set up the seed and generate the initial guesses. This is useful for checking the guesses before running a large sweep.
    pub fn generate_guesses(
        &self,
        layout: &DesignLayout,
    ) -> Result<Vec<(usize, DVector<f64>)>, SearchError> {
        let bounds = layout.bounds()?;
        let mut rng = Pcg64Mcg::new(self.seed.into());
        let unit = Uniform::new_inclusive(0.0, 1.0);

        let mut guesses = Vec::with_capacity(self.runs);
        for index in 0..self.runs {
            let guess = if index == 0 {
                layout.initial_guess()
            } else {
                let u = DVector::from_fn(bounds.dim(), |_, _| unit.sample(&mut rng));
                bounds.clamp(&bounds.from_unit(&u))
            };
            guesses.push((index, guess));
        }
        Ok(guesses)
    }

    /// Runs one search per initial guess, in parallel. Runs are sorted by index.
    ///
    /// Fails only if the layout is invalid: failures of individual runs are reported in their result.
    #[must_use = "Multi-start results must be used"]
    pub fn run<I, P>(
        &self,
        pipeline: &Pipeline<I, P>,
        layout: &DesignLayout,
    ) -> Result<SweepResults, SearchError>
    where
        I: InitialStateProvider,
        P: OrbitPropagator,
    {
        layout.validate()?;
        let guesses = self.generate_guesses(layout)?;
        let pb = self.progress_bar();

        let start = StdInstant::now();
        let mut runs: Vec<StartResult> = guesses
            .into_par_iter()
            .progress_with(pb)
            .map(|(index, guess)| {
                let mut run_layout = layout.clone();
                for (var, val) in run_layout.variables.iter_mut().zip(guess.iter()) {
                    var.init_guess = *val;
                }
                let outcome = Search::new(
                    pipeline,
                    run_layout,
                    self.kind,
                    self.optimizer_opts,
                    self.search_opts,
                )
                .and_then(|search| search.solve());
                if let Err(e) = &outcome {
                    warn!("run #{index} failed: {e}");
                }
                StartResult {
                    index,
                    guess,
                    outcome,
                }
            })
            .collect();
        runs.sort_by_key(|run| run.index);

        let clock_time: Duration = start.elapsed().into();
        info!("Done in {}", clock_time);

        Ok(SweepResults {
            runs,
            seed: self.seed,
            scenario: self.scenario.clone(),
        })
    }
}

impl fmt::Display for MultiStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} multi-start - seed: {}",
            self.scenario, self.kind, self.seed
        )
    }
}
