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

use super::{
    fmt_vec, BoundedOptimizer, Bounds, InvalidOptionsSnafu, NoFeasiblePointSnafu,
    OptimizerKind, OptimizerOptions, SearchError, SearchSolution,
};
use crate::cosmic::InitialStateProvider;
use crate::linalg::DVector;
use crate::md::{DesignLayout, Evaluation, EvaluationError, Pipeline};
use crate::propagators::OrbitPropagator;
use crate::time::Duration;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
use typed_builder::TypedBuilder;

/// Lifecycle of a search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    Initialized,
    Iterating,
    Converged,
    IterationLimitReached,
    /// No evaluation succeeded
    Failed,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Converged | Self::IterationLimitReached | Self::Failed
        )
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct SearchOptions {
    /// Maximum number of evaluations of the pipeline
    #[builder(default = 200)]
    pub max_iterations: usize,
    /// Objective reported to the optimizer when an evaluation fails
    #[builder(default = 1e6)]
    pub penalty: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Bounded search of the launch parameters minimizing the uniformity objective of a pipeline.
///
/// Each call to `step` is one iteration: one candidate from the optimizer, projected onto the
/// bounds, evaluated once. Failed evaluations are reported to the optimizer with the penalty objective.
pub struct Search<'a, I, P>
where
    I: InitialStateProvider,
    P: OrbitPropagator,
{
    pipeline: &'a Pipeline<I, P>,
    layout: DesignLayout,
    optimizer: Box<dyn BoundedOptimizer>,
    opts: SearchOptions,
    state: SearchState,
    iterations: usize,
    failed_evaluations: usize,
    best: Option<(DVector<f64>, Evaluation)>,
    last_error: Option<EvaluationError>,
    #[cfg(not(target_arch = "wasm32"))]
    start: Option<Instant>,
    elapsed: Duration,
}

impl<'a, I, P> Search<'a, I, P>
where
    I: InitialStateProvider,
    P: OrbitPropagator,
{
    /// Initializes a search from the initial guess of the layout.
    ///
    /// Fails if the layout or the options are invalid, or if the initial guess is outside of the bounds.
    pub fn new(
        pipeline: &'a Pipeline<I, P>,
        layout: DesignLayout,
        kind: OptimizerKind,
        optimizer_opts: OptimizerOptions,
        opts: SearchOptions,
    ) -> Result<Self, SearchError> {
        layout.validate()?;
        let optimizer = kind.build(layout.bounds()?, &layout.initial_guess(), optimizer_opts)?;
        Self::with_optimizer(pipeline, layout, optimizer, opts)
    }

    /// Initializes a search with the provided optimizer, whose bounds must match the dimension of the layout.
    pub fn with_optimizer(
        pipeline: &'a Pipeline<I, P>,
        layout: DesignLayout,
        optimizer: Box<dyn BoundedOptimizer>,
        opts: SearchOptions,
    ) -> Result<Self, SearchError> {
        layout.validate()?;
        ensure!(
            optimizer.bounds().dim() == layout.dim(),
            super::DimensionMismatchSnafu {
                expected: layout.dim(),
                got: optimizer.bounds().dim()
            }
        );
        ensure!(
            opts.max_iterations > 0,
            InvalidOptionsSnafu {
                reason: "at least one iteration is needed".to_string()
            }
        );
        ensure!(
            opts.penalty.is_finite(),
            InvalidOptionsSnafu {
                reason: format!("penalty must be finite, got {}", opts.penalty)
            }
        );

        info!(
            "{} search over {} variables, at most {} iterations",
            optimizer.name(),
            layout.dim(),
            opts.max_iterations
        );

        Ok(Self {
            pipeline,
            layout,
            optimizer,
            opts,
            state: SearchState::Initialized,
            iterations: 0,
            failed_evaluations: 0,
            best: None,
            last_error: None,
            #[cfg(not(target_arch = "wasm32"))]
            start: None,
            elapsed: Duration::ZERO,
        })
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn failed_evaluations(&self) -> usize {
        self.failed_evaluations
    }

    pub fn bounds(&self) -> &Bounds {
        self.optimizer.bounds()
    }

    pub fn layout(&self) -> &DesignLayout {
        &self.layout
    }

    /// Best evaluation so far
    pub fn best(&self) -> Option<&Evaluation> {
        self.best.as_ref().map(|(_, eval)| eval)
    }

    /// Performs one iteration and returns the new state. Does nothing once the search has ended.
    pub fn step(&mut self) -> Result<SearchState, SearchError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        #[cfg(not(target_arch = "wasm32"))]
        let tick = *self.start.get_or_insert_with(Instant::now);

        if self.iterations >= self.opts.max_iterations {
            warn!(
                "{} search reached the maximum number of iterations ({})",
                self.optimizer.name(),
                self.opts.max_iterations
            );
            self.finish(SearchState::IterationLimitReached);
        } else {
            match self.optimizer.propose() {
                None => {
                    info!(
                        "{} search converged ({:?}) after {} iterations",
                        self.optimizer.name(),
                        self.optimizer.convergence(),
                        self.iterations
                    );
                    self.finish(SearchState::Converged);
                }
                Some(candidate) => {
                    self.iterate(candidate)?;
                    self.state = SearchState::Iterating;
                }
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.elapsed = tick.elapsed().into();
        }

        Ok(self.state)
    }

    fn iterate(&mut self, candidate: DVector<f64>) -> Result<(), SearchError> {
        let bounds = self.optimizer.bounds();
        let design = bounds.clamp(&candidate);
        if design != candidate {
            warn!(
                "candidate {} projected onto the bounds: {}",
                fmt_vec(&candidate),
                fmt_vec(&design)
            );
        }
        let params = self.layout.to_parameters(&design)?;
        self.iterations += 1;

        match self.pipeline.evaluate(&params) {
            Ok(eval) => {
                debug!(
                    "#{} {} -> {:.6e}",
                    self.iterations, eval.params, eval.objective
                );
                self.optimizer.observe(eval.objective);
                let improved = self
                    .best
                    .as_ref()
                    .map_or(true, |(_, best)| eval.objective < best.objective);
                if improved {
                    self.best = Some((design, eval));
                }
            }
            Err(e) => {
                warn!(
                    "#{} evaluation failed ({}): {e}, reporting penalty {:e}",
                    self.iterations,
                    e.kind(),
                    self.opts.penalty
                );
                self.failed_evaluations += 1;
                self.optimizer.observe(self.opts.penalty);
                self.last_error = Some(e);
            }
        }
        Ok(())
    }

    fn finish(&mut self, terminal: SearchState) {
        self.state = if self.best.is_some() {
            terminal
        } else {
            error!(
                "no evaluation succeeded in {} iterations",
                self.iterations
            );
            SearchState::Failed
        };
    }

    /// Iterates until the search ends and returns its final state.
    pub fn run(&mut self) -> Result<SearchState, SearchError> {
        while !self.step()?.is_terminal() {}
        Ok(self.state)
    }

    /// Solution of the search, which must have ended.
    ///
    /// Fails with `NoFeasiblePoint` if no evaluation succeeded.
    pub fn into_solution(self) -> Result<SearchSolution, SearchError> {
        match self.best {
            Some((design, evaluation)) => Ok(SearchSolution {
                params: evaluation.params,
                design,
                objective: evaluation.objective,
                evaluation,
                state: self.state,
                optimizer: self.optimizer.name(),
                iterations: self.iterations,
                failed_evaluations: self.failed_evaluations,
                duration: self.elapsed,
            }),
            None => NoFeasiblePointSnafu {
                iterations: self.iterations,
                last: self.last_error.map(Box::new),
            }
            .fail(),
        }
    }

    /// Runs the search until it ends and returns its solution.
    pub fn solve(mut self) -> Result<SearchSolution, SearchError> {
        self.run()?;
        self.into_solution()
    }
}
