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

use super::{fmt_vec, BoundedOptimizer, Bounds, Convergence, OptimizerKind, OptimizerOptions, SearchError};
use crate::cosmic::InitialStateProvider;
use crate::linalg::DVector;
use crate::md::{DesignLayout, Pipeline};
use crate::propagators::OrbitPropagator;

/// Result of `minimize_bounded`.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimizeResult {
    /// Best point found
    pub x: DVector<f64>,
    /// Objective at that point
    pub value: f64,
    /// Number of calls to the objective
    pub evaluations: usize,
    pub convergence: Convergence,
}

/// Minimizes any objective under box constraints, starting from `x0`, with at most `max_evals` calls to `f`.
///
/// `f` is only ever called with points within the bounds.
pub fn minimize_bounded<F>(
    mut f: F,
    x0: &DVector<f64>,
    bounds: Bounds,
    kind: OptimizerKind,
    opts: OptimizerOptions,
    max_evals: usize,
) -> Result<MinimizeResult, SearchError>
where
    F: FnMut(&DVector<f64>) -> f64,
{
    let mut optimizer = kind.build(bounds, x0, opts)?;

    let mut evaluations = 0;
    while evaluations < max_evals {
        match optimizer.propose() {
            Some(x) => {
                let value = f(&x);
                evaluations += 1;
                optimizer.observe(value);
            }
            None => break,
        }
    }

    match optimizer.best() {
        Some((x, value)) => {
            debug!(
                "{} minimized to {:.6e} at {} in {} evaluations",
                optimizer.name(),
                value,
                fmt_vec(&x),
                evaluations
            );
            Ok(MinimizeResult {
                x,
                value,
                evaluations,
                convergence: optimizer.convergence(),
            })
        }
        None => super::NoFeasiblePointSnafu {
            iterations: evaluations,
            last: None,
        }
        .fail(),
    }
}

/// Exposes a pipeline as a plain objective of the design vector, for use with `minimize_bounded`.
///
/// Failed evaluations, or design vectors of the wrong dimension, return the penalty.
pub struct LaunchObjective<'a, I, P>
where
    I: InitialStateProvider,
    P: OrbitPropagator,
{
    pub pipeline: &'a Pipeline<I, P>,
    pub layout: &'a DesignLayout,
    pub penalty: f64,
}

impl<'a, I, P> LaunchObjective<'a, I, P>
where
    I: InitialStateProvider,
    P: OrbitPropagator,
{
    pub fn new(pipeline: &'a Pipeline<I, P>, layout: &'a DesignLayout, penalty: f64) -> Self {
        Self {
            pipeline,
            layout,
            penalty,
        }
    }

    pub fn value(&self, design: &DVector<f64>) -> f64 {
        let params = match self.layout.to_parameters(design) {
            Ok(params) => params,
            Err(e) => {
                warn!("{e}");
                return self.penalty;
            }
        };
        match self.pipeline.objective(&params) {
            Ok(objective) => objective,
            Err(e) => {
                warn!("evaluation failed ({}): {e}", e.kind());
                self.penalty
            }
        }
    }
}
