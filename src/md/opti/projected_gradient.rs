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

use super::{Bounds, BoundedOptimizer, Convergence, OptimizerOptions, SearchError};
use crate::linalg::DVector;

/// Sufficient decrease constant of the Armijo condition
const ARMIJO_C: f64 = 1e-4;

enum Phase {
    /// Objective at the current point
    Base,
    /// Forward difference along the `index`-th axis, with a signed step `h`
    Gradient { index: usize, h: f64 },
    /// Projected trial point of the line search
    LineSearch { trial: DVector<f64> },
}

/// Projected steepest descent in the unit hypercube of the bounds.
///
/// The gradient is computed by forward finite differences (backward on the upper bound), and the step
/// along the projected steepest descent path is found by an Armijo backtracking line search.
pub struct ProjectedGradient {
    bounds: Bounds,
    opts: OptimizerOptions,
    x: DVector<f64>,
    fx: f64,
    grad: DVector<f64>,
    alpha: f64,
    phase: Phase,
    candidate: Option<DVector<f64>>,
    best: Option<(DVector<f64>, f64)>,
    convergence: Convergence,
}

impl ProjectedGradient {
    pub fn new(bounds: Bounds, x0: &DVector<f64>, opts: OptimizerOptions) -> Result<Self, SearchError> {
        bounds.check_guess(x0)?;
        opts.validate()?;

        let x = bounds.to_unit(x0);
        let dim = bounds.dim();
        Ok(Self {
            bounds,
            opts,
            x: x.clone(),
            fx: f64::INFINITY,
            grad: DVector::zeros(dim),
            alpha: opts.initial_step,
            phase: Phase::Base,
            candidate: Some(x),
            best: None,
            convergence: Convergence::Pending,
        })
    }

    fn project(&self, u: DVector<f64>) -> DVector<f64> {
        u.map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) })
    }

    fn start_gradient(&mut self, index: usize) {
        let mut h = self.opts.fd_step;
        if self.x[index] + h > 1.0 {
            h = -h;
        }
        let mut probe = self.x.clone();
        probe[index] += h;
        self.phase = Phase::Gradient { index, h };
        self.candidate = Some(probe);
    }

    fn start_line_search(&mut self) {
        let trial = self.project(&self.x - self.alpha * &self.grad);
        if (&trial - &self.x).amax() <= self.opts.xtol {
            // The projected gradient vanishes
            self.convergence = Convergence::StepTolerance;
            self.candidate = None;
        } else {
            self.candidate = Some(trial.clone());
            self.phase = Phase::LineSearch { trial };
        }
    }
}

impl BoundedOptimizer for ProjectedGradient {
    fn name(&self) -> &'static str {
        "Projected gradient"
    }

    fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    fn propose(&mut self) -> Option<DVector<f64>> {
        if self.convergence.is_converged() {
            return None;
        }
        self.candidate
            .as_ref()
            .map(|u| self.bounds.clamp(&self.bounds.from_unit(u)))
    }

    fn observe(&mut self, value: f64) {
        let u = match self.candidate.take() {
            Some(u) => u,
            None => return,
        };
        let value = if value.is_nan() { f64::INFINITY } else { value };

        if self.best.as_ref().map_or(true, |(_, f)| value < *f) {
            self.best = Some((u, value));
        }

        match std::mem::replace(&mut self.phase, Phase::Base) {
            Phase::Base => {
                self.fx = value;
                self.start_gradient(0);
            }
            Phase::Gradient { index, h } => {
                self.grad[index] = (value - self.fx) / h;
                if index + 1 < self.bounds.dim() {
                    self.start_gradient(index + 1);
                } else {
                    self.start_line_search();
                }
            }
            Phase::LineSearch { trial } => {
                let step = &trial - &self.x;
                if value <= self.fx + ARMIJO_C * self.grad.dot(&step) {
                    let decrease = self.fx - value;
                    self.x = trial;
                    self.fx = value;
                    self.alpha *= 2.0;

                    if decrease <= self.opts.ftol {
                        self.convergence = Convergence::ObjectiveTolerance;
                    } else if step.amax() <= self.opts.xtol {
                        self.convergence = Convergence::StepTolerance;
                    } else {
                        self.start_gradient(0);
                    }
                } else {
                    self.alpha *= 0.5;
                    self.start_line_search();
                }
            }
        }
    }

    fn convergence(&self) -> Convergence {
        self.convergence
    }

    fn best(&self) -> Option<(DVector<f64>, f64)> {
        self.best
            .as_ref()
            .map(|(u, f)| (self.bounds.clamp(&self.bounds.from_unit(u)), *f))
    }
}
