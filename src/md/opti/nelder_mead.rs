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

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

enum Phase {
    /// Evaluating the vertices of a new or shrunk simplex
    Vertices,
    Reflect {
        centroid: DVector<f64>,
    },
    Expand {
        reflected: (DVector<f64>, f64),
    },
    Contract {
        threshold: f64,
        inside: bool,
    },
}

/// Nelder Mead simplex search in the unit hypercube of the bounds.
///
/// Every vertex is projected onto the hypercube, so all candidates are feasible. Converges when all
/// vertices are within `xtol` of the best one and their objectives within `ftol`.
pub struct NelderMead {
    bounds: Bounds,
    opts: OptimizerOptions,
    simplex: Vec<(DVector<f64>, f64)>,
    /// Vertices left to evaluate, last one first
    queued: Vec<DVector<f64>>,
    phase: Phase,
    candidate: Option<DVector<f64>>,
    best: Option<(DVector<f64>, f64)>,
    convergence: Convergence,
}

impl NelderMead {
    pub fn new(bounds: Bounds, x0: &DVector<f64>, opts: OptimizerOptions) -> Result<Self, SearchError> {
        bounds.check_guess(x0)?;
        opts.validate()?;

        let u0 = bounds.to_unit(x0);
        let dim = bounds.dim();
        let mut queued = Vec::with_capacity(dim);
        for i in 0..dim {
            let mut vertex = u0.clone();
            if vertex[i] + opts.initial_step <= 1.0 {
                vertex[i] += opts.initial_step;
            } else {
                vertex[i] -= opts.initial_step;
            }
            queued.push(unit_clamp(vertex));
        }
        queued.reverse();

        Ok(Self {
            bounds,
            opts,
            simplex: Vec::with_capacity(dim + 1),
            queued,
            phase: Phase::Vertices,
            candidate: Some(u0),
            best: None,
            convergence: Convergence::Pending,
        })
    }

    fn worst_index(&self) -> usize {
        self.simplex.len() - 1
    }

    /// Sets the next candidate, or flags the convergence
    fn advance(&mut self) {
        if let Some(vertex) = self.queued.pop() {
            self.phase = Phase::Vertices;
            self.candidate = Some(vertex);
            return;
        }

        self.simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let (x_best, f_best) = &self.simplex[0];
        let (mut x_spread, mut f_spread) = (0.0_f64, 0.0_f64);
        for (x, f) in &self.simplex[1..] {
            x_spread = x_spread.max((x - x_best).amax());
            f_spread = f_spread.max((f - f_best).abs());
        }
        if x_spread <= self.opts.xtol && f_spread <= self.opts.ftol {
            self.convergence = if x_spread <= f64::EPSILON {
                Convergence::StepTolerance
            } else {
                Convergence::ObjectiveTolerance
            };
            self.candidate = None;
            return;
        }

        let worst = self.worst_index();
        let mut centroid = DVector::zeros(self.bounds.dim());
        for (x, _) in &self.simplex[..worst] {
            centroid += x;
        }
        centroid /= worst as f64;

        let reflected = unit_clamp(&centroid + REFLECTION * (&centroid - &self.simplex[worst].0));
        self.phase = Phase::Reflect { centroid };
        self.candidate = Some(reflected);
    }

    fn replace_worst(&mut self, vertex: (DVector<f64>, f64)) {
        let worst = self.worst_index();
        self.simplex[worst] = vertex;
    }

    fn shrink(&mut self) {
        let x_best = self.simplex[0].0.clone();
        self.queued = self.simplex[1..]
            .iter()
            .rev()
            .map(|(x, _)| &x_best + SHRINK * (x - &x_best))
            .collect();
        self.simplex.truncate(1);
    }
}

fn unit_clamp(u: DVector<f64>) -> DVector<f64> {
    u.map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) })
}

impl BoundedOptimizer for NelderMead {
    fn name(&self) -> &'static str {
        "Nelder Mead"
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
            self.best = Some((u.clone(), value));
        }

        match std::mem::replace(&mut self.phase, Phase::Vertices) {
            Phase::Vertices => self.simplex.push((u, value)),
            Phase::Reflect { centroid } => {
                let worst = self.worst_index();
                let f_best = self.simplex[0].1;
                let f_second_worst = self.simplex[worst - 1].1;
                let (x_worst, f_worst) = self.simplex[worst].clone();

                if value < f_best {
                    let expanded = unit_clamp(&centroid + EXPANSION * (&u - &centroid));
                    self.phase = Phase::Expand {
                        reflected: (u, value),
                    };
                    self.candidate = Some(expanded);
                    return;
                } else if value < f_second_worst {
                    self.replace_worst((u, value));
                } else if value < f_worst {
                    let contracted = &centroid + CONTRACTION * (&u - &centroid);
                    self.phase = Phase::Contract {
                        threshold: value,
                        inside: false,
                    };
                    self.candidate = Some(contracted);
                    return;
                } else {
                    let contracted = &centroid + CONTRACTION * (&x_worst - &centroid);
                    self.phase = Phase::Contract {
                        threshold: f_worst,
                        inside: true,
                    };
                    self.candidate = Some(contracted);
                    return;
                }
            }
            Phase::Expand { reflected } => {
                if value < reflected.1 {
                    self.replace_worst((u, value));
                } else {
                    self.replace_worst(reflected);
                }
            }
            Phase::Contract { threshold, inside } => {
                let accepted = if inside {
                    value < threshold
                } else {
                    value <= threshold
                };
                if accepted {
                    self.replace_worst((u, value));
                } else {
                    self.shrink();
                }
            }
        }

        self.advance();
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
