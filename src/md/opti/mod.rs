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

use crate::errors::ErrorKind;
use crate::linalg::DVector;
use crate::md::EvaluationError;
use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;
use std::str::FromStr;
use typed_builder::TypedBuilder;

/// Derivative free simplex search, projecting every vertex onto the bounds.
pub mod nelder_mead;
pub use nelder_mead::NelderMead;
/// Steepest descent with a forward finite difference gradient and a projected Armijo line search.
pub mod projected_gradient;
pub use projected_gradient::ProjectedGradient;
mod minimize;
pub use minimize::{minimize_bounded, LaunchObjective, MinimizeResult};
mod search;
pub use search::{Search, SearchOptions, SearchState};
pub mod solution;
pub use solution::SearchSolution;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SearchError {
    #[snafu(display("invalid bounds: {reason}"))]
    InvalidBounds { reason: String },
    #[snafu(display("invalid design variable: {reason}"))]
    InvalidVariable { reason: String },
    #[snafu(display("invalid search options: {reason}"))]
    InvalidOptions { reason: String },
    #[snafu(display("expected a design vector of {expected} values but got {got}"))]
    DimensionMismatch { expected: usize, got: usize },
    #[snafu(display("initial guess is infeasible: {reason}"))]
    InfeasibleGuess { reason: String },
    #[snafu(display("no evaluation succeeded in {iterations} iterations{}", fmt_last(last)))]
    NoFeasiblePoint {
        iterations: usize,
        last: Option<Box<EvaluationError>>,
    },
}

fn fmt_last(last: &Option<Box<EvaluationError>>) -> String {
    match last {
        Some(e) => format!(", last failure: {e}"),
        None => String::new(),
    }
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFeasiblePoint {
                last: Some(source), ..
            } => source.kind(),
            _ => ErrorKind::InvalidInput,
        }
    }

    /// Parameters of the last failed evaluation, if any
    pub fn params(&self) -> Option<&crate::cosmic::OrbitalParameters> {
        match self {
            Self::NoFeasiblePoint {
                last: Some(source), ..
            } => Some(source.params()),
            _ => None,
        }
    }
}

/// Box constraints of a design vector, `lower[i] < upper[i]` for every component.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    lower: DVector<f64>,
    upper: DVector<f64>,
}

impl Bounds {
    pub fn try_new(lower: DVector<f64>, upper: DVector<f64>) -> Result<Self, SearchError> {
        ensure!(
            lower.len() == upper.len(),
            InvalidBoundsSnafu {
                reason: format!(
                    "{} lower bounds but {} upper bounds",
                    lower.len(),
                    upper.len()
                )
            }
        );
        ensure!(
            !lower.is_empty(),
            InvalidBoundsSnafu {
                reason: "no dimension".to_string()
            }
        );
        for (i, (lo, hi)) in lower.iter().zip(upper.iter()).enumerate() {
            ensure!(
                lo.is_finite() && hi.is_finite() && lo < hi,
                InvalidBoundsSnafu {
                    reason: format!("component #{i}: [{lo}, {hi}]")
                }
            );
        }
        Ok(Self { lower, upper })
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &DVector<f64> {
        &self.lower
    }

    pub fn upper(&self) -> &DVector<f64> {
        &self.upper
    }

    /// Whether `x` has the right dimension and every component is finite and within bounds
    pub fn contains(&self, x: &DVector<f64>) -> bool {
        x.len() == self.dim()
            && x.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(v, (lo, hi))| v.is_finite() && v >= lo && v <= hi)
    }

    /// Projects `x` onto the box. NaN components are moved to the lower bound.
    pub fn clamp(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.dim(),
            x.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .map(|(v, (lo, hi))| if v.is_nan() { *lo } else { (*v).clamp(*lo, *hi) }),
        )
    }

    /// Maps `x` into the unit hypercube
    pub fn to_unit(&self, x: &DVector<f64>) -> DVector<f64> {
        (x - &self.lower).component_div(&(&self.upper - &self.lower))
    }

    /// Maps a point of the unit hypercube back into the box
    pub fn from_unit(&self, u: &DVector<f64>) -> DVector<f64> {
        &self.lower + u.component_mul(&(&self.upper - &self.lower))
    }

    pub(crate) fn check_guess(&self, x0: &DVector<f64>) -> Result<(), SearchError> {
        ensure!(
            x0.len() == self.dim(),
            DimensionMismatchSnafu {
                expected: self.dim(),
                got: x0.len()
            }
        );
        ensure!(
            self.contains(x0),
            InfeasibleGuessSnafu {
                reason: format!("{} is not within the bounds", fmt_vec(x0))
            }
        );
        Ok(())
    }
}

pub(crate) fn fmt_vec(x: &DVector<f64>) -> String {
    let vals: Vec<String> = x.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", vals.join(", "))
}

/// Whether an optimizer has met its tolerances.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Convergence {
    Pending,
    /// The candidates moved less than the step tolerance
    StepTolerance,
    /// The objective changed less than the objective tolerance
    ObjectiveTolerance,
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        *self != Self::Pending
    }
}

/// A minimizer of a scalar objective under box constraints, driven one candidate at a time.
///
/// Every candidate returned by `propose` must be within `bounds`, and is followed by exactly one
/// call to `observe` with the objective of that candidate.
pub trait BoundedOptimizer: Send {
    fn name(&self) -> &'static str;

    fn bounds(&self) -> &Bounds;

    /// Next candidate to evaluate, or None once converged
    fn propose(&mut self) -> Option<DVector<f64>>;

    /// Objective of the last proposed candidate
    fn observe(&mut self, value: f64);

    fn convergence(&self) -> Convergence;

    /// Best candidate observed so far and its objective
    fn best(&self) -> Option<(DVector<f64>, f64)>;
}

impl<T: BoundedOptimizer + ?Sized> BoundedOptimizer for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn bounds(&self) -> &Bounds {
        (**self).bounds()
    }

    fn propose(&mut self) -> Option<DVector<f64>> {
        (**self).propose()
    }

    fn observe(&mut self, value: f64) {
        (**self).observe(value)
    }

    fn convergence(&self) -> Convergence {
        (**self).convergence()
    }

    fn best(&self) -> Option<(DVector<f64>, f64)> {
        (**self).best()
    }
}

/// Tolerances and steps of the optimizers, expressed in the unit hypercube of the bounds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct OptimizerOptions {
    /// Converged when the candidates move less than this
    #[builder(default = 1e-6)]
    pub xtol: f64,
    /// Converged when the objective changes less than this
    #[builder(default = 1e-9)]
    pub ftol: f64,
    /// Size of the initial simplex, or initial line search step
    #[builder(default = 0.1)]
    pub initial_step: f64,
    /// Forward finite difference step
    #[builder(default = 1e-6)]
    pub fd_step: f64,
}

impl OptimizerOptions {
    pub(crate) fn validate(&self) -> Result<(), SearchError> {
        ensure!(
            self.xtol.is_finite() && self.xtol >= 0.0 && self.ftol.is_finite() && self.ftol >= 0.0,
            InvalidOptionsSnafu {
                reason: format!("tolerances must be non negative: xtol = {}, ftol = {}", self.xtol, self.ftol)
            }
        );
        ensure!(
            self.initial_step > 0.0 && self.initial_step <= 1.0,
            InvalidOptionsSnafu {
                reason: format!("initial step must be in (0, 1], got {}", self.initial_step)
            }
        );
        ensure!(
            self.fd_step > 0.0 && self.fd_step < 0.5,
            InvalidOptionsSnafu {
                reason: format!("finite difference step must be in (0, 0.5), got {}", self.fd_step)
            }
        );
        Ok(())
    }
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The available optimizers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerKind {
    #[default]
    NelderMead,
    ProjectedGradient,
}

impl OptimizerKind {
    /// Initializes this optimizer at `x0`, which must be within the bounds.
    pub fn build(
        &self,
        bounds: Bounds,
        x0: &DVector<f64>,
        opts: OptimizerOptions,
    ) -> Result<Box<dyn BoundedOptimizer>, SearchError> {
        Ok(match self {
            Self::NelderMead => Box::new(NelderMead::new(bounds, x0, opts)?),
            Self::ProjectedGradient => Box::new(ProjectedGradient::new(bounds, x0, opts)?),
        })
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nelder-mead" | "nm" | "simplex" => Ok(Self::NelderMead),
            "projected-gradient" | "pg" | "gradient" => Ok(Self::ProjectedGradient),
            _ => Err(format!("unknown optimizer `{s}`")),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NelderMead => write!(f, "nelder-mead"),
            Self::ProjectedGradient => write!(f, "projected-gradient"),
        }
    }
}

#[cfg(test)]
mod ut_opti {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bounds() -> Bounds {
        Bounds::try_new(
            DVector::from_vec(vec![500.0, -180.0, 0.0]),
            DVector::from_vec(vec![1000.0, 180.0, 90.0]),
        )
        .unwrap()
    }

    #[test]
    fn clamp_and_unit() {
        let b = bounds();
        let x = DVector::from_vec(vec![1200.0, -200.0, f64::NAN]);
        let clamped = b.clamp(&x);
        assert_eq!(clamped, DVector::from_vec(vec![1000.0, -180.0, 0.0]));
        assert!(b.contains(&clamped));
        assert!(!b.contains(&x));

        let y = DVector::from_vec(vec![750.0, 0.0, 45.0]);
        let u = b.to_unit(&y);
        assert_abs_diff_eq!(u, DVector::from_vec(vec![0.5, 0.5, 0.5]), epsilon = 1e-15);
        assert_abs_diff_eq!(b.from_unit(&u), y, epsilon = 1e-12);
    }

    #[test]
    fn invalid_bounds() {
        let lo = DVector::from_vec(vec![0.0, 1.0]);
        assert!(Bounds::try_new(lo.clone(), DVector::from_vec(vec![1.0])).is_err());
        assert!(Bounds::try_new(lo.clone(), DVector::from_vec(vec![1.0, 1.0])).is_err());
        assert!(Bounds::try_new(DVector::zeros(0), DVector::zeros(0)).is_err());
        let err = Bounds::try_new(lo, DVector::from_vec(vec![f64::INFINITY, 2.0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn infeasible_guess() {
        let b = bounds();
        for kind in enum_iterator::all::<OptimizerKind>() {
            let x0 = DVector::from_vec(vec![400.0, 0.0, 45.0]);
            assert!(matches!(
                kind.build(b.clone(), &x0, OptimizerOptions::default()),
                Err(SearchError::InfeasibleGuess { .. })
            ));
            let x0 = DVector::from_vec(vec![600.0, 0.0]);
            assert!(matches!(
                kind.build(b.clone(), &x0, OptimizerOptions::default()),
                Err(SearchError::DimensionMismatch { .. })
            ));
        }
        assert_eq!("pg".parse::<OptimizerKind>(), Ok(OptimizerKind::ProjectedGradient));
        assert!("bfgs".parse::<OptimizerKind>().is_err());
    }
}
