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
use crate::linalg::{Vector3, Vector6};
use snafu::prelude::*;

// Re-Export
mod propagator;
pub use propagator::*;
mod rk_methods;
pub use rk_methods::*;

/// Sampled inertial states (position in km, velocity in km/s), one per sample of the time grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateHistory {
    states: Vec<Vector6<f64>>,
}

impl StateHistory {
    pub fn new(states: Vec<Vector6<f64>>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Position of sample `index`, if it exists
    pub fn position(&self, index: usize) -> Option<Vector3<f64>> {
        self.states
            .get(index)
            .map(|s| s.fixed_rows::<3>(0).into_owned())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vector6<f64>> {
        self.states.iter()
    }
}

/// Propagates an initial state over `samples` uniformly spaced samples, `step_s` seconds apart.
///
/// The first sample of the history is the initial state itself.
pub trait OrbitPropagator: Send + Sync {
    fn propagate(
        &self,
        initial_state: &Vector6<f64>,
        step_s: f64,
        samples: usize,
    ) -> Result<StateHistory, PropagationError>;
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropagationError {
    #[snafu(display("step size must be positive and finite, got {step_s} s"))]
    InvalidStep { step_s: f64 },
    #[snafu(display("at least two samples are needed, got {samples}"))]
    TooFewSamples { samples: usize },
    #[snafu(display("state became non finite at sample #{index}"))]
    NonFiniteState { index: usize },
    #[snafu(display("orbit dropped below the surface at sample #{index} (|r| = {rmag_km:.3} km)"))]
    SurfaceImpact { index: usize, rmag_km: f64 },
}

impl PropagationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStep { .. } | Self::TooFewSamples { .. } => ErrorKind::InvalidInput,
            Self::NonFiniteState { .. } | Self::SurfaceImpact { .. } => {
                ErrorKind::PropagationFailure
            }
        }
    }
}
