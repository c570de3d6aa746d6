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

use crate::cosmic::{AstroError, OrbitalParameters};
use crate::errors::ErrorKind;
use crate::propagators::PropagationError;
use snafu::prelude::*;

/// Scores how uniformly a sample is distributed from its kurtosis.
pub mod uniformity;
pub use uniformity::{excess_kurtosis, uniformity, UniformityError, UNIFORM_EXCESS_KURTOSIS};

mod pipeline;
pub use pipeline::{Evaluation, Pipeline};

mod param;
pub use param::{DesignLayout, DesignVariable, LayoutKind};

pub mod opti;

/// An evaluation of the launch parameters failed: the stage that failed, its cause and the offending parameters.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EvaluationError {
    #[snafu(display("initial state of {params}: {source}"))]
    InitialState {
        params: OrbitalParameters,
        source: AstroError,
    },
    #[snafu(display("propagation of {params}: {source}"))]
    Propagation {
        params: OrbitalParameters,
        source: PropagationError,
    },
    #[snafu(display("propagation of {params} returned {got} states instead of {expected}"))]
    HistoryLength {
        params: OrbitalParameters,
        expected: usize,
        got: usize,
    },
    #[snafu(display("ground track of {params}: {source}"))]
    GroundTrackProjection {
        params: OrbitalParameters,
        source: AstroError,
    },
    #[snafu(display("{which} uniformity of {params}: {source}"))]
    Uniformity {
        params: OrbitalParameters,
        which: &'static str,
        source: UniformityError,
    },
}

impl EvaluationError {
    /// Kind of the failure of the stage which aborted the evaluation
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InitialState { source, .. } | Self::GroundTrackProjection { source, .. } => {
                source.kind()
            }
            Self::Propagation { source, .. } => source.kind(),
            Self::HistoryLength { .. } => ErrorKind::PropagationFailure,
            Self::Uniformity { source, .. } => source.kind(),
        }
    }

    /// The parameters whose evaluation failed
    pub fn params(&self) -> &OrbitalParameters {
        match self {
            Self::InitialState { params, .. }
            | Self::Propagation { params, .. }
            | Self::HistoryLength { params, .. }
            | Self::GroundTrackProjection { params, .. }
            | Self::Uniformity { params, .. } => params,
        }
    }
}
