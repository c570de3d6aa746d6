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
use crate::io::ConfigError;
use crate::md::opti::SearchError;
use crate::md::EvaluationError;
use snafu::prelude::*;
use std::fmt;

/// Classification of every failure this crate can raise, reported together with the offending parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed time grid, parameters, bounds or shapes
    InvalidInput,
    /// Zero norm position vector during the ground track projection
    DegenerateVector,
    /// Zero variance sample during the uniformity scoring
    DegenerateSample,
    /// The propagator could not produce a finite state history
    PropagationFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "InvalidInput"),
            Self::DegenerateVector => write!(f, "DegenerateVector"),
            Self::DegenerateSample => write!(f, "DegenerateSample"),
            Self::PropagationFailure => write!(f, "PropagationFailure"),
        }
    }
}

/// Top level error, used by the command line tool.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LaunchError {
    #[snafu(display("configuration error: {source}"))]
    Config { source: ConfigError },
    #[snafu(display("astro error: {source}"))]
    Astro { source: AstroError },
    #[snafu(display("evaluation failed: {source}"))]
    Evaluation { source: EvaluationError },
    #[snafu(display("parameter search failed: {source}"))]
    Search { source: SearchError },
}

impl LaunchError {
    /// Kind of the originating failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::InvalidInput,
            Self::Astro { source } => source.kind(),
            Self::Evaluation { source } => source.kind(),
            Self::Search { source } => source.kind(),
        }
    }

    /// Parameters whose evaluation failed, if the failure comes from an evaluation
    pub fn params(&self) -> Option<&OrbitalParameters> {
        match self {
            Self::Evaluation { source } => Some(source.params()),
            Self::Search { source } => source.params(),
            _ => None,
        }
    }
}

impl From<ConfigError> for LaunchError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}

impl From<AstroError> for LaunchError {
    fn from(source: AstroError) -> Self {
        Self::Astro { source }
    }
}

impl From<EvaluationError> for LaunchError {
    fn from(source: EvaluationError) -> Self {
        Self::Evaluation { source }
    }
}

impl From<SearchError> for LaunchError {
    fn from(source: SearchError) -> Self {
        Self::Search { source }
    }
}
