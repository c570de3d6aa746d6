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

use super::{fmt_vec, SearchState};
use crate::cosmic::OrbitalParameters;
use crate::linalg::DVector;
use crate::md::Evaluation;
use crate::time::Duration;
use std::fmt;

/// Defines a search solution
#[derive(Clone, Debug)]
pub struct SearchSolution {
    /// The best launch parameters found
    pub params: OrbitalParameters,
    /// The design vector of these parameters
    pub design: DVector<f64>,
    /// The objective of these parameters
    pub objective: f64,
    /// The evaluation of these parameters, including the ground track
    pub evaluation: Evaluation,
    /// How the search ended
    pub state: SearchState,
    /// Name of the optimizer
    pub optimizer: &'static str,
    /// The number of iterations performed
    pub iterations: usize,
    /// The number of iterations whose evaluation failed
    pub failed_evaluations: usize,
    /// Computation duration
    pub duration: Duration,
}

impl fmt::Display for SearchSolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let track = &self.evaluation.ground_track;
        let (lat_min, lat_max) = track.latitude_range().unwrap_or((f64::NAN, f64::NAN));
        let (lon_min, lon_max) = track.longitude_range().unwrap_or((f64::NAN, f64::NAN));
        write!(
            f,
            "{} search {} in {} ({} iterations, {} failed evaluations):\n\t{}\n\tdesign = {}\n\tobjective = {:.6e} (latitude {:.6e}, longitude {:.6e})\n\tlatitude in [{:.3}, {:.3}] deg\n\tlongitude in [{:.3}, {:.3}] deg",
            self.optimizer,
            self.state,
            self.duration,
            self.iterations,
            self.failed_evaluations,
            self.params,
            fmt_vec(&self.design),
            self.objective,
            self.evaluation.latitude_score,
            self.evaluation.longitude_score,
            lat_min,
            lat_max,
            lon_min,
            lon_max
        )
    }
}
