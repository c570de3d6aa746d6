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

use super::uniformity::uniformity;
use super::{
    EvaluationError, GroundTrackProjectionSnafu, HistoryLengthSnafu, InitialStateSnafu,
    PropagationSnafu, UniformitySnafu,
};
use crate::cosmic::groundtrack::project;
use crate::cosmic::{
    earth_orientation, AstroError, DcmStack, GroundTrack, InitialStateProvider, Injection,
    OrbitalParameters, ShapeMismatchSnafu, SpinModel, TimeGrid, UniformSpin,
};
use crate::propagators::{DefaultPropagator, OrbitPropagator};
use serde_derive::Serialize;
use snafu::{ensure, ResultExt};
use std::fmt;

/// Result of one evaluation of the launch parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub params: OrbitalParameters,
    /// Uniformity score of the latitudes
    pub latitude_score: f64,
    /// Uniformity score of the longitudes
    pub longitude_score: f64,
    /// Sum of both scores, lower is more uniform
    pub objective: f64,
    pub ground_track: GroundTrack,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: objective = {:.6e} (latitude {:.6e}, longitude {:.6e}), {}",
            self.params,
            self.objective,
            self.latitude_score,
            self.longitude_score,
            self.ground_track
        )
    }
}

/// The launch evaluation pipeline: initial state, propagation, ground track and uniformity scores.
///
/// The rotation stack of the Earth only depends on the time grid, so it is computed once
/// when the pipeline is built. Evaluating does not mutate the pipeline, which may be shared across threads.
#[derive(Clone)]
pub struct Pipeline<I = Injection, P = DefaultPropagator>
where
    I: InitialStateProvider,
    P: OrbitPropagator,
{
    grid: TimeGrid,
    dcms: DcmStack,
    injector: I,
    propagator: P,
}

impl Pipeline {
    /// Default pipeline over the provided time grid: uniform Earth spin, injection at the default
    /// true anomaly and RK4 propagation with J2 to J4 zonal harmonics.
    pub fn new(grid: TimeGrid) -> Result<Self, AstroError> {
        Self::with(
            grid,
            &UniformSpin::default(),
            Injection::default(),
            DefaultPropagator::default(),
        )
    }
}

impl<I, P> Pipeline<I, P>
where
    I: InitialStateProvider,
    P: OrbitPropagator,
{
    /// Builds the pipeline, computing the rotation stack of the Earth with the provided spin model.
    pub fn with<S: SpinModel + ?Sized>(
        grid: TimeGrid,
        spin: &S,
        injector: I,
        propagator: P,
    ) -> Result<Self, AstroError> {
        let dcms = earth_orientation(grid.samples(), spin)?;
        Self::from_parts(grid, dcms, injector, propagator)
    }

    /// Builds the pipeline from an existing rotation stack, which must have one matrix per sample.
    pub fn from_parts(
        grid: TimeGrid,
        dcms: DcmStack,
        injector: I,
        propagator: P,
    ) -> Result<Self, AstroError> {
        ensure!(
            dcms.len() == grid.len(),
            ShapeMismatchSnafu {
                what: "Earth rotation stack",
                expected: grid.len(),
                got: dcms.len()
            }
        );
        debug!("Launch pipeline over {grid}");
        Ok(Self {
            grid,
            dcms,
            injector,
            propagator,
        })
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn dcms(&self) -> &DcmStack {
        &self.dcms
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    pub fn propagator(&self) -> &P {
        &self.propagator
    }

    /// Evaluates the uniformity of the ground track of the provided launch parameters.
    pub fn evaluate(&self, params: &OrbitalParameters) -> Result<Evaluation, EvaluationError> {
        let params = *params;

        let initial_state = self
            .injector
            .initial_state(&params)
            .context(InitialStateSnafu { params })?;

        let history = self
            .propagator
            .propagate(&initial_state, self.grid.step_s(), self.grid.len())
            .context(PropagationSnafu { params })?;

        ensure!(
            history.len() == self.grid.len(),
            HistoryLengthSnafu {
                params,
                expected: self.grid.len(),
                got: history.len()
            }
        );

        let ground_track =
            project(&history, &self.dcms).context(GroundTrackProjectionSnafu { params })?;

        let latitude_score = uniformity(&ground_track.latitudes_deg).context(UniformitySnafu {
            params,
            which: "latitude",
        })?;
        let longitude_score = uniformity(&ground_track.longitudes_deg).context(UniformitySnafu {
            params,
            which: "longitude",
        })?;

        let objective = latitude_score + longitude_score;
        debug!("{params} -> {objective:.6e}");

        Ok(Evaluation {
            params,
            latitude_score,
            longitude_score,
            objective,
            ground_track,
        })
    }

    /// Returns only the objective of the evaluation
    pub fn objective(&self, params: &OrbitalParameters) -> Result<f64, EvaluationError> {
        Ok(self.evaluate(params)?.objective)
    }
}

#[cfg(test)]
mod ut_pipeline {
    use super::*;
    use crate::cosmic::EARTH_RADIUS_KM;
    use crate::errors::ErrorKind;

    #[test]
    fn default_launch() {
        let pipeline = Pipeline::new(TimeGrid::default()).unwrap();
        let eval = pipeline.evaluate(&OrbitalParameters::default()).unwrap();
        assert_eq!(eval.ground_track.len(), 200);
        assert!(eval.objective.is_finite() && eval.objective >= 0.0);
        assert_eq!(eval.objective, eval.latitude_score + eval.longitude_score);
        // Evaluating twice yields the same record
        assert_eq!(eval, pipeline.evaluate(&OrbitalParameters::default()).unwrap());
    }

    #[test]
    fn failures_carry_parameters() {
        let pipeline = Pipeline::new(TimeGrid::new(10, 0.0, 600.0).unwrap()).unwrap();
        let underground = OrbitalParameters::circular(-EARTH_RADIUS_KM - 10.0, 0.0, 0.0);
        let err = pipeline.evaluate(&underground).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.params(), &underground);

        let too_low = OrbitalParameters::circular(-100.0, 0.0, 0.0);
        let err = pipeline.evaluate(&too_low).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropagationFailure);
    }

    #[test]
    fn mismatched_stack() {
        let grid = TimeGrid::new(10, 0.0, 600.0).unwrap();
        assert!(Pipeline::from_parts(
            grid,
            DcmStack::identity(9),
            Injection::default(),
            DefaultPropagator::default()
        )
        .is_err());
    }
}
