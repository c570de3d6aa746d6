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

use super::rk_methods::{RK, RK4Fixed};
use super::{
    InvalidStepSnafu, NonFiniteStateSnafu, OrbitPropagator, PropagationError, StateHistory,
    SurfaceImpactSnafu, TooFewSamplesSnafu,
};
use crate::cosmic::EARTH_RADIUS_KM;
use crate::dynamics::{Dynamics, OrbitalDynamics};
use crate::linalg::Vector6;
use snafu::ensure;
use std::marker::PhantomData;

/// The default propagator: fixed step RK4 of the two body and zonal harmonics dynamics.
pub type DefaultPropagator = FixedStepPropagator<RK4Fixed, OrbitalDynamics>;

/// A fixed step propagator, i.e. one integration step between each sample of the time grid.
pub struct FixedStepPropagator<M: RK, D: Dynamics> {
    pub dynamics: D,
    /// Propagation fails if the radius drops below this value (km)
    pub min_radius_km: f64,
    _method: PhantomData<fn() -> M>,
}

impl<M: RK, D: Dynamics> FixedStepPropagator<M, D> {
    /// Each propagator must be initialized with `new` which stores the dynamics.
    pub fn new(dynamics: D) -> Self {
        Self {
            dynamics,
            min_radius_km: EARTH_RADIUS_KM,
            _method: PhantomData,
        }
    }

    /// This method integrates the dynamics for one step and returns the new state as
    /// y_{n+1} = y_n + h \sum_i b_i k_i. Everything passed to this function is in **seconds**.
    pub fn step(&self, delta_t_s: f64, state: &Vector6<f64>, step_s: f64) -> Vector6<f64> {
        let mut k: Vec<Vector6<f64>> = Vec::with_capacity(M::STAGES);
        k.push(self.dynamics.eom(delta_t_s, state));

        let mut a_idx: usize = 0;
        for i in 0..(M::STAGES - 1) {
            // Let's compute the c_i by summing the relevant items from the list of coefficients.
            // \sum_{j=1}^{i-1} a_ij  ∀ i ∈ [2, s]
            let mut ci: f64 = 0.0;
            // The wi stores the a_{s1} * k_1 + a_{s2} * k_2 + ... + a_{s, s-1} * k_{s-1} +
            let mut wi = Vector6::zeros();
            for kj in &k[0..i + 1] {
                let a_ij = M::A_COEFFS[a_idx];
                ci += a_ij;
                wi += a_ij * kj;
                a_idx += 1;
            }

            let ki = self
                .dynamics
                .eom(delta_t_s + ci * step_s, &(state + step_s * wi));
            k.push(ki);
        }

        let mut next_state = *state;
        for (i, ki) in k.iter().enumerate() {
            next_state += step_s * M::B_COEFFS[i] * ki;
        }
        next_state
    }

    fn check(&self, index: usize, state: &Vector6<f64>) -> Result<(), PropagationError> {
        ensure!(
            state.iter().all(|x| x.is_finite()),
            NonFiniteStateSnafu { index }
        );
        let rmag_km = state.fixed_rows::<3>(0).norm();
        ensure!(
            rmag_km >= self.min_radius_km,
            SurfaceImpactSnafu { index, rmag_km }
        );
        Ok(())
    }
}

impl<M: RK, D: Dynamics> Clone for FixedStepPropagator<M, D> {
    fn clone(&self) -> Self {
        Self {
            dynamics: self.dynamics.clone(),
            min_radius_km: self.min_radius_km,
            _method: PhantomData,
        }
    }
}

impl Default for DefaultPropagator {
    fn default() -> Self {
        Self::new(OrbitalDynamics::default())
    }
}

impl<M: RK, D: Dynamics> OrbitPropagator for FixedStepPropagator<M, D> {
    fn propagate(
        &self,
        initial_state: &Vector6<f64>,
        step_s: f64,
        samples: usize,
    ) -> Result<StateHistory, PropagationError> {
        ensure!(
            step_s.is_finite() && step_s > 0.0,
            InvalidStepSnafu { step_s }
        );
        ensure!(samples >= 2, TooFewSamplesSnafu { samples });

        self.check(0, initial_state)?;

        let mut states = Vec::with_capacity(samples);
        states.push(*initial_state);
        let mut state = *initial_state;
        for index in 1..samples {
            state = self.step((index - 1) as f64 * step_s, &state, step_s);
            self.check(index, &state)?;
            states.push(state);
        }

        Ok(StateHistory::new(states))
    }
}
